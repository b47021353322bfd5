//! Editor IPC client: forwards requests to a running instance over its
//! Unix socket using HTTP/1.1.

use std::path::PathBuf;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;
use tracing::{debug, warn};

use super::types::{ErrorResponse, OpenRequest};
use crate::instance::EndpointId;

/// Errors from the editor client.
#[derive(Debug, thiserror::Error)]
pub enum EditorClientError {
    #[error("failed to connect to editor socket at {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("editor returned error: {0}")]
    Editor(String),
}

/// Client for one editor instance.
pub struct EditorClient {
    socket_path: PathBuf,
}

impl EditorClient {
    pub fn new(endpoint: &EndpointId) -> Self {
        Self {
            socket_path: endpoint.socket_path().to_path_buf(),
        }
    }

    /// POST a JSON body and return the response body.
    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Bytes, EditorClientError> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| EditorClientError::Connect {
                path: self.socket_path.clone(),
                source,
            })?;

        let (mut sender, conn) = hyper::client::conn::http1::handshake::<_, Full<Bytes>>(TokioIo::new(stream))
            .await
            .map_err(|e| EditorClientError::Request(format!("HTTP handshake failed: {e}")))?;

        // Drive the connection in the background
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                warn!(error = %e, "Editor connection error");
            }
        });

        debug!(socket = %self.socket_path.display(), path, "Editor request");

        let req = hyper::Request::builder()
            .method(hyper::Method::POST)
            .uri(path)
            .header("host", "localhost")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| EditorClientError::Request(format!("failed to build request: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| EditorClientError::Request(format!("request failed: {e}")))?;

        let status = resp.status();
        let resp_body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| EditorClientError::Request(format!("failed to read response body: {e}")))?
            .to_bytes();

        if !status.is_success() {
            if let Ok(err) = serde_json::from_slice::<ErrorResponse>(&resp_body) {
                return Err(EditorClientError::Editor(err.error));
            }
            return Err(EditorClientError::Request(format!("unexpected status: {status}")));
        }

        Ok(resp_body)
    }

    /// Ask the instance to open the request's folders and files.
    pub async fn open(&self, request: &OpenRequest) -> Result<(), EditorClientError> {
        let body = serde_json::to_vec(request)?;
        self.post("/", body).await?;
        Ok(())
    }
}
