//! Payloads exchanged with a running editor instance.
//!
//! Serialized as JSON over the instance's Unix socket.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::runtime::{PathKind, RuntimeArgs};

/// Request discriminator; instances dispatch on `type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    #[default]
    Open,
}

/// Ask a running instance to open folders and files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRequest {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    #[serde(rename = "folderURIs")]
    pub folder_uris: Vec<String>,
    #[serde(rename = "fileURIs")]
    pub file_uris: Vec<String>,
    #[serde(rename = "forceReuseWindow")]
    pub force_reuse_window: bool,
    #[serde(rename = "forceNewWindow")]
    pub force_new_window: bool,
}

/// Why an [`OpenRequest`] could not be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpenRequestError {
    #[error("no folder or file paths were given to open")]
    NoPaths,

    #[error("--new-window can only be used with folder paths")]
    NewWindowWithFiles,
}

impl OpenRequest {
    /// Build the request from classified runtime arguments.
    ///
    /// Every folder goes in `folderURIs`; workspace descriptors and plain
    /// files go in `fileURIs`. Paths that could not be inspected are
    /// skipped with a warning.
    pub fn from_runtime_args(args: &RuntimeArgs) -> Result<Self, OpenRequestError> {
        let mut folder_uris = Vec::new();
        let mut file_uris = Vec::new();
        for (kind, path) in &args.classified {
            let uri = path.display().to_string();
            match kind {
                PathKind::Folder => folder_uris.push(uri),
                PathKind::Workspace | PathKind::File => file_uris.push(uri),
                PathKind::Opaque => warn!(path = %uri, "Not opening a path that is neither file nor folder"),
            }
        }

        if folder_uris.is_empty() && file_uris.is_empty() {
            return Err(OpenRequestError::NoPaths);
        }
        if args.new_window && !file_uris.is_empty() {
            return Err(OpenRequestError::NewWindowWithFiles);
        }

        Ok(Self {
            kind: RequestKind::Open,
            folder_uris,
            file_uris,
            force_reuse_window: args.reuse_window,
            force_new_window: args.new_window,
        })
    }
}

/// Error body returned by an instance on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
