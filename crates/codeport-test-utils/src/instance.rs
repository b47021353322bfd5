//! A stand-in for a running editor instance.

use std::path::{Path, PathBuf};

use codeport_core::{EndpointFile, EndpointId};
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

/// A Unix listener that accepts and drops connections, enough to pass the
/// liveness probe. Stops listening when dropped.
pub struct FakeInstance {
    socket_path: PathBuf,
    task: JoinHandle<()>,
}

impl FakeInstance {
    /// Bind `dir/editor.sock` and start accepting. Must be called inside a
    /// tokio runtime.
    pub fn start(dir: &Path) -> Self {
        let socket_path = dir.join("editor.sock");
        let listener = UnixListener::bind(&socket_path).expect("failed to bind fake instance socket");
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });
        Self { socket_path, task }
    }

    pub fn endpoint(&self) -> EndpointId {
        EndpointId::new(self.socket_path.display().to_string())
    }

    /// Record this instance in `file`, as a real instance does on startup.
    pub fn record(&self, file: &EndpointFile) {
        file.record(&self.endpoint()).expect("failed to record fake endpoint");
    }

    /// Stop accepting and remove the socket, leaving a stale endpoint.
    pub fn stop(self) -> EndpointId {
        let endpoint = self.endpoint();
        drop(self);
        endpoint
    }
}

impl Drop for FakeInstance {
    fn drop(&mut self) {
        self.task.abort();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}
