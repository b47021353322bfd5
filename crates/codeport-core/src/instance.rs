//! Single-instance coordination.
//!
//! A running editor instance records the path of its IPC socket in the
//! endpoint file. Later invocations read it back and decide whether to hand
//! their paths to that instance instead of starting a new one.
//!
//! The only blocking step is the liveness probe, a connect on the recorded
//! socket bounded by a timeout. A failed or timed-out probe is an ordinary
//! "stale" answer, never an error.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use codeport_config::env::vars;
use codeport_config::{Environment, Paths, ResolvedConfig};
use serde::Serialize;
use tokio::net::UnixStream;
use tracing::debug;

/// How long the liveness probe waits for a connection.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Identifier of a listening instance's IPC channel (a socket path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The socket path this identifier names.
    pub fn socket_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors reading or writing the endpoint file. A missing file is not an
/// error.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("failed to read endpoint file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write endpoint file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// The file holding the endpoint of the most recently started instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFile {
    path: PathBuf,
}

impl EndpointFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The endpoint file under the runtime directory.
    pub fn from_paths(paths: &Paths) -> Self {
        Self::new(paths.endpoint_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The recorded endpoint, trimmed. A missing or blank file is `None`.
    pub fn read(&self) -> Result<Option<EndpointId>, InstanceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let id = content.trim();
                Ok((!id.is_empty()).then(|| EndpointId::new(id)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(InstanceError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Record `endpoint` as the current instance, creating the parent
    /// directory if needed.
    pub fn record(&self, endpoint: &EndpointId) -> Result<(), InstanceError> {
        let write_err = |source| InstanceError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(&self.path, endpoint.as_str()).map_err(write_err)
    }

    /// Remove the file. Already gone is fine.
    pub fn clear(&self) -> Result<(), InstanceError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(InstanceError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Outcome of checking the recorded endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// Nothing is recorded.
    NoEndpoint,
    /// Recorded, but the connect failed or timed out.
    Unreachable(EndpointId),
    Live(EndpointId),
}

/// Try to connect to `endpoint` within `timeout`.
///
/// Dropping the returned future cancels the attempt.
pub async fn probe(endpoint: &EndpointId, timeout: Duration) -> bool {
    probe_with(endpoint, timeout, UnixStream::connect).await
}

async fn probe_with<C, F, T>(endpoint: &EndpointId, timeout: Duration, connect: C) -> bool
where
    C: FnOnce(PathBuf) -> F,
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(timeout, connect(endpoint.socket_path().to_path_buf())).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(error)) => {
            debug!(endpoint = %endpoint, %error, "Recorded endpoint refused connection");
            false
        }
        Err(_) => {
            debug!(endpoint = %endpoint, ?timeout, "Recorded endpoint probe timed out");
            false
        }
    }
}

/// Decides whether an invocation should be forwarded to an existing
/// instance.
#[derive(Debug, Clone)]
pub struct Coordinator {
    endpoint_file: EndpointFile,
    probe_timeout: Duration,
}

impl Coordinator {
    pub fn new(endpoint_file: EndpointFile) -> Self {
        Self {
            endpoint_file,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn endpoint_file(&self) -> &EndpointFile {
        &self.endpoint_file
    }

    /// Read the recorded endpoint and probe it.
    pub async fn check_recorded(&self) -> Result<ProbeResult, InstanceError> {
        let Some(endpoint) = self.endpoint_file.read()? else {
            return Ok(ProbeResult::NoEndpoint);
        };
        if probe(&endpoint, self.probe_timeout).await {
            Ok(ProbeResult::Live(endpoint))
        } else {
            Ok(ProbeResult::Unreachable(endpoint))
        }
    }

    /// The endpoint to forward this invocation to, if any.
    ///
    /// In order:
    /// 1. An endpoint inherited through `$VSCODE_IPC_HOOK_CLI` always wins.
    /// 2. `reuse-window` or `new-window` returns the recorded endpoint
    ///    without probing it.
    /// 3. A `--port` on the command line means a new instance.
    /// 4. Without positional paths there is nothing to hand off.
    /// 5. Otherwise the recorded endpoint is used only if it is live.
    pub async fn should_reuse_existing(
        &self,
        resolved: &ResolvedConfig,
        env: &Environment,
    ) -> Result<Option<EndpointId>, InstanceError> {
        if let Some(hook) = env.get(vars::IPC_HOOK) {
            debug!(endpoint = hook, "Found inherited endpoint");
            return Ok(Some(EndpointId::new(hook)));
        }

        if resolved.reuse_window || resolved.new_window {
            let recorded = self.endpoint_file.read()?;
            debug!(endpoint = ?recorded, "Window flag set; using recorded endpoint");
            return Ok(recorded);
        }

        if resolved.is_explicit("port") {
            debug!("Explicit --port given; starting a new instance");
            return Ok(None);
        }

        if resolved.positionals.is_empty() {
            return Ok(None);
        }

        match self.check_recorded().await? {
            ProbeResult::Live(endpoint) => {
                debug!(%endpoint, "Recorded endpoint is live");
                Ok(Some(endpoint))
            }
            ProbeResult::Unreachable(endpoint) => {
                debug!(%endpoint, "Recorded endpoint is stale");
                Ok(None)
            }
            ProbeResult::NoEndpoint => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file() {
        let tmp = TempDir::new().unwrap();
        let file = EndpointFile::new(tmp.path().join("ipc"));
        assert_eq!(file.read().unwrap(), None);
    }

    #[test]
    fn test_record_and_read_trims() {
        let tmp = TempDir::new().unwrap();
        let file = EndpointFile::new(tmp.path().join("nested/ipc"));
        file.record(&EndpointId::new("/run/editor.sock")).unwrap();
        assert_eq!(file.read().unwrap(), Some(EndpointId::new("/run/editor.sock")));

        std::fs::write(file.path(), "  /run/other.sock\n").unwrap();
        assert_eq!(file.read().unwrap().unwrap().as_str(), "/run/other.sock");

        std::fs::write(file.path(), "\n").unwrap();
        assert_eq!(file.read().unwrap(), None);
    }

    #[test]
    fn test_read_directory_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let file = EndpointFile::new(tmp.path());
        assert!(matches!(file.read(), Err(InstanceError::Read { .. })));
    }

    #[test]
    fn test_clear() {
        let tmp = TempDir::new().unwrap();
        let file = EndpointFile::new(tmp.path().join("ipc"));
        file.clear().unwrap();
        file.record(&EndpointId::new("x")).unwrap();
        file.clear().unwrap();
        assert_eq!(file.read().unwrap(), None);
    }

    #[tokio::test]
    async fn test_probe_missing_socket() {
        let tmp = TempDir::new().unwrap();
        let endpoint = EndpointId::new(tmp.path().join("gone.sock").display().to_string());
        assert!(!probe(&endpoint, Duration::from_millis(200)).await);
    }

    #[tokio::test]
    async fn test_probe_live_socket() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("live.sock");
        let _listener = tokio::net::UnixListener::bind(&path).unwrap();
        let endpoint = EndpointId::new(path.display().to_string());
        assert!(probe(&endpoint, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_probe_hung_connect_times_out() {
        let endpoint = EndpointId::new("/run/hung.sock");
        let hung = |_: PathBuf| std::future::pending::<io::Result<()>>();
        assert!(!probe_with(&endpoint, Duration::from_millis(50), hung).await);
    }

    #[tokio::test]
    async fn test_check_recorded_stale() {
        let tmp = TempDir::new().unwrap();
        let file = EndpointFile::new(tmp.path().join("ipc"));
        let endpoint = EndpointId::new(tmp.path().join("dead.sock").display().to_string());
        file.record(&endpoint).unwrap();

        let coordinator = Coordinator::new(file).with_probe_timeout(Duration::from_millis(200));
        assert_eq!(
            coordinator.check_recorded().await.unwrap(),
            ProbeResult::Unreachable(endpoint)
        );
    }
}
