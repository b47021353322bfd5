//! Environment builders for tests.

use codeport_config::Environment;
use codeport_config::env::vars;

/// Fluent builder for [`Environment`] snapshots.
///
/// # Example
///
/// ```ignore
/// let env = EnvBuilder::new()
///     .port(8000)
///     .log_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvBuilder {
    env: Environment,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn var(mut self, key: &str, value: &str) -> Self {
        self.env = self.env.with(key, value);
        self
    }

    pub fn password(self, password: &str) -> Self {
        self.var(vars::PASSWORD, password)
    }

    pub fn hashed_password(self, hash: &str) -> Self {
        self.var(vars::HASHED_PASSWORD, hash)
    }

    pub fn port(self, port: u16) -> Self {
        self.var(vars::PORT, &port.to_string())
    }

    pub fn log_level(self, level: &str) -> Self {
        self.var(vars::LOG_LEVEL, level)
    }

    /// Pretend to run inside an editor session with this endpoint.
    pub fn ipc_hook(self, endpoint: &str) -> Self {
        self.var(vars::IPC_HOOK, endpoint)
    }

    pub fn build(self) -> Environment {
        self.env
    }
}
