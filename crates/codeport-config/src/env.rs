//! Immutable view of the process environment.

use std::collections::HashMap;

/// Environment variables codeport reads.
pub mod vars {
    pub const PASSWORD: &str = "PASSWORD";
    pub const HASHED_PASSWORD: &str = "HASHED_PASSWORD";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const PORT: &str = "PORT";
    /// Overrides the default config file location.
    pub const CONFIG: &str = "CODEPORT_CONFIG";
    /// Endpoint of the editor instance this process was launched from.
    pub const IPC_HOOK: &str = "VSCODE_IPC_HOOK_CLI";
}

/// Snapshot of environment variables.
///
/// Empty values read as unset, so `PASSWORD=` does not count as a
/// password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment. Variables that are not
    /// valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Return a copy with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
