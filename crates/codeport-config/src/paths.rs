//! Well-known directories, collected once and passed around explicitly.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "codeport";
const CONFIG_FILE_NAME: &str = "config.toml";
const ENDPOINT_FILE_NAME: &str = "codeport-ipc";

/// Directory context for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Default user data directory.
    pub data: PathBuf,
    /// Directory holding the default config file.
    pub config: PathBuf,
    /// Directory holding the recorded endpoint file.
    pub runtime: PathBuf,
}

impl Paths {
    /// Platform directories as reported by the OS, falling back to the
    /// temp directory where one is unavailable.
    pub fn from_system() -> Self {
        let tmp = std::env::temp_dir();
        Self {
            data: dirs::data_dir().unwrap_or_else(|| tmp.clone()).join(APP_DIR),
            config: dirs::config_dir().unwrap_or_else(|| tmp.clone()).join(APP_DIR),
            runtime: tmp,
        }
    }

    /// All directories under one root, for tests and sandboxes.
    pub fn rooted(root: &Path) -> Self {
        Self {
            data: root.join("data"),
            config: root.join("config"),
            runtime: root.join("runtime"),
        }
    }

    pub fn default_config_file(&self) -> PathBuf {
        self.config.join(CONFIG_FILE_NAME)
    }

    pub fn endpoint_file(&self) -> PathBuf {
        self.runtime.join(ENDPOINT_FILE_NAME)
    }
}
