//! Sandboxed directory layouts.

use std::path::{Path, PathBuf};

use codeport_config::{
    ConfigFile, Environment, Paths, RawArguments, Registry, ResolvedConfig, Resolver, Scanner,
};
use tempfile::TempDir;

/// A temp directory holding the data, config, and runtime directories plus
/// any files a test creates. Deleted on drop, even on panic.
pub struct TestWorkspace {
    paths: Paths,
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let paths = Paths::rooted(temp_dir.path());
        std::fs::create_dir_all(&paths.runtime).expect("failed to create runtime dir");
        Self { paths, temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Create a file relative to the root, with parent directories.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, content).expect("failed to write test file");
        path
    }

    /// Create a directory relative to the root.
    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.root().join(rel);
        std::fs::create_dir_all(&path).expect("failed to create test dir");
        path
    }

    /// Write the default config file.
    pub fn config(&self, toml_content: &str) -> PathBuf {
        std::fs::create_dir_all(&self.paths.config).expect("failed to create config dir");
        let path = self.paths.default_config_file();
        std::fs::write(&path, toml_content).expect("failed to write test config");
        path
    }

    /// Scan `argv` with the root as working directory.
    pub fn scan(&self, argv: &[&str]) -> RawArguments {
        Scanner::new(Registry::standard(), self.root())
            .scan(argv)
            .expect("failed to scan test argv")
    }

    /// Scan, locate the config file, and resolve, as the binary does.
    pub fn resolve(&self, argv: &[&str], env: &Environment) -> ResolvedConfig {
        let raw = self.scan(argv);
        let file: Option<ConfigFile> = codeport_config::locate(&raw, env, &self.paths, Registry::standard())
            .expect("failed to load test config");
        Resolver::new(self.paths.clone(), self.root())
            .resolve(&raw, env, file.as_ref())
            .expect("failed to resolve test config")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
