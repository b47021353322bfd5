#![deny(unsafe_code)]

//! Command-line and configuration handling for codeport.
//!
//! The pipeline is: [`Scanner`] turns argv into [`RawArguments`], [`locate`]
//! finds and scans the TOML config file, and [`Resolver`] merges command
//! line, environment, and file into a [`ResolvedConfig`]. The listen address
//! is computed separately by [`resolve_address`].

pub mod address;
pub mod args;
pub mod env;
pub mod file;
pub mod layers;
pub mod paths;
pub mod registry;
pub mod resolve;
pub mod scanner;
pub mod secret;

use std::path::PathBuf;

pub use address::{Address, resolve_address};
pub use args::{OptionValue, OptionalValue, RawArguments};
pub use env::Environment;
pub use file::{ConfigFile, locate};
pub use layers::{Layer, LayerStack, Source};
pub use paths::Paths;
pub use registry::{AuthType, LogLevel, OptionSpec, Registry};
pub use resolve::{ResolvedConfig, Resolver};
pub use scanner::{ErrorKind, Origin, ParseError, Scanner, parse};
pub use secret::{Credential, SecretValue};

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The merged layers are inconsistent, e.g. a certificate without a key.
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Invalid { path: PathBuf, source: ParseError },

    #[error("config file {}: `{key}` has unsupported type {found}", .path.display())]
    UnsupportedValue {
        path: PathBuf,
        key: String,
        found: &'static str,
    },
}

impl ConfigError {
    /// The argument error kind behind this failure, if it was one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ConfigError::Parse(e) | ConfigError::Invalid { source: e, .. } => Some(e.kind()),
            _ => None,
        }
    }
}
