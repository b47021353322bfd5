//! Hand-off to the editor runtime.
//!
//! [`to_runtime_args`] turns a [`ResolvedConfig`] into the arguments the
//! editor runtime consumes, classifying each positional by what is on disk.

use std::io;
use std::path::{Path, PathBuf};

use codeport_config::scanner::{STDIN_ARG, absolutize};
use codeport_config::{LogLevel, ResolvedConfig};
use serde::Serialize;
use tracing::debug;

/// Extension marking a multi-root workspace descriptor.
pub const WORKSPACE_EXTENSION: &str = "code-workspace";

/// What a positional argument names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Workspace,
    File,
    /// A directory, or a path that does not exist yet.
    Folder,
    /// Could not be inspected, or is neither file nor directory.
    Opaque,
}

/// Classify `path` by querying the filesystem. Never fails.
pub fn classify(path: &Path) -> PathKind {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            if path.extension().is_some_and(|ext| ext == WORKSPACE_EXTENSION) {
                PathKind::Workspace
            } else {
                PathKind::File
            }
        }
        Ok(meta) if meta.is_dir() => PathKind::Folder,
        Ok(_) => PathKind::Opaque,
        Err(e) if e.kind() == io::ErrorKind::NotFound => PathKind::Folder,
        Err(error) => {
            debug!(path = %path.display(), %error, "Could not stat positional");
            PathKind::Opaque
        }
    }
}

/// Arguments handed to the editor runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeArgs {
    /// First workspace descriptor among the positionals.
    pub workspace: Option<PathBuf>,
    /// First folder among the positionals.
    pub folder: Option<PathBuf>,
    pub files: Vec<PathBuf>,
    /// Positionals that were not forwarded as workspace, folder, or file.
    pub paths: Vec<PathBuf>,
    /// Every positional, verbatim.
    #[serde(rename = "_")]
    pub positionals: Vec<String>,
    /// Every positional as an absolute path with its kind, in order.
    #[serde(skip)]
    pub classified: Vec<(PathKind, PathBuf)>,

    pub user_data_dir: PathBuf,
    pub extensions_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtin_extensions_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub log: LogLevel,
    pub verbose: bool,
    pub new_window: bool,
    pub reuse_window: bool,
    pub ignore_last_opened: bool,
    pub disable_telemetry: bool,
    pub disable_update_check: bool,
    pub disable_workspace_trust: bool,
    pub disable_file_downloads: bool,
    pub list_extensions: bool,
    pub install_extension: Vec<String>,
    pub uninstall_extension: Vec<String>,
    pub enable: Vec<String>,
}

/// Build the runtime arguments for `resolved`.
pub fn to_runtime_args(resolved: &ResolvedConfig) -> RuntimeArgs {
    let mut args = RuntimeArgs {
        positionals: resolved.positionals.clone(),
        user_data_dir: resolved.user_data_dir.clone(),
        extensions_dir: resolved.extensions_dir.clone(),
        builtin_extensions_dir: resolved.builtin_extensions_dir.clone(),
        locale: resolved.locale.clone(),
        log: resolved.log,
        verbose: resolved.verbose,
        new_window: resolved.new_window,
        reuse_window: resolved.reuse_window,
        ignore_last_opened: resolved.ignore_last_opened,
        disable_telemetry: resolved.disable_telemetry,
        disable_update_check: resolved.disable_update_check,
        disable_workspace_trust: resolved.disable_workspace_trust,
        disable_file_downloads: resolved.disable_file_downloads,
        list_extensions: resolved.list_extensions,
        install_extension: resolved.install_extensions.clone(),
        uninstall_extension: resolved.uninstall_extensions.clone(),
        enable: resolved.enable.clone(),
        ..RuntimeArgs::default()
    };

    for positional in &resolved.positionals {
        if positional == STDIN_ARG {
            args.classified.push((PathKind::Opaque, PathBuf::from(STDIN_ARG)));
            args.paths.push(PathBuf::from(STDIN_ARG));
            continue;
        }
        let path = absolutize(&resolved.working_dir, positional);
        let kind = classify(&path);
        args.classified.push((kind, path.clone()));
        match kind {
            PathKind::Workspace if args.workspace.is_none() => args.workspace = Some(path),
            PathKind::Folder if args.folder.is_none() => args.folder = Some(path),
            PathKind::File => args.files.push(path),
            _ => args.paths.push(path),
        }
    }
    args
}
