#![deny(unsafe_code)]

//! codeport: launcher for a browser-hosted editor server.
//!
//! Resolves the command line, environment, and config file, then either
//! hands the given paths to a running editor instance or prints the plan
//! for starting a new one.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use codeport_config::{
    Address, AuthType, ConfigError, Credential, Environment, Paths, RawArguments, Registry,
    ResolvedConfig, Resolver, Scanner, resolve_address,
};
use codeport_core::{
    Coordinator, EditorClient, EndpointFile, EndpointId, OpenRequest, build_info, logging,
    to_runtime_args,
};
use tracing::{debug, info};

/// Exit status for unusable arguments or configuration.
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cwd = std::env::current_dir().context("failed to determine the working directory")?;
    let registry = Registry::standard();

    let raw = match Scanner::new(registry, &cwd).scan(&argv) {
        Ok(raw) => raw,
        Err(e) => return Ok(usage_error(&e)),
    };

    let env = Environment::from_process();
    let paths = Paths::from_system();
    let resolved = match load(&raw, &env, &paths, &cwd) {
        Ok(resolved) => resolved,
        Err(e) if e.kind().is_some() => return Ok(usage_error(&e)),
        Err(e) => return Err(e.into()),
    };
    logging::init(resolved.log);
    debug!(config = ?resolved.config, log = %resolved.log, "Resolved configuration");

    if resolved.help {
        print!("{}", help_text(registry));
        return Ok(ExitCode::SUCCESS);
    }
    if resolved.version {
        cmd_version(resolved.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    if resolved.is_extension_management() {
        cmd_runtime_args(&resolved)?;
        return Ok(ExitCode::SUCCESS);
    }

    let coordinator = Coordinator::new(EndpointFile::from_paths(&paths));
    if let Some(endpoint) = coordinator.should_reuse_existing(&resolved, &env).await? {
        cmd_open(&endpoint, &resolved).await?;
        return Ok(ExitCode::SUCCESS);
    }

    cmd_plan(&resolved, &env)?;
    Ok(ExitCode::SUCCESS)
}

fn usage_error(error: &dyn std::error::Error) -> ExitCode {
    eprintln!("error: {error}");
    eprintln!("Run `codeport --help` for usage.");
    ExitCode::from(EXIT_USAGE)
}

fn load(raw: &RawArguments, env: &Environment, paths: &Paths, cwd: &Path) -> Result<ResolvedConfig, ConfigError> {
    let file = codeport_config::locate(raw, env, paths, Registry::standard())?;
    Resolver::new(paths.clone(), cwd).resolve(raw, env, file.as_ref())
}

fn help_text(registry: Registry) -> String {
    format!(
        "codeport {}\n\nUsage: codeport [options] [path...]\n\nOptions:\n{}",
        build_info::VERSION,
        registry.help_text()
    )
}

fn cmd_version(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&build_info::version_info())?);
    } else {
        println!("{}", build_info::version_string());
    }
    Ok(())
}

/// Extension management runs in the editor runtime's CLI mode; print what
/// it would be handed.
fn cmd_runtime_args(resolved: &ResolvedConfig) -> Result<()> {
    let args = to_runtime_args(resolved);
    println!("{}", serde_json::to_string_pretty(&args)?);
    Ok(())
}

async fn cmd_open(endpoint: &EndpointId, resolved: &ResolvedConfig) -> Result<()> {
    let request = OpenRequest::from_runtime_args(&to_runtime_args(resolved))?;
    info!(%endpoint, folders = ?request.folder_uris, files = ?request.file_uris, "Opening in existing instance");
    EditorClient::new(endpoint)
        .open(&request)
        .await
        .with_context(|| format!("failed to reach editor instance at {endpoint}"))?;
    Ok(())
}

fn cmd_plan(resolved: &ResolvedConfig, env: &Environment) -> Result<()> {
    match &resolved.socket {
        Some(socket) => match &resolved.socket_mode {
            Some(mode) => println!("Listening on socket {} (mode {mode})", socket.display()),
            None => println!("Listening on socket {}", socket.display()),
        },
        None => {
            let scheme = if resolved.cert.is_some() { "https" } else { "http" };
            let addr = resolve_address(Address::default(), resolved, env);
            println!("Listening on {scheme}://{addr}");
        }
    }

    match resolved.auth {
        AuthType::None => println!("Authentication is disabled"),
        AuthType::Password => {
            println!("Authentication is enabled");
            match resolved.credential() {
                Credential::Hashed(_) => println!("  - Using hashed password from {}", resolved.source("hashed-password")),
                Credential::Plain(_) => println!("  - Using password from {}", resolved.source("password")),
                Credential::Missing => println!("  - No password configured; one will be generated"),
            }
        }
    }

    if let (Some(cert), Some(key)) = (&resolved.cert, &resolved.cert_key) {
        println!("Using certificate {} with key {}", cert.display(), key.display());
    }
    if resolved.link.is_some() {
        println!("Quick link requested; binding an ephemeral port");
    }
    for template in resolved.proxy_domain_templates() {
        println!("Proxying ports on {template}");
    }

    let args = to_runtime_args(resolved);
    println!("Runtime arguments:\n{}", serde_json::to_string_pretty(&args)?);
    Ok(())
}
