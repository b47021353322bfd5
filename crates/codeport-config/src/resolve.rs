//! Layered defaults resolution.
//!
//! [`Resolver::resolve`] merges the command line, environment, and config
//! file into a [`ResolvedConfig`] where every option has a concrete value.
//! Each option is looked up independently through a [`LayerStack`]; the
//! cross-option cascades (log verbosity, certificate synthesis, quick link)
//! run afterwards, with quick link applied last.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::ConfigError;
use crate::address::Address;
use crate::args::{OptionValue, OptionalValue, RawArguments};
use crate::env::{Environment, vars};
use crate::file::ConfigFile;
use crate::layers::{LayerStack, Source};
use crate::paths::Paths;
use crate::registry::{AuthType, LogLevel, Registry};
use crate::scanner::ParseError;
use crate::secret::{Credential, SecretValue};

/// Host forced by a quick link.
const LINK_HOST: &str = "localhost";
/// Hostname used for a generated certificate when `cert-host` is unset.
const DEFAULT_CERT_HOST: &str = "localhost";
/// Placeholder substituted with a port number in proxy domains.
pub const PORT_PLACEHOLDER: &str = "{{port}}";

/// Fully defaulted configuration for one invocation.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub auth: AuthType,
    pub password: Option<SecretValue>,
    pub hashed_password: Option<SecretValue>,
    /// `$PASSWORD` supplied the password and no hash was set in the environment.
    pub using_env_password: bool,
    /// `$HASHED_PASSWORD` supplied the password hash.
    pub using_env_hashed_password: bool,

    pub host: Option<String>,
    pub port: Option<u16>,
    pub bind_addr: Option<Address>,
    pub socket: Option<PathBuf>,
    pub socket_mode: Option<String>,

    pub cert: Option<PathBuf>,
    pub cert_key: Option<PathBuf>,
    pub cert_host: Option<String>,

    pub user_data_dir: PathBuf,
    pub extensions_dir: PathBuf,
    pub builtin_extensions_dir: Option<PathBuf>,
    /// The config file that was read, if any.
    pub config: Option<PathBuf>,

    pub log: LogLevel,
    pub verbose: bool,
    pub locale: Option<String>,

    pub open: bool,
    pub help: bool,
    pub version: bool,
    pub json: bool,
    pub new_window: bool,
    pub reuse_window: bool,
    pub link: Option<OptionalValue>,
    pub disable_update_check: bool,
    pub disable_telemetry: bool,
    pub disable_file_downloads: bool,
    pub disable_workspace_trust: bool,
    pub ignore_last_opened: bool,
    pub list_extensions: bool,

    /// Normalized, deduplicated, first-seen order.
    pub proxy_domains: Vec<String>,
    pub enable: Vec<String>,
    pub trusted_origins: Vec<String>,
    pub install_extensions: Vec<String>,
    pub uninstall_extensions: Vec<String>,
    pub app_name: Option<String>,
    pub abs_proxy_base_path: Option<String>,

    /// Positional arguments from the command line, verbatim.
    pub positionals: Vec<String>,
    /// Directory relative positionals are resolved against.
    pub working_dir: PathBuf,

    provenance: BTreeMap<&'static str, Source>,
}

impl ResolvedConfig {
    /// Which layer supplied `option`. Options nobody set report
    /// [`Source::Default`].
    pub fn source(&self, option: &str) -> Source {
        self.provenance
            .get(option)
            .cloned()
            .unwrap_or(Source::Default)
    }

    /// Provenance of every option that did not fall back to a default.
    pub fn provenance(&self) -> impl Iterator<Item = (&'static str, &Source)> {
        self.provenance.iter().map(|(k, v)| (*k, v))
    }

    /// Whether `option` was given on the command line.
    pub fn is_explicit(&self, option: &str) -> bool {
        self.source(option) == Source::CommandLine
    }

    /// The secret that validates sessions; a hash is preferred.
    pub fn credential(&self) -> Credential<'_> {
        match (&self.hashed_password, &self.password) {
            (Some(hash), _) => Credential::Hashed(hash),
            (None, Some(password)) => Credential::Plain(password),
            (None, None) => Credential::Missing,
        }
    }

    /// Invocations that manage extensions are handed to the editor
    /// runtime's CLI mode instead of starting a server.
    pub fn is_extension_management(&self) -> bool {
        self.list_extensions
            || !self.install_extensions.is_empty()
            || !self.uninstall_extensions.is_empty()
    }

    /// Proxy domains in `{{port}}.domain` form.
    pub fn proxy_domain_templates(&self) -> Vec<String> {
        self.proxy_domains
            .iter()
            .map(|domain| {
                if domain.contains(PORT_PLACEHOLDER) {
                    domain.clone()
                } else {
                    format!("{PORT_PLACEHOLDER}.{domain}")
                }
            })
            .collect()
    }
}

/// Resolution context. Construct once per process and reuse.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Registry,
    paths: Paths,
    working_dir: PathBuf,
}

impl Resolver {
    pub fn new(paths: Paths, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry: Registry::standard(),
            paths,
            working_dir: working_dir.into(),
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn registry(&self) -> Registry {
        self.registry
    }

    /// Merge the layers into a fully defaulted configuration.
    ///
    /// Fails only when a certificate path is set in some layer and no key
    /// is set in any layer.
    pub fn resolve(
        &self,
        raw: &RawArguments,
        env: &Environment,
        file: Option<&ConfigFile>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let mut c = Cascade {
            stack: LayerStack::new(raw, env, file),
            registry: self.registry,
            provenance: BTreeMap::new(),
        };

        let user_data_dir = c.path("user-data-dir").unwrap_or_else(|| self.paths.data.clone());
        let extensions_dir = match c.path("extensions-dir") {
            Some(dir) => dir,
            None => {
                c.derive("extensions-dir");
                user_data_dir.join("extensions")
            }
        };

        let (log, verbose) = resolve_log_level(&mut c, raw);

        let mut auth: AuthType = c
            .text("auth")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let password = c.text("password").map(SecretValue::new);
        let hashed_password = c.text("hashed-password").map(SecretValue::new);
        let using_env_hashed_password = env.contains(vars::HASHED_PASSWORD);
        let using_env_password = env.contains(vars::PASSWORD) && !using_env_hashed_password;

        let mut host = c.text("host");
        let mut port = c.port("port");
        let mut bind_addr = c.bind_addr("bind-addr");
        let mut socket = c.path("socket");
        let mut socket_mode = c.text("socket-mode");

        let link = c.optional("link");
        let cert_host = c.text("cert-host");
        let (mut cert, mut cert_key) = if link.is_some() {
            (None, None)
        } else {
            resolve_certificate(&mut c, &user_data_dir, cert_host.as_deref())?
        };

        if link.is_some() {
            debug!("Quick link requested; disabling auth and binding an ephemeral port");
            auth = AuthType::None;
            host = Some(LINK_HOST.to_string());
            port = Some(0);
            bind_addr = None;
            socket = None;
            socket_mode = None;
            cert = None;
            cert_key = None;
            for name in ["auth", "host", "port", "bind-addr", "socket", "socket-mode", "cert", "cert-key"] {
                c.derive(name);
            }
        }

        let proxy_domains = normalize_proxy_domains(&c.list("proxy-domain"));

        Ok(ResolvedConfig {
            auth,
            password,
            hashed_password,
            using_env_password,
            using_env_hashed_password,
            host,
            port,
            bind_addr,
            socket,
            socket_mode,
            cert,
            cert_key,
            cert_host,
            user_data_dir,
            extensions_dir,
            builtin_extensions_dir: c.path("builtin-extensions-dir"),
            config: file.map(|f| f.path.clone()),
            log,
            verbose,
            locale: c.text("locale"),
            open: c.flag("open"),
            help: c.flag("help"),
            version: c.flag("version"),
            json: c.flag("json"),
            new_window: c.flag("new-window"),
            reuse_window: c.flag("reuse-window"),
            link,
            disable_update_check: c.flag("disable-update-check"),
            disable_telemetry: c.flag("disable-telemetry"),
            disable_file_downloads: c.flag("disable-file-downloads"),
            disable_workspace_trust: c.flag("disable-workspace-trust"),
            ignore_last_opened: c.flag("ignore-last-opened"),
            list_extensions: c.flag("list-extensions"),
            proxy_domains,
            enable: c.list("enable"),
            trusted_origins: c.list("trusted-origins"),
            install_extensions: c.list("install-extension"),
            uninstall_extensions: c.list("uninstall-extension"),
            app_name: c.text("app-name"),
            abs_proxy_base_path: c.text("abs-proxy-base-path"),
            positionals: raw.positionals().to_vec(),
            working_dir: self.working_dir.clone(),
            provenance: c.provenance,
        })
    }
}

/// Log level cascade.
///
/// A `--log` given on the command line is used as-is. Otherwise `verbose`
/// from any layer forces trace. Otherwise the usual layering applies
/// (`$LOG_LEVEL`, then the config file, then info). `verbose` always ends
/// up matching whether the level is trace.
fn resolve_log_level(c: &mut Cascade<'_>, raw: &RawArguments) -> (LogLevel, bool) {
    let verbose_flag = c.flag("verbose");
    let layered: Option<LogLevel> = c.text("log").and_then(|s| s.parse().ok());
    let from_cli = raw.contains("log");

    let level = match (from_cli, verbose_flag, layered) {
        (true, _, Some(level)) => level,
        (_, true, _) => {
            c.derive("log");
            LogLevel::Trace
        }
        (_, false, Some(level)) => level,
        (_, false, None) => LogLevel::default(),
    };

    let verbose = level == LogLevel::Trace;
    if verbose != verbose_flag {
        c.derive("verbose");
    }
    (level, verbose)
}

/// Certificate cascade: an empty `cert` synthesizes both paths from the
/// data directory; an explicit `cert` needs a key from some layer.
fn resolve_certificate(
    c: &mut Cascade<'_>,
    user_data_dir: &Path,
    cert_host: Option<&str>,
) -> Result<(Option<PathBuf>, Option<PathBuf>), ConfigError> {
    let cert_key = c.path("cert-key");
    match c.optional("cert") {
        None => Ok((None, cert_key)),
        Some(cert) if cert.is_empty() => {
            if cert_key.is_some() {
                warn!("Ignoring --cert-key because a self-signed certificate will be generated");
            }
            let stem = cert_host.unwrap_or(DEFAULT_CERT_HOST).replace('.', "_");
            let base = user_data_dir.join(stem);
            c.derive("cert");
            c.derive("cert-key");
            Ok((Some(base.with_extension("crt")), Some(base.with_extension("key"))))
        }
        Some(cert) => match cert_key {
            Some(key) => Ok((cert.value.map(PathBuf::from), Some(key))),
            None => Err(ParseError::MissingCompanion {
                option: "cert",
                companion: "cert-key",
            }
            .into()),
        },
    }
}

/// Case-fold, strip a leading `*.`, and drop duplicates keeping the first.
pub fn normalize_proxy_domains(domains: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(domains.len());
    for domain in domains {
        let folded = domain.trim().to_lowercase();
        let domain = folded.strip_prefix("*.").unwrap_or(&folded);
        if domain.is_empty() || out.iter().any(|d| d == domain) {
            continue;
        }
        out.push(domain.to_string());
    }
    out
}

/// Per-option lookups that record where each value came from.
struct Cascade<'a> {
    stack: LayerStack<'a>,
    registry: Registry,
    provenance: BTreeMap<&'static str, Source>,
}

impl Cascade<'_> {
    fn get(&mut self, name: &str) -> Option<OptionValue> {
        let spec = self.registry.get(name)?;
        let (value, source) = self.stack.lookup(spec)?;
        self.provenance.insert(spec.name, source);
        Some(value)
    }

    fn derive(&mut self, name: &str) {
        if let Some(spec) = self.registry.get(name) {
            self.provenance.insert(spec.name, Source::Derived);
        }
    }

    fn flag(&mut self, name: &str) -> bool {
        matches!(self.get(name), Some(OptionValue::Flag))
    }

    fn text(&mut self, name: &str) -> Option<String> {
        match self.get(name)? {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn port(&mut self, name: &str) -> Option<u16> {
        match self.get(name)? {
            OptionValue::Port(p) => Some(p),
            _ => None,
        }
    }

    fn path(&mut self, name: &str) -> Option<PathBuf> {
        match self.get(name)? {
            OptionValue::Path(p) => Some(p),
            _ => None,
        }
    }

    fn bind_addr(&mut self, name: &str) -> Option<Address> {
        match self.get(name)? {
            OptionValue::BindAddr(a) => Some(a),
            _ => None,
        }
    }

    fn optional(&mut self, name: &str) -> Option<OptionalValue> {
        match self.get(name)? {
            OptionValue::Optional(v) => Some(v),
            _ => None,
        }
    }

    fn list(&mut self, name: &str) -> Vec<String> {
        match self.get(name) {
            Some(OptionValue::List(items)) => items,
            _ => Vec::new(),
        }
    }
}
