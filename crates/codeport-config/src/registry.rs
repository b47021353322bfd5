//! The fixed table of options codeport understands.
//!
//! Every option is declared once as an [`OptionSpec`]. The scanner, the
//! layered resolver, and the help renderer all read from the same
//! [`Registry`], so adding an option is a one-line change here.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// How many values an option takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Boolean switch, no value. Absence means false.
    Flag,
    /// Exactly one value. A later occurrence replaces an earlier one.
    Single,
    /// A value may be omitted; presence alone is meaningful.
    Optional,
    /// Accumulates every occurrence in encounter order.
    Repeatable,
}

/// What a value must look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Free-form string.
    Text,
    /// One of a fixed set of literals.
    Enum(&'static [&'static str]),
    /// Base-10 port number in `0..=65535`.
    Port,
    /// Filesystem path, stored in absolute form.
    Path,
    /// `host[:port]` listen address.
    BindAddr,
}

/// Declaration of a single option.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    /// Canonical name, used as `--name` and as the config-file key.
    pub name: &'static str,
    /// Short aliases, used as `-alias`.
    pub short: &'static [&'static str],
    pub arity: Arity,
    pub domain: Domain,
    /// Secret-bearing options may only arrive via the environment or the
    /// config file.
    pub forbidden_on_command_line: bool,
    /// Environment variable that feeds this option, if any.
    pub env: Option<&'static str>,
    /// Option that must also be set whenever this one carries a value.
    pub requires_companion: Option<&'static str>,
    /// One-line description for `--help`.
    pub description: &'static str,
}

impl OptionSpec {
    const fn new(name: &'static str, arity: Arity, domain: Domain, description: &'static str) -> Self {
        Self {
            name,
            short: &[],
            arity,
            domain,
            forbidden_on_command_line: false,
            env: None,
            requires_companion: None,
            description,
        }
    }

    const fn flag(name: &'static str, description: &'static str) -> Self {
        Self::new(name, Arity::Flag, Domain::Text, description)
    }

    const fn text(name: &'static str, description: &'static str) -> Self {
        Self::new(name, Arity::Single, Domain::Text, description)
    }

    const fn path(name: &'static str, description: &'static str) -> Self {
        Self::new(name, Arity::Single, Domain::Path, description)
    }

    const fn list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, Arity::Repeatable, Domain::Text, description)
    }

    const fn short(mut self, aliases: &'static [&'static str]) -> Self {
        self.short = aliases;
        self
    }

    const fn env(mut self, var: &'static str) -> Self {
        self.env = Some(var);
        self
    }

    const fn secret(mut self) -> Self {
        self.forbidden_on_command_line = true;
        self
    }

    const fn companion(mut self, name: &'static str) -> Self {
        self.requires_companion = Some(name);
        self
    }

    /// Whether the option consumes a value token.
    pub fn takes_value(&self) -> bool {
        self.arity != Arity::Flag
    }
}

/// Authentication method for the editor server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    Password,
    None,
}

impl AuthType {
    pub const NAMES: &'static [&'static str] = &["password", "none"];

    pub fn as_str(self) -> &'static str {
        match self {
            AuthType::Password => "password",
            AuthType::None => "none",
        }
    }
}

impl FromStr for AuthType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(AuthType::Password),
            "none" => Ok(AuthType::None),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log verbosity, most verbose first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const NAMES: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The options recognised by codeport, in help order.
pub static OPTIONS: &[OptionSpec] = &[
    OptionSpec::new("auth", Arity::Single, Domain::Enum(AuthType::NAMES), "The type of authentication to use."),
    OptionSpec::text("password", "The password for password authentication.")
        .env("PASSWORD")
        .secret(),
    OptionSpec::text("hashed-password", "The password hashed with argon2 for password authentication.")
        .env("HASHED_PASSWORD")
        .secret(),
    OptionSpec::new("cert", Arity::Optional, Domain::Path, "Path to certificate. A self signed certificate is generated if none is provided.")
        .companion("cert-key"),
    OptionSpec::text("cert-host", "Hostname to use when generating a self signed certificate."),
    OptionSpec::path("cert-key", "Path to certificate key when using non-generated cert."),
    OptionSpec::flag("disable-telemetry", "Disable telemetry."),
    OptionSpec::flag("disable-update-check", "Disable update check."),
    OptionSpec::flag("disable-file-downloads", "Disable file downloads from the editor."),
    OptionSpec::flag("disable-workspace-trust", "Disable workspace trust feature."),
    OptionSpec::path("config", "Path to the TOML config file."),
    OptionSpec::new("bind-addr", Arity::Single, Domain::BindAddr, "Address to bind to in host:port."),
    OptionSpec::text("host", "Host to bind to."),
    OptionSpec::new("port", Arity::Single, Domain::Port, "Port to bind to.").env("PORT"),
    OptionSpec::path("socket", "Path to a socket (bind-addr will be ignored)."),
    OptionSpec::text("socket-mode", "File mode of the socket."),
    OptionSpec::flag("version", "Display version information.").short(&["v"]),
    OptionSpec::flag("json", "Print version information as JSON."),
    OptionSpec::flag("help", "Show this output.").short(&["h"]),
    OptionSpec::flag("open", "Open in browser on startup. Does not work remotely."),
    OptionSpec::new("link", Arity::Optional, Domain::Text, "Securely bind to a quick link with no password."),
    OptionSpec::path("user-data-dir", "Path to the user data directory."),
    OptionSpec::path("extensions-dir", "Path to the extensions directory."),
    OptionSpec::path("builtin-extensions-dir", "Path to the builtin extensions directory."),
    OptionSpec::list("proxy-domain", "Domain used for proxying ports."),
    OptionSpec::list("enable", "Enable a proposed API feature for an extension."),
    OptionSpec::list("trusted-origins", "Disables authenticate origin check for trusted origin."),
    OptionSpec::list("install-extension", "Install or update an extension by id or vsix."),
    OptionSpec::list("uninstall-extension", "Uninstall an extension by id."),
    OptionSpec::flag("list-extensions", "List installed extensions."),
    OptionSpec::flag("ignore-last-opened", "Ignore the last opened directory or workspace in favor of an empty window."),
    OptionSpec::flag("new-window", "Force to open a new window.").short(&["n"]),
    OptionSpec::flag("reuse-window", "Force to open a file or folder in an already opened window.").short(&["r"]),
    OptionSpec::text("locale", "The locale to use (e.g. en-US or zh-TW)."),
    OptionSpec::new("log", Arity::Single, Domain::Enum(LogLevel::NAMES), "Log level to use.").env("LOG_LEVEL"),
    OptionSpec::flag("verbose", "Enable verbose logging.").short(&["vvv"]),
    OptionSpec::text("app-name", "The name to use in branding."),
    OptionSpec::text("abs-proxy-base-path", "The base path to prefix to all absproxy requests."),
];

/// Lookup table over a static option slice.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    options: &'static [OptionSpec],
}

impl Registry {
    /// The registry built from [`OPTIONS`].
    pub const fn standard() -> Self {
        Self { options: OPTIONS }
    }

    /// A registry over a caller-supplied table.
    pub const fn with_options(options: &'static [OptionSpec]) -> Self {
        Self { options }
    }

    /// Look up an option by canonical name.
    pub fn get(&self, name: &str) -> Option<&'static OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Look up an option by one of its short aliases (without the dash).
    pub fn by_short(&self, alias: &str) -> Option<&'static OptionSpec> {
        self.options.iter().find(|o| o.short.contains(&alias))
    }

    pub fn iter(&self) -> std::slice::Iter<'static, OptionSpec> {
        self.options.iter()
    }

    /// Render the aligned option listing printed by `--help`.
    pub fn help_text(&self) -> String {
        let heads: Vec<String> = self.options.iter().map(option_head).collect();
        let width = heads.iter().map(String::len).max().unwrap_or(0);

        let mut out = String::new();
        for (spec, head) in self.options.iter().zip(&heads) {
            let mut description = spec.description.to_string();
            if let Domain::Enum(values) = spec.domain {
                description.push_str(&format!(" [{}]", values.join(", ")));
            }
            if let Some(var) = spec.env {
                description.push_str(&format!(" (env: ${var})"));
            }
            out.push_str(&format!("  {head:<width$}  {description}\n"));
        }
        out
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

fn option_head(spec: &OptionSpec) -> String {
    let short = spec
        .short
        .iter()
        .map(|s| format!("-{s} "))
        .collect::<String>();
    let placeholder = match (spec.arity, spec.domain) {
        (Arity::Flag, _) => "",
        (Arity::Optional, _) => " [value]",
        (_, Domain::Path) => " <path>",
        (_, Domain::Port) => " <number>",
        (_, Domain::BindAddr) => " <host:port>",
        _ => " <value>",
    };
    format!("{short}--{}{placeholder}", spec.name)
}
