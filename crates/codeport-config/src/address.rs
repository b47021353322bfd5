//! Listen-address parsing and the bind-address cascade.

use std::fmt;

use serde::Serialize;

use crate::env::{Environment, vars};
use crate::resolve::ResolvedConfig;
use crate::layers::Source;

/// Host used when nothing else is configured.
pub const DEFAULT_HOST: &str = "localhost";
/// Port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 8080;
/// Port assumed when a `bind-addr` omits one (plain HTTP).
const BIND_ADDR_IMPLICIT_PORT: u16 = 80;

/// A network listen address. Port `0` asks the OS for any free port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a `host[:port]` string as accepted by `--bind-addr`.
    ///
    /// IPv6 hosts must be bracketed (`[::1]:8080`); the brackets are not
    /// kept in [`Address::host`]. A missing port means 80.
    pub fn parse_bind_addr(value: &str) -> Result<Self, String> {
        let (host, port) = if let Some(rest) = value.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| "unterminated '[' in IPv6 address".to_string())?;
            let port = match after {
                "" => None,
                _ => Some(
                    after
                        .strip_prefix(':')
                        .ok_or_else(|| format!("unexpected {after:?} after IPv6 address"))?,
                ),
            };
            (host, port)
        } else {
            match value.rsplit_once(':') {
                Some((host, _)) if host.contains(':') => {
                    return Err("IPv6 addresses must be wrapped in brackets".to_string());
                }
                Some((host, port)) => (host, Some(port)),
                None => (value, None),
            }
        };

        if host.is_empty() {
            return Err("missing host".to_string());
        }
        if host.contains(['[', ']']) {
            return Err(format!("unexpected bracket in host {host:?}"));
        }
        let port = match port {
            None => BIND_ADDR_IMPLICIT_PORT,
            Some(port) => parse_port(port).ok_or_else(|| format!("port {port:?} is not a number"))?,
        };
        Ok(Self::new(host, port))
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Parse a strictly base-10 port number.
pub(crate) fn parse_port(value: &str) -> Option<u16> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Compute the final listen address.
///
/// Sources are applied in order, each overriding only the field it sets:
/// `bind-addr` (both fields), then `host`, then `$PORT`, then `port`.
/// A `host` or `port` from a lower layer than `bind-addr` is skipped.
/// A `port` that itself came from `$PORT` is not re-applied, so the
/// environment passed here is authoritative for that layer.
pub fn resolve_address(default: Address, resolved: &ResolvedConfig, env: &Environment) -> Address {
    let mut addr = default;

    let bind_rank = match &resolved.bind_addr {
        Some(bind_addr) => {
            addr = bind_addr.clone();
            resolved.source("bind-addr").precedence()
        }
        None => 0,
    };
    if let Some(host) = &resolved.host {
        if resolved.source("host").precedence() >= bind_rank {
            addr.host = host.clone();
        }
    }
    if let Some(raw) = env.get(vars::PORT) {
        match parse_port(raw) {
            Some(port) => addr.port = port,
            None => tracing::warn!(value = raw, "Ignoring ${} that is not a port number", vars::PORT),
        }
    }
    if let Some(port) = resolved.port {
        let source = resolved.source("port");
        if !matches!(source, Source::Environment(_)) && source.precedence() >= bind_rank {
            addr.port = port;
        }
    }

    addr
}
