//! TOML config-file layer.
//!
//! The file is a flat table keyed by canonical option names:
//!
//! ```toml
//! bind-addr = "127.0.0.1:8080"
//! auth = "password"
//! password = "correct horse battery staple"
//! cert = false
//! proxy-domain = ["*.example.com", "example.org"]
//! ```
//!
//! Entries are turned into `--name=value` tokens and scanned under
//! [`Origin::ConfigFile`], so they obey the same domains as the command
//! line. `true` becomes a bare `--name`, `false` drops the entry, and arrays
//! repeat the option once per element.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ConfigError;
use crate::args::RawArguments;
use crate::env::{Environment, vars};
use crate::paths::Paths;
use crate::registry::Registry;
use crate::scanner::{Origin, Scanner};

/// A config file that has been read and scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub args: RawArguments,
}

impl ConfigFile {
    /// Parse TOML content as if it had been read from `path`.
    pub fn parse(path: &Path, content: &str, registry: Registry) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        let argv = table_to_argv(path, table)?;

        let dir = path.parent().unwrap_or(Path::new("/"));
        let args = Scanner::new(registry, dir)
            .scan_from(&argv, Origin::ConfigFile { dir })
            .map_err(|source| ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            args,
        })
    }

    /// Read and parse the file at `path`. A missing file is `Ok(None)`;
    /// any other I/O error is returned.
    pub fn read(path: &Path, registry: Registry) -> Result<Option<Self>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(path, &content, registry).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn table_to_argv(path: &Path, table: toml::Table) -> Result<Vec<String>, ConfigError> {
    let mut argv = Vec::with_capacity(table.len());
    for (key, value) in table {
        match value {
            toml::Value::Boolean(true) => argv.push(format!("--{key}")),
            toml::Value::Boolean(false) => {}
            toml::Value::Array(items) => {
                for item in items {
                    let item = scalar(path, &key, item)?;
                    argv.push(format!("--{key}={item}"));
                }
            }
            other => {
                let value = scalar(path, &key, other)?;
                argv.push(format!("--{key}={value}"));
            }
        }
    }
    Ok(argv)
}

fn scalar(path: &Path, key: &str, value: toml::Value) -> Result<String, ConfigError> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Integer(i) => Ok(i.to_string()),
        other => Err(ConfigError::UnsupportedValue {
            path: path.to_path_buf(),
            key: key.to_string(),
            found: other.type_str(),
        }),
    }
}

/// Config file locations in the order they are tried: `--config`,
/// `$CODEPORT_CONFIG`, then the default under the config directory.
pub fn candidates(cli: &RawArguments, env: &Environment, paths: &Paths) -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(3);
    if let Some(path) = cli.path("config") {
        out.push(path.to_path_buf());
    }
    if let Some(path) = env.get(vars::CONFIG) {
        out.push(PathBuf::from(path));
    }
    out.push(paths.default_config_file());
    out
}

/// Read the first candidate that exists.
pub fn locate(
    cli: &RawArguments,
    env: &Environment,
    paths: &Paths,
    registry: Registry,
) -> Result<Option<ConfigFile>, ConfigError> {
    for candidate in candidates(cli, env, paths) {
        match ConfigFile::read(&candidate, registry)? {
            Some(file) => {
                debug!(path = %candidate.display(), "Using config file");
                return Ok(Some(file));
            }
            None => debug!(path = %candidate.display(), "Config file not found"),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::OptionValue;
    use crate::scanner::ErrorKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<ConfigFile, ConfigError> {
        ConfigFile::parse(Path::new("/etc/codeport/config.toml"), content, Registry::standard())
    }

    #[test]
    fn test_empty_file() {
        let file = parse("").unwrap();
        assert!(file.args.is_empty());
    }

    #[test]
    fn test_scalar_and_bool_entries() {
        let file = parse(
            r#"
            bind-addr = "0.0.0.0:9000"
            auth = "none"
            port = 4000
            open = true
            disable-telemetry = false
            "#,
        )
        .unwrap();
        assert_eq!(file.args.text("auth"), Some("none"));
        assert_eq!(file.args.port("port"), Some(4000));
        assert!(file.args.flag("open"));
        assert!(!file.args.contains("disable-telemetry"));
        assert!(file.args.contains("bind-addr"));
    }

    #[test]
    fn test_secrets_are_allowed() {
        let file = parse(r#"password = "abc""#).unwrap();
        assert_eq!(file.args.text("password"), Some("abc"));
    }

    #[test]
    fn test_arrays_repeat_the_option() {
        let file = parse(r#"proxy-domain = ["a.com", "b.com"]"#).unwrap();
        assert_eq!(file.args.list("proxy-domain"), ["a.com", "b.com"]);
    }

    #[test]
    fn test_relative_paths_resolve_against_file_dir() {
        let file = parse(
            r#"
            user-data-dir = "data"
            cert = "tls/cert.pem"
            "#,
        )
        .unwrap();
        assert_eq!(
            file.args.path("user-data-dir"),
            Some(Path::new("/etc/codeport/data"))
        );
        // Companion checks are deferred to the resolver for file values.
        assert_eq!(
            file.args.get("cert"),
            Some(&OptionValue::Optional(crate::args::OptionalValue::new(Some(
                "/etc/codeport/tls/cert.pem".into()
            ))))
        );
    }

    #[test]
    fn test_cert_true_is_present_but_empty() {
        let file = parse("cert = true").unwrap();
        assert!(file.args.optional("cert").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = parse(r#"nope = "x""#).unwrap_err();
        match err {
            ConfigError::Invalid { source, .. } => assert_eq!(source.kind(), ErrorKind::UnknownOption),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_enum_value_is_rejected() {
        let err = parse(r#"log = "loud""#).unwrap_err();
        assert!(err.to_string().contains("--log valid values: [trace, debug, info, warn, error]"));
    }

    #[test]
    fn test_unsupported_values() {
        for content in ["port = 1.5", "[daemon]\nport = 1", "enable = [1.0]"] {
            let err = parse(content).unwrap_err();
            assert!(
                matches!(err, ConfigError::UnsupportedValue { .. }),
                "{content}: {err:?}"
            );
        }
    }

    #[test]
    fn test_invalid_toml() {
        let err = parse("not valid toml [[[").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let result = ConfigFile::read(&tmp.path().join("missing.toml"), Registry::standard()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = ConfigFile::read(tmp.path(), Registry::standard()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_locate_tries_candidates_in_order() {
        let tmp = TempDir::new().unwrap();
        let paths = Paths::rooted(tmp.path());
        std::fs::create_dir_all(&paths.config).unwrap();
        std::fs::write(paths.default_config_file(), "locale = \"de\"").unwrap();

        // $CODEPORT_CONFIG points at a missing file, so the default is used.
        let env = Environment::from_pairs([(vars::CONFIG, tmp.path().join("nope.toml").display().to_string())]);
        let cli = RawArguments::new();
        let file = locate(&cli, &env, &paths, Registry::standard()).unwrap().unwrap();
        assert_eq!(file.path, paths.default_config_file());
        assert_eq!(file.args.text("locale"), Some("de"));

        // An existing $CODEPORT_CONFIG wins over the default.
        let custom = tmp.path().join("custom.toml");
        std::fs::write(&custom, "locale = \"fr\"").unwrap();
        let env = Environment::from_pairs([(vars::CONFIG, custom.display().to_string())]);
        let file = locate(&cli, &env, &paths, Registry::standard()).unwrap().unwrap();
        assert_eq!(file.args.text("locale"), Some("fr"));
    }

    #[test]
    fn test_locate_without_any_file() {
        let tmp = TempDir::new().unwrap();
        let paths = Paths::rooted(tmp.path());
        let found = locate(&RawArguments::new(), &Environment::empty(), &paths, Registry::standard()).unwrap();
        assert!(found.is_none());
    }
}
