//! Lexical scanning of an argument vector into [`RawArguments`].
//!
//! The scanner walks tokens left to right against a [`Registry`]:
//!
//! - `--name` / `--name=value` are long options; only the first `=` splits.
//! - `-alias` is matched exactly against short aliases first, so `-vvv`
//!   and `-v` can name different options. Failing that, a multi-letter
//!   token is a bundle of single-letter flag aliases (`-rn`).
//! - A value-taking option without an embedded value consumes the next
//!   token unless it is missing or starts with `-`.
//! - A bare `--` ends option parsing. A bare `-` is a positional.
//!
//! Config files are scanned with the same rules under
//! [`Origin::ConfigFile`], which permits secret options and resolves
//! relative paths against the file's directory.

use std::path::{Component, Path, PathBuf};

use crate::address::{Address, parse_port};
use crate::args::{OptionValue, OptionalValue, RawArguments};
use crate::registry::{Arity, Domain, OptionSpec, Registry};

/// Positional naming standard input rather than a path.
pub const STDIN_ARG: &str = "-";

/// Distinguishable classes of [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingValue,
    InvalidValue,
    InvalidEnumValue,
    UnknownOption,
    SecretOnCommandLine,
    MissingCompanion,
    AmbiguousOptionLikeValue,
    WorkingDirectory,
}

/// Errors from scanning arguments.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("--{option} requires a value")]
    MissingValue { option: &'static str },

    #[error("--{option} {expected}, got {value:?}")]
    InvalidValue {
        option: &'static str,
        value: String,
        expected: String,
    },

    #[error("--{option} valid values: [{}]", .allowed.join(", "))]
    InvalidEnumValue {
        option: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Unknown option {token}")]
    UnknownOption { token: String },

    #[error("--{option} can only be set in the config file or passed in via ${env}")]
    SecretOnCommandLine {
        option: &'static str,
        env: &'static str,
    },

    #[error("--{companion} is missing (required by --{option})")]
    MissingCompanion {
        option: &'static str,
        companion: &'static str,
    },

    #[error("--{option} takes a value and cannot be bundled in {token}; pass it on its own")]
    AmbiguousOptionLikeValue { option: &'static str, token: String },

    #[error("failed to determine the working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::MissingValue { .. } => ErrorKind::MissingValue,
            ParseError::InvalidValue { .. } => ErrorKind::InvalidValue,
            ParseError::InvalidEnumValue { .. } => ErrorKind::InvalidEnumValue,
            ParseError::UnknownOption { .. } => ErrorKind::UnknownOption,
            ParseError::SecretOnCommandLine { .. } => ErrorKind::SecretOnCommandLine,
            ParseError::MissingCompanion { .. } => ErrorKind::MissingCompanion,
            ParseError::AmbiguousOptionLikeValue { .. } => ErrorKind::AmbiguousOptionLikeValue,
            ParseError::WorkingDirectory(_) => ErrorKind::WorkingDirectory,
        }
    }
}

/// Where the tokens being scanned came from.
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    CommandLine,
    ConfigFile { dir: &'a Path },
}

/// Argument scanner bound to a registry and a base directory for
/// command-line paths.
#[derive(Debug, Clone)]
pub struct Scanner {
    registry: Registry,
    cwd: PathBuf,
}

impl Scanner {
    pub fn new(registry: Registry, cwd: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            cwd: cwd.into(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Scan a command-line argument vector (without the program name).
    pub fn scan<S: AsRef<str>>(&self, argv: &[S]) -> Result<RawArguments, ParseError> {
        self.scan_from(argv, Origin::CommandLine)
    }

    /// Scan tokens from the given origin.
    pub fn scan_from<S: AsRef<str>>(
        &self,
        argv: &[S],
        origin: Origin<'_>,
    ) -> Result<RawArguments, ParseError> {
        let base = match origin {
            Origin::CommandLine => self.cwd.as_path(),
            Origin::ConfigFile { dir } => dir,
        };
        let mut out = RawArguments::new();
        let mut only_positional = false;
        let mut i = 0;

        while i < argv.len() {
            let arg = argv[i].as_ref();
            i += 1;

            if only_positional {
                out.push_positional(arg.to_string());
                continue;
            }
            if arg == "--" {
                only_positional = true;
                continue;
            }
            if arg == STDIN_ARG {
                out.push_positional(arg.to_string());
                continue;
            }

            if let Some(long) = arg.strip_prefix("--") {
                let (name, embedded) = match long.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (long, None),
                };
                let spec = self
                    .registry
                    .get(name)
                    .ok_or_else(|| ParseError::UnknownOption {
                        token: arg.to_string(),
                    })?;
                self.take(spec, embedded, argv, &mut i, origin, base, &mut out)?;
            } else if let Some(alias) = arg.strip_prefix('-') {
                if let Some(spec) = self.registry.by_short(alias) {
                    self.take(spec, None, argv, &mut i, origin, base, &mut out)?;
                } else if alias.chars().count() > 1 {
                    self.take_bundle(arg, alias, &mut out)?;
                } else {
                    return Err(ParseError::UnknownOption {
                        token: arg.to_string(),
                    });
                }
            } else {
                out.push_positional(arg.to_string());
            }
        }

        if let Origin::CommandLine = origin {
            self.check_companions(&out)?;
        }
        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    fn take<S: AsRef<str>>(
        &self,
        spec: &'static OptionSpec,
        embedded: Option<&str>,
        argv: &[S],
        i: &mut usize,
        origin: Origin<'_>,
        base: &Path,
        out: &mut RawArguments,
    ) -> Result<(), ParseError> {
        if spec.forbidden_on_command_line {
            if let Origin::CommandLine = origin {
                return Err(ParseError::SecretOnCommandLine {
                    option: spec.name,
                    env: spec.env.unwrap_or("the environment"),
                });
            }
        }

        if spec.arity == Arity::Flag {
            if let Some(value) = embedded {
                return Err(ParseError::InvalidValue {
                    option: spec.name,
                    value: value.to_string(),
                    expected: "does not take a value".to_string(),
                });
            }
            out.set(spec.name, OptionValue::Flag);
            return Ok(());
        }

        let value = match embedded {
            Some(value) => Some(value),
            None => match argv.get(*i).map(|s| s.as_ref()) {
                Some(next) if !next.starts_with('-') => {
                    *i += 1;
                    Some(next)
                }
                _ => None,
            },
        };

        let value = match (spec.arity, value) {
            (Arity::Optional, None | Some("")) => {
                out.set(spec.name, OptionValue::Optional(OptionalValue::empty()));
                return Ok(());
            }
            (Arity::Optional, Some("false")) => {
                out.remove(spec.name);
                return Ok(());
            }
            (_, None | Some("")) => return Err(ParseError::MissingValue { option: spec.name }),
            (_, Some(value)) => value,
        };

        match coerce(spec, value, base)? {
            OptionValue::Text(item) if spec.arity == Arity::Repeatable => out.push(spec.name, item),
            OptionValue::Path(path) if spec.arity == Arity::Optional => {
                let value = path.to_string_lossy().into_owned();
                out.set(spec.name, OptionValue::Optional(OptionalValue::new(Some(value))));
            }
            OptionValue::Text(text) if spec.arity == Arity::Optional => {
                out.set(spec.name, OptionValue::Optional(OptionalValue::new(Some(text))));
            }
            coerced => out.set(spec.name, coerced),
        }
        Ok(())
    }

    fn take_bundle(&self, token: &str, letters: &str, out: &mut RawArguments) -> Result<(), ParseError> {
        for letter in letters.chars() {
            let mut buf = [0u8; 4];
            let alias: &str = letter.encode_utf8(&mut buf);
            match self.registry.by_short(alias) {
                Some(spec) if spec.arity == Arity::Flag => out.set(spec.name, OptionValue::Flag),
                Some(spec) => {
                    return Err(ParseError::AmbiguousOptionLikeValue {
                        option: spec.name,
                        token: token.to_string(),
                    });
                }
                None => {
                    return Err(ParseError::UnknownOption {
                        token: token.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_companions(&self, out: &RawArguments) -> Result<(), ParseError> {
        for spec in self.registry.iter() {
            let Some(companion) = spec.requires_companion else {
                continue;
            };
            let set = out.get(spec.name).is_some_and(OptionValue::is_non_empty);
            if set && !out.contains(companion) {
                return Err(ParseError::MissingCompanion {
                    option: spec.name,
                    companion,
                });
            }
        }
        Ok(())
    }
}

/// Parse a command-line argument vector with the standard registry,
/// resolving paths against the current working directory.
pub fn parse<S: AsRef<str>>(argv: &[S]) -> Result<RawArguments, ParseError> {
    let cwd = std::env::current_dir().map_err(ParseError::WorkingDirectory)?;
    Scanner::new(Registry::standard(), cwd).scan(argv)
}

/// Coerce a raw string into the option's value domain.
pub(crate) fn coerce(spec: &'static OptionSpec, value: &str, base: &Path) -> Result<OptionValue, ParseError> {
    match spec.domain {
        Domain::Text => Ok(OptionValue::Text(value.to_string())),
        Domain::Enum(allowed) => {
            if allowed.contains(&value) {
                Ok(OptionValue::Text(value.to_string()))
            } else {
                Err(ParseError::InvalidEnumValue {
                    option: spec.name,
                    value: value.to_string(),
                    allowed,
                })
            }
        }
        Domain::Port => parse_port(value)
            .map(OptionValue::Port)
            .ok_or_else(|| ParseError::InvalidValue {
                option: spec.name,
                value: value.to_string(),
                expected: "must be a number between 0 and 65535".to_string(),
            }),
        Domain::Path => Ok(OptionValue::Path(absolutize(base, value))),
        Domain::BindAddr => Address::parse_bind_addr(value)
            .map(OptionValue::BindAddr)
            .map_err(|reason| ParseError::InvalidValue {
                option: spec.name,
                value: value.to_string(),
                expected: format!("must be host:port ({reason})"),
            }),
    }
}

/// Resolve `value` against `base` and fold `.`/`..` lexically.
pub fn absolutize(base: &Path, value: impl AsRef<Path>) -> PathBuf {
    let joined = base.join(value.as_ref());
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
