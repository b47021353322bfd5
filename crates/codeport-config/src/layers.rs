//! Ordered configuration layers and value provenance.
//!
//! Resolution asks each [`Layer`] in precedence order for an option and
//! takes the first answer. The stack is command line, then environment,
//! then config file; hard-coded defaults live in the resolver.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::args::{OptionValue, RawArguments};
use crate::env::Environment;
use crate::file::ConfigFile;
use crate::registry::OptionSpec;
use crate::scanner::coerce;

/// Which layer supplied a resolved value. Recorded for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum Source {
    CommandLine,
    Environment(&'static str),
    ConfigFile(PathBuf),
    /// Computed from other options, or forced by an override.
    Derived,
    Default,
}

impl Source {
    /// Rank among layers; a higher rank wins. Overrides outrank every layer.
    pub fn precedence(&self) -> u8 {
        match self {
            Source::Default => 0,
            Source::ConfigFile(_) => 1,
            Source::Environment(_) => 2,
            Source::CommandLine => 3,
            Source::Derived => 4,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::CommandLine => write!(f, "command line"),
            Source::Environment(var) => write!(f, "env:{var}"),
            Source::ConfigFile(path) => write!(f, "file:{}", path.display()),
            Source::Derived => write!(f, "derived"),
            Source::Default => write!(f, "default"),
        }
    }
}

/// One source of option values.
#[derive(Debug, Clone, Copy)]
pub enum Layer<'a> {
    CommandLine(&'a RawArguments),
    Environment(&'a Environment),
    ConfigFile(&'a ConfigFile),
}

impl Layer<'_> {
    /// The value this layer holds for `spec`, if any.
    ///
    /// Environment values that do not fit the option's domain are
    /// ignored with a warning rather than failing resolution.
    pub fn lookup(&self, spec: &'static OptionSpec) -> Option<(OptionValue, Source)> {
        match self {
            Layer::CommandLine(raw) => raw.get(spec.name).map(|v| (v.clone(), Source::CommandLine)),
            Layer::ConfigFile(file) => file
                .args
                .get(spec.name)
                .map(|v| (v.clone(), Source::ConfigFile(file.path.clone()))),
            Layer::Environment(env) => {
                let var = spec.env?;
                let raw = env.get(var)?;
                match coerce(spec, raw, Path::new("/")) {
                    Ok(value) => Some((value, Source::Environment(var))),
                    Err(error) => {
                        warn!(var, %error, "Ignoring invalid environment value");
                        None
                    }
                }
            }
        }
    }
}

/// Layers in precedence order, highest first.
#[derive(Debug, Clone)]
pub struct LayerStack<'a> {
    layers: Vec<Layer<'a>>,
}

impl<'a> LayerStack<'a> {
    /// The standard stack: command line, environment, config file.
    pub fn new(cli: &'a RawArguments, env: &'a Environment, file: Option<&'a ConfigFile>) -> Self {
        let mut layers = vec![Layer::CommandLine(cli), Layer::Environment(env)];
        if let Some(file) = file {
            layers.push(Layer::ConfigFile(file));
        }
        Self { layers }
    }

    /// First value for `spec`, walking layers highest precedence first.
    pub fn lookup(&self, spec: &'static OptionSpec) -> Option<(OptionValue, Source)> {
        self.layers.iter().find_map(|layer| layer.lookup(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::scanner::{Origin, Scanner};
    use pretty_assertions::assert_eq;

    fn spec(name: &str) -> &'static OptionSpec {
        Registry::standard().get(name).unwrap()
    }

    fn config_file(tokens: &[&str]) -> ConfigFile {
        let dir = Path::new("/etc/codeport");
        let args = Scanner::new(Registry::standard(), "/")
            .scan_from(tokens, Origin::ConfigFile { dir })
            .unwrap();
        ConfigFile {
            path: dir.join("config.toml"),
            args,
        }
    }

    #[test]
    fn test_command_line_wins() {
        let cli = Scanner::new(Registry::standard(), "/").scan(&["--port", "1"]).unwrap();
        let env = Environment::from_pairs([("PORT", "2")]);
        let file = config_file(&["--port=3"]);
        let stack = LayerStack::new(&cli, &env, Some(&file));

        assert_eq!(
            stack.lookup(spec("port")),
            Some((OptionValue::Port(1), Source::CommandLine))
        );
    }

    #[test]
    fn test_environment_beats_config_file() {
        let cli = RawArguments::new();
        let env = Environment::from_pairs([("PORT", "2")]);
        let file = config_file(&["--port=3"]);
        let stack = LayerStack::new(&cli, &env, Some(&file));

        assert_eq!(
            stack.lookup(spec("port")),
            Some((OptionValue::Port(2), Source::Environment("PORT")))
        );
    }

    #[test]
    fn test_falls_through_to_config_file() {
        let cli = RawArguments::new();
        let env = Environment::empty();
        let file = config_file(&["--locale=fr"]);
        let stack = LayerStack::new(&cli, &env, Some(&file));

        let (value, source) = stack.lookup(spec("locale")).unwrap();
        assert_eq!(value, OptionValue::Text("fr".into()));
        assert_eq!(source, Source::ConfigFile(PathBuf::from("/etc/codeport/config.toml")));
        assert_eq!(stack.lookup(spec("host")), None);
    }

    #[test]
    fn test_invalid_environment_value_is_skipped() {
        let cli = RawArguments::new();
        let env = Environment::from_pairs([("PORT", "eighty"), ("LOG_LEVEL", "loud")]);
        let file = config_file(&["--port=3"]);
        let stack = LayerStack::new(&cli, &env, Some(&file));

        assert_eq!(stack.lookup(spec("port")).unwrap().0, OptionValue::Port(3));
        assert_eq!(stack.lookup(spec("log")), None);
    }

    #[test]
    fn test_options_without_env_binding_ignore_environment() {
        let cli = RawArguments::new();
        let env = Environment::from_pairs([("HOST", "0.0.0.0"), ("host", "0.0.0.0")]);
        let stack = LayerStack::new(&cli, &env, None);
        assert_eq!(stack.lookup(spec("host")), None);
    }

    #[test]
    fn test_precedence_follows_layer_order() {
        let file = Source::ConfigFile(PathBuf::from("/etc/codeport/config.toml"));
        assert!(Source::CommandLine.precedence() > Source::Environment("PORT").precedence());
        assert!(Source::Environment("PORT").precedence() > file.precedence());
        assert!(file.precedence() > Source::Default.precedence());
        assert!(Source::Derived.precedence() > Source::CommandLine.precedence());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(Source::Environment("PORT").to_string(), "env:PORT");
        assert_eq!(Source::CommandLine.to_string(), "command line");
    }
}
