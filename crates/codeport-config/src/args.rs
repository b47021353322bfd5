//! Typed values produced by the scanner.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::address::Address;

/// Value of an optional-value option: present with a value, or present
/// but empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionalValue {
    pub value: Option<String>,
}

impl OptionalValue {
    pub fn new(value: Option<String>) -> Self {
        Self { value }
    }

    /// Present without a value.
    pub fn empty() -> Self {
        Self { value: None }
    }

    pub fn is_empty(&self) -> bool {
        self.value.as_deref().is_none_or(str::is_empty)
    }
}

/// A coerced option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag,
    Text(String),
    Port(u16),
    Path(PathBuf),
    BindAddr(Address),
    Optional(OptionalValue),
    List(Vec<String>),
}

impl OptionValue {
    /// Whether the value counts as "set" for companion checks.
    pub fn is_non_empty(&self) -> bool {
        match self {
            OptionValue::Flag => true,
            OptionValue::Text(s) => !s.is_empty(),
            OptionValue::Port(_) | OptionValue::Path(_) | OptionValue::BindAddr(_) => true,
            OptionValue::Optional(v) => !v.is_empty(),
            OptionValue::List(items) => !items.is_empty(),
        }
    }
}

/// Options and positionals from one source (argv or a config file).
///
/// Keys are present only for options that were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArguments {
    values: BTreeMap<&'static str, OptionValue>,
    positionals: Vec<String>,
}

impl RawArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Flag))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn port(&self, name: &str) -> Option<u16> {
        match self.values.get(name) {
            Some(OptionValue::Port(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        match self.values.get(name) {
            Some(OptionValue::Path(p)) => Some(p),
            _ => None,
        }
    }

    pub fn optional(&self, name: &str) -> Option<&OptionalValue> {
        match self.values.get(name) {
            Some(OptionValue::Optional(v)) => Some(v),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> &[String] {
        match self.values.get(name) {
            Some(OptionValue::List(items)) => items,
            _ => &[],
        }
    }

    /// Positional arguments in encounter order.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Names of the options that were supplied.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.positionals.is_empty()
    }

    pub(crate) fn set(&mut self, name: &'static str, value: OptionValue) {
        self.values.insert(name, value);
    }

    pub(crate) fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }

    pub(crate) fn push(&mut self, name: &'static str, item: String) {
        match self.values.get_mut(name) {
            Some(OptionValue::List(items)) => items.push(item),
            _ => {
                self.values.insert(name, OptionValue::List(vec![item]));
            }
        }
    }

    pub(crate) fn push_positional(&mut self, arg: String) {
        self.positionals.push(arg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_variant() {
        let mut raw = RawArguments::new();
        raw.set("open", OptionValue::Flag);
        raw.set("port", OptionValue::Port(3000));
        raw.set("locale", OptionValue::Text("en-US".into()));

        assert!(raw.flag("open"));
        assert_eq!(raw.port("port"), Some(3000));
        assert_eq!(raw.text("locale"), Some("en-US"));
        // Wrong variant reads as absent.
        assert_eq!(raw.text("port"), None);
        assert!(!raw.flag("locale"));
        assert!(raw.list("enable").is_empty());
    }

    #[test]
    fn test_push_accumulates_in_order() {
        let mut raw = RawArguments::new();
        raw.push("enable", "b".into());
        raw.push("enable", "a".into());
        raw.push("enable", "b".into());
        assert_eq!(raw.list("enable"), ["b", "a", "b"]);
    }

    #[test]
    fn test_optional_emptiness() {
        assert!(OptionalValue::empty().is_empty());
        assert!(OptionalValue::new(Some(String::new())).is_empty());
        assert!(!OptionalValue::new(Some("cert.pem".into())).is_empty());
        assert!(!OptionValue::Optional(OptionalValue::empty()).is_non_empty());
    }
}
