//! Secret-bearing option values.
//!
//! Passwords and password hashes are held in a [`SecretValue`], which is
//! zeroized on drop and never shown by `Debug`.

use std::fmt;

use zeroize::Zeroize;

/// A secret string with automatic zeroization.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue {
    inner: String,
}

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Get the secret value as a string slice.
    ///
    /// The only way the value leaves the wrapper.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretValue")
            .field("inner", &"[REDACTED]")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl Drop for SecretValue {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

/// Which secret validates editor sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    /// A password hash; preferred whenever one is available.
    Hashed(&'a SecretValue),
    /// A plain-text password.
    Plain(&'a SecretValue),
    /// No secret configured in any layer.
    Missing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretValue::new("hunter2");
        let debug = format!("{secret:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("len: 7"));
    }

    #[test]
    fn test_expose() {
        let secret = SecretValue::new("s3cret");
        assert_eq!(secret.expose(), "s3cret");
        assert_eq!(secret.len(), 6);
        assert!(!secret.is_empty());
    }
}
