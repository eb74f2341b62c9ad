//! Secure credential handling using the secrecy crate
//!
//! This module provides type aliases and utilities for handling sensitive
//! values in memory: configuration credentials, passwords supplied in the
//! import file, and the temporary leader passwords that are shown exactly once.
//! Values wrapped in `Secret<T>` are zeroed on drop and redacted in `Debug`.
//!
//! # Example
//!
//! ```rust
//! use cell_import::config::{SecretString, SecretValue};
//! use secrecy::{Secret, ExposeSecret};
//!
//! let password: SecretString = Secret::new(SecretValue::from("my-password".to_string()));
//! let password_str = password.expose_secret();
//!
//! // Debug output is redacted
//! println!("{:?}", password);
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        SecretValue(s.to_string())
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Borrow the value as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
///
/// This wraps a `SecretValue` in a `Secret` container that:
/// - Zeros the memory when dropped
/// - Prevents accidental logging via Debug
/// - Requires explicit `expose_secret()` to access
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
///
/// ```rust
/// use cell_import::config::secret_string;
///
/// let password = secret_string("my-password".to_string());
/// ```
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Helper function to create an optional SecretString from an optional String
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(|s| Secret::new(SecretValue::from(s)))
}

/// A secret that can be read out exactly once
///
/// Generated leader passwords live only in pipeline memory. The credential
/// export reads them with [`OneTimeSecret::peek`] and, once the file is on
/// disk, drops them with [`OneTimeSecret::take`]. After that the holder is
/// empty and nothing can recover the value.
#[derive(Default)]
pub struct OneTimeSecret(Option<SecretString>);

impl OneTimeSecret {
    /// Wrap a secret for a single read
    pub fn new(secret: SecretString) -> Self {
        Self(Some(secret))
    }

    /// An already-consumed (or never populated) holder
    pub fn empty() -> Self {
        Self(None)
    }

    /// Whether the secret is still available
    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// Borrow the secret without consuming it
    pub fn peek(&self) -> Option<&SecretString> {
        self.0.as_ref()
    }

    /// Move the secret out, leaving the holder empty
    pub fn take(&mut self) -> Option<SecretString> {
        self.0.take()
    }
}

impl fmt::Debug for OneTimeSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("OneTimeSecret([REDACTED])"),
            None => f.write_str("OneTimeSecret(<consumed>)"),
        }
    }
}
