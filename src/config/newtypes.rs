//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated API base URL.
///
/// Must start with `http://` or `https://` and name a host. A trailing slash
/// is removed so paths can be joined uniformly.
///
/// # Example
///
/// ```rust
/// use clothing_comparator::ApiBaseUrl;
///
/// let url = ApiBaseUrl::new("http://localhost:8000/api/").unwrap();
/// assert_eq!(url.as_ref(), "http://localhost:8000/api");
/// assert_eq!(url.join("search"), "http://localhost:8000/api/search");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiBaseUrl(String);

impl ApiBaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL has no scheme or host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');

        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"));

        match rest {
            Some(rest) if !rest.is_empty() && !rest.starts_with('/') && !rest.contains(' ') => {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(ConfigError::InvalidBaseUrl { url }),
        }
    }

    /// Joins an endpoint path onto the base URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for ApiBaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiBaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The key under which the session is persisted.
///
/// Keys are used as file names by [`FileSessionStore`](crate::auth::FileSessionStore),
/// so only ASCII letters, digits, `-` and `_` are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key used when none is configured.
    pub const DEFAULT: &'static str = "clothing_comparator_session";

    /// Creates a new validated storage key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidStorageKey`] if the key is empty or
    /// contains other characters.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ConfigError::InvalidStorageKey { key });
        }
        Ok(Self(key))
    }
}

impl Default for StorageKey {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for StorageKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StorageKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}
