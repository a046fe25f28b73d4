//! Configuration types for the clothing comparator SDK.
//!
//! This module provides the configuration types used to point the clients at
//! an API deployment and to name the persisted session slot.
//!
//! # Overview
//!
//! - [`ClientConfig`]: The main configuration struct holding all SDK settings
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`ApiBaseUrl`]: A validated API base URL
//! - [`StorageKey`]: A validated name for the persisted session slot
//! - [`Endpoints`]: The endpoint paths, relative to the base URL
//!
//! # Example
//!
//! ```rust
//! use clothing_comparator::{ClientConfig, ApiBaseUrl};
//!
//! let config = ClientConfig::builder()
//!     .base_url(ApiBaseUrl::new("http://localhost:8000/api").unwrap())
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;

pub use newtypes::{ApiBaseUrl, StorageKey};

use std::time::Duration;

use crate::error::ConfigError;

/// Endpoint paths relative to the API base URL.
///
/// Host and path are deployment configuration; the defaults match the
/// reference server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// Account creation.
    pub register: String,
    /// Credential exchange for a token pair.
    pub login: String,
    /// Access token renewal.
    pub refresh: String,
    /// Product search.
    pub search: String,
    /// Saves a search to the user's history.
    pub history_save: String,
    /// Lists the user's history.
    pub history: String,
    /// Profile read and update.
    pub profile: String,
    /// Password change for a signed-in user.
    pub change_password: String,
    /// Password reset request; the confirm path is `{password_reset}/{token}`.
    pub password_reset: String,
    /// Verification email request; the confirm path is `{verify_email}/{token}`.
    pub verify_email: String,
    /// Stored search preferences, read and replace.
    pub preferences: String,
    /// Single stored product; the item path is `{item}/{id}`.
    pub item: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            register: "auth/register".to_string(),
            login: "auth/login".to_string(),
            refresh: "auth/token/refresh".to_string(),
            search: "search".to_string(),
            history_save: "search/save".to_string(),
            history: "history".to_string(),
            profile: "profile".to_string(),
            change_password: "auth/change-password".to_string(),
            password_reset: "auth/reset-password".to_string(),
            verify_email: "auth/verify-email".to_string(),
            preferences: "auth/preferences".to_string(),
            item: "clothing".to_string(),
        }
    }
}

/// Configuration for the clothing comparator SDK.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: ApiBaseUrl,
    endpoints: Endpoints,
    storage_key: StorageKey,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &ApiBaseUrl {
        &self.base_url
    }

    /// Returns the endpoint paths.
    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Returns the key of the persisted session slot.
    #[must_use]
    pub const fn storage_key(&self) -> &StorageKey {
        &self.storage_key
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the client-side request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// `base_url` is required. All other fields have defaults.
///
/// # Defaults
///
/// - `endpoints`: [`Endpoints::default`]
/// - `storage_key`: [`StorageKey::DEFAULT`]
/// - `user_agent_prefix`: `None`
/// - `timeout`: `None` (no client-side timeout)
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<ApiBaseUrl>,
    endpoints: Option<Endpoints>,
    storage_key: Option<StorageKey>,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: ApiBaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Overrides the endpoint paths.
    #[must_use]
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Sets the key of the persisted session slot.
    #[must_use]
    pub fn storage_key(mut self, key: StorageKey) -> Self {
        self.storage_key = Some(key);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets a client-side timeout applied to every request.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`ClientConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` is not set.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        Ok(ClientConfig {
            base_url,
            endpoints: self.endpoints.unwrap_or_default(),
            storage_key: self.storage_key.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> ApiBaseUrl {
        ApiBaseUrl::new("http://localhost:8000/api").unwrap()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "base_url" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ClientConfig::builder().base_url(base_url()).build().unwrap();

        assert_eq!(config.endpoints(), &Endpoints::default());
        assert_eq!(config.storage_key().as_ref(), StorageKey::DEFAULT);
        assert!(config.user_agent_prefix().is_none());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let endpoints = Endpoints {
            login: "auth/token/".to_string(),
            ..Endpoints::default()
        };

        let config = ClientConfig::builder()
            .base_url(base_url())
            .endpoints(endpoints)
            .storage_key(StorageKey::new("user").unwrap())
            .user_agent_prefix("Comparator/2.0")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        assert_eq!(config.endpoints().login, "auth/token/");
        assert_eq!(config.storage_key().as_ref(), "user");
        assert_eq!(config.user_agent_prefix(), Some("Comparator/2.0"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.login, "auth/login");
        assert_eq!(endpoints.refresh, "auth/token/refresh");
        assert_eq!(endpoints.history_save, "search/save");
        assert_eq!(endpoints.verify_email, "auth/verify-email");
        assert_eq!(endpoints.preferences, "auth/preferences");
        assert_eq!(endpoints.item, "clothing");
    }

    #[test]
    fn test_config_is_clone_and_debug() {
        let config = ClientConfig::builder().base_url(base_url()).build().unwrap();
        let cloned = config.clone();
        assert_eq!(cloned.base_url(), config.base_url());
        assert!(format!("{config:?}").contains("ClientConfig"));
    }
}
