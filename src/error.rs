//! Error types for the clothing comparator SDK.
//!
//! This module contains the configuration error type and [`ClientError`], the
//! single error type returned by the auth, search and history clients.
//!
//! # Error Taxonomy
//!
//! - **Validation** ([`ClientError::Validation`]): bad local input. Resolved
//!   locally, never sent to the server.
//! - **Request** ([`ClientError::Request`]): transport failure, no response.
//! - **Response** ([`ClientError::Response`], [`ClientError::InvalidCredentials`],
//!   [`ClientError::ShouldRegister`]): the server answered with a non-success
//!   status and (usually) a message.
//! - **Session expired** ([`ClientError::SessionExpired`]): an authorization
//!   failure that a single token refresh did not resolve.
//!
//! No error is fatal; every variant can be rendered with
//! [`ClientError::user_message`].
//!
//! # Example
//!
//! ```rust
//! use clothing_comparator::{ApiBaseUrl, ConfigError};
//!
//! let result = ApiBaseUrl::new("");
//! assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::auth::StorageError;
use crate::clients::{HttpError, HttpResponseError, InvalidHttpRequestError};

/// Errors that can occur during SDK configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL is invalid.
    #[error("Invalid API base URL '{url}'. Please provide a URL with scheme (e.g., 'http://localhost:8000/api').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Storage key is invalid.
    #[error("Invalid storage key '{key}'. Use letters, digits, '-' or '_' only.")]
    InvalidStorageKey {
        /// The invalid key that was provided.
        key: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}

/// Local input that was rejected before reaching the network.
///
/// Server-side validation failures (for example a duplicate email on
/// registration) are also reported with this type so the caller can render
/// per-field messages the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Human readable summary.
    pub message: String,
    /// Per-field messages, keyed by field name.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// Creates a validation error with only a summary message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Creates a validation error for a single field.
    #[must_use]
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = BTreeMap::new();
        fields.insert(field.into(), vec![message.clone()]);
        Self { message, fields }
    }
}

/// Errors returned by the API clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local input failed validation; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Network or connection error; no response was received.
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The server returned a non-success status.
    #[error(transparent)]
    Response(HttpResponseError),

    /// Login was rejected because the password did not match.
    #[error("Invalid credentials: {message}")]
    InvalidCredentials {
        /// The server's message.
        message: String,
    },

    /// Login was rejected because no account exists for the email.
    #[error("Account not found: {message}")]
    ShouldRegister {
        /// The server's message.
        message: String,
    },

    /// Authorization failed and a single refresh did not resolve it.
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// The operation requires a session and none is stored.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The server answered successfully but the body had an unexpected shape.
    #[error("Unexpected response: {reason}")]
    UnexpectedResponse {
        /// What was wrong with the body.
        reason: String,
    },

    /// The same form is already being submitted.
    #[error("A submission of this form is already in progress")]
    InProgress,

    /// The session could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The request was malformed before sending.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),
}

impl ClientError {
    /// Returns `true` if this is an HTTP 401 response.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Response(e) if e.code == 401)
    }

    /// Returns the message a view should show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.message.clone(),
            Self::Response(e) => e.message.clone(),
            Self::InvalidCredentials { message } | Self::ShouldRegister { message } => {
                message.clone()
            }
            Self::Request(_) => {
                "Could not reach the server. Please check your connection and try again."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<HttpError> for ClientError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Response(e) => Self::Response(e),
            HttpError::InvalidRequest(e) => Self::InvalidRequest(e),
            HttpError::Network(e) => Self::Request(e),
        }
    }
}
