//! HTTP-specific error types for the clothing comparator SDK.
//!
//! - [`HttpResponseError`]: Non-2xx HTTP responses from the API
//! - [`InvalidHttpRequestError`]: When a request fails validation before sending
//! - [`HttpError`]: Unified error type encompassing all HTTP-related errors
//!
//! # Example
//!
//! ```rust,ignore
//! use clothing_comparator::clients::{HttpClient, HttpRequest, HttpMethod, HttpError};
//!
//! match client.request(request).await {
//!     Ok(response) => println!("Success: {}", response.body),
//!     Err(HttpError::Response(e)) => println!("API error {}: {}", e.code, e.message),
//!     Err(HttpError::InvalidRequest(e)) => println!("Invalid request: {}", e),
//!     Err(HttpError::Network(e)) => println!("Network error: {}", e),
//! }
//! ```

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Error returned when an HTTP request receives a non-successful response.
///
/// The message is extracted from the response body: the `error`, `detail` or
/// `message` field when present, otherwise the per-field validation messages,
/// otherwise a generic fallback naming the status code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Message extracted from the response body.
    pub message: String,
    /// Per-field validation messages, if the body carried any.
    pub field_errors: BTreeMap<String, Vec<String>>,
    /// Whether the server asked the user to register first.
    pub should_register: bool,
}

impl HttpResponseError {
    /// Builds an error from a status code and a (possibly `Null`) JSON body.
    ///
    /// # Example
    ///
    /// ```rust
    /// use clothing_comparator::clients::HttpResponseError;
    /// use serde_json::json;
    ///
    /// let error = HttpResponseError::from_body(401, &json!({"error": "Invalid password"}));
    /// assert_eq!(error.message, "Invalid password");
    ///
    /// let error = HttpResponseError::from_body(502, &serde_json::Value::Null);
    /// assert_eq!(error.message, "Request failed with status 502");
    /// ```
    #[must_use]
    pub fn from_body(code: u16, body: &Value) -> Self {
        let field_errors = Self::collect_field_errors(body);

        let message = ["error", "detail", "message"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(String::from)
            .or_else(|| Self::summarize_fields(&field_errors))
            .unwrap_or_else(|| Self::fallback_message(code));

        let should_register = body
            .get("should_register")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self {
            code,
            message,
            field_errors,
            should_register,
        }
    }

    /// Generic message used when the body carries nothing readable.
    #[must_use]
    pub fn fallback_message(code: u16) -> String {
        format!("Request failed with status {code}")
    }

    /// Collects `{"field": ["msg", ...]}` and `{"field": "msg"}` entries.
    fn collect_field_errors(body: &Value) -> BTreeMap<String, Vec<String>> {
        let mut fields = BTreeMap::new();
        let Some(object) = body.as_object() else {
            return fields;
        };

        for (key, value) in object {
            if matches!(key.as_str(), "error" | "detail" | "message" | "should_register") {
                continue;
            }
            let messages: Vec<String> = match value {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect(),
                _ => Vec::new(),
            };
            if !messages.is_empty() {
                fields.insert(key.clone(), messages);
            }
        }
        fields
    }

    fn summarize_fields(fields: &BTreeMap<String, Vec<String>>) -> Option<String> {
        if fields.is_empty() {
            return None;
        }
        let parts: Vec<String> = fields
            .iter()
            .map(|(field, messages)| {
                if field == "non_field_errors" {
                    messages.join(" ")
                } else {
                    format!("{field}: {}", messages.join(" "))
                }
            })
            .collect();
        Some(parts.join("; "))
    }
}

/// Error returned when an HTTP request fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// The request path was empty.
    #[error("Request path cannot be empty.")]
    EmptyPath,
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_from_error_field() {
        let error = HttpResponseError::from_body(
            404,
            &json!({"error": "Email not found. Please register first.", "should_register": true}),
        );
        assert_eq!(error.code, 404);
        assert_eq!(error.message, "Email not found. Please register first.");
        assert!(error.should_register);
        assert!(error.field_errors.is_empty());
    }

    #[test]
    fn test_message_from_detail_field() {
        let error = HttpResponseError::from_body(
            401,
            &json!({"detail": "Given token not valid for any token type", "code": "token_not_valid"}),
        );
        assert_eq!(error.message, "Given token not valid for any token type");
        assert!(!error.should_register);
    }

    #[test]
    fn test_field_errors_are_collected_and_summarized() {
        let error = HttpResponseError::from_body(
            400,
            &json!({
                "email": ["user with this email already exists."],
                "password": "This password is too short."
            }),
        );
        assert_eq!(
            error.field_errors.get("email"),
            Some(&vec!["user with this email already exists.".to_string()])
        );
        assert_eq!(
            error.message,
            "email: user with this email already exists.; password: This password is too short."
        );
    }

    #[test]
    fn test_non_field_errors_have_no_prefix() {
        let error = HttpResponseError::from_body(
            400,
            &json!({"non_field_errors": ["Password fields didn't match."]}),
        );
        assert_eq!(error.message, "Password fields didn't match.");
    }

    #[test]
    fn test_unparsable_body_uses_fallback() {
        let error = HttpResponseError::from_body(500, &Value::Null);
        assert_eq!(error.message, "Request failed with status 500");

        let error = HttpResponseError::from_body(500, &json!({"results": []}));
        assert_eq!(error.message, "Request failed with status 500");
    }

    #[test]
    fn test_invalid_request_error_missing_body() {
        let error = InvalidHttpRequestError::MissingBody {
            method: "post".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot use post without specifying data.");
    }
}
