//! HTTP client for the clothing comparator API.
//!
//! This module provides the [`HttpClient`] type, which sends exactly one
//! network request per call. Retrying after an authorization failure is the
//! caller's decision (see [`AuthClient::authorized`](crate::auth::AuthClient::authorized)).

use std::collections::HashMap;

use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{ApiBaseUrl, ClientConfig};

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the API.
///
/// The client handles:
/// - URL construction from the configured base URL
/// - Default headers including User-Agent
/// - The `Authorization: Bearer` header when a request carries a token
/// - Error message extraction from non-2xx bodies
///
/// Cloning is cheap; clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use clothing_comparator::{ClientConfig, ApiBaseUrl};
/// use clothing_comparator::clients::{HttpClient, HttpRequest, HttpMethod};
///
/// let config = ClientConfig::builder()
///     .base_url(ApiBaseUrl::new("http://localhost:8000/api").unwrap())
///     .build()
///     .unwrap();
///
/// let client = HttpClient::new(&config);
/// let request = HttpRequest::builder(HttpMethod::Get, "search")
///     .query_param("query", "linen kurta")
///     .build()
///     .unwrap();
///
/// let response = client.request(request).await?;
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: ApiBaseUrl,
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from the configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}Clothing Comparator Client v{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|error| {
            tracing::warn!(%error, "Falling back to a default HTTP client");
            reqwest::Client::new()
        });

        Self {
            client,
            base_url: config.base_url().clone(),
            default_headers,
        }
    }

    /// Returns the base URL for this client.
    #[must_use]
    pub const fn base_url(&self) -> &ApiBaseUrl {
        &self.base_url
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends an HTTP request to the API.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.base_url.join(&request.path);

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
        };

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(token) = &request.bearer_token {
            req_builder = req_builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        tracing::debug!(
            method = %request.http_method,
            path = %request.path,
            authorized = request.bearer_token.is_some(),
            "Sending API request"
        );

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let body_text = res.text().await.unwrap_or_default();

        let body = if body_text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&body_text).unwrap_or(serde_json::Value::Null)
        };

        let response = HttpResponse::new(code, body);

        if response.is_ok() {
            return Ok(response);
        }

        let error = HttpResponseError::from_body(code, &response.body);
        tracing::debug!(
            code,
            path = %request.path,
            message = %error.message,
            "API request failed"
        );
        Err(HttpError::Response(error))
    }
}
