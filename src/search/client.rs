//! The search client.

use crate::auth::AuthClient;
use crate::clients::{HttpMethod, HttpRequest};
use crate::config::ClientConfig;
use crate::error::{ClientError, ValidationError};
use crate::history::HistoryClient;
use crate::search::{ProductResult, SearchQuery, SearchResponse};

/// Client for the product search endpoint.
///
/// Each call issues one request. When a session exists its bearer token is
/// attached, and a 401 triggers exactly one token refresh and one retry
/// (see [`AuthClient::optionally_authorized`]).
///
/// # Example
///
/// ```rust,ignore
/// use clothing_comparator::search::{SearchClient, SearchQuery, SearchFilters, Color};
///
/// let search = SearchClient::new(&config, auth.clone()).with_history(history);
/// let response = search
///     .search(&SearchQuery::new(
///         "black shirt",
///         SearchFilters { color: Some(Color::Black), ..SearchFilters::default() },
///     ))
///     .await?;
///
/// for product in &response.results {
///     println!("{} {} ({})", product.name, product.display_price, product.source_site);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct SearchClient {
    auth: AuthClient,
    path: String,
    item_path: String,
    history: Option<HistoryClient>,
}

impl SearchClient {
    /// Creates a search client that reads the session through `auth`.
    #[must_use]
    pub fn new(config: &ClientConfig, auth: AuthClient) -> Self {
        Self {
            auth,
            path: config.endpoints().search.clone(),
            item_path: config.endpoints().item.clone(),
            history: None,
        }
    }

    /// Records successful searches of signed-in users in their history.
    ///
    /// Recording runs in the background and never affects the search result.
    #[must_use]
    pub fn with_history(mut self, history: HistoryClient) -> Self {
        self.history = Some(history);
        self
    }

    /// Runs a search.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] for blank text or out-of-range filters;
    ///   no request is sent
    /// - [`ClientError::Response`] with the server's message, or a generic
    ///   fallback when the body is unreadable
    /// - [`ClientError::Request`] for transport failures
    /// - [`ClientError::SessionExpired`] when a 401 survives one refresh
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, ClientError> {
        query.validate()?;

        let request = HttpRequest::builder(HttpMethod::Get, &self.path)
            .query(query.to_query_params())
            .build()?;

        let response = self.auth.optionally_authorized(request).await?;
        let parsed: SearchResponse =
            response
                .parse()
                .map_err(|e| ClientError::UnexpectedResponse {
                    reason: format!("Failed to parse search response: {e}"),
                })?;

        for problem in &parsed.errors {
            tracing::warn!(query = %query.text, %problem, "Search completed with a retailer error");
        }
        tracing::debug!(
            query = %query.text,
            results = parsed.results.len(),
            execution_time = ?parsed.execution_time,
            "Search completed"
        );

        if let Some(history) = &self.history {
            if self.auth.session().is_some() {
                history.spawn_record(query.clone(), parsed.results.len());
            }
        }

        Ok(parsed)
    }

    /// Fetches one stored product by its server id.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] for an empty or malformed id; no request
    ///   is sent
    /// - [`ClientError::Response`] (404 for an unknown id) or
    ///   [`ClientError::Request`]
    /// - [`ClientError::UnexpectedResponse`] for an unreadable body
    pub async fn item(&self, id: &str) -> Result<ProductResult, ClientError> {
        let id = id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ValidationError::field("id", "Invalid item id").into());
        }

        let path = format!("{}/{}", self.item_path.trim_end_matches('/'), id);
        let request = HttpRequest::builder(HttpMethod::Get, path).build()?;
        let response = self.auth.optionally_authorized(request).await?;

        response
            .parse()
            .map_err(|e| ClientError::UnexpectedResponse {
                reason: format!("Failed to parse item {id}: {e}"),
            })
    }
}
