//! The history client.

use serde_json::json;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::auth::AuthClient;
use crate::clients::{HttpMethod, HttpRequest};
use crate::config::{ClientConfig, Endpoints};
use crate::error::ClientError;
use crate::history::entry::HistoryBody;
use crate::history::HistoryEntry;
use crate::search::SearchQuery;

/// Client for the signed-in user's search history.
///
/// # Example
///
/// ```rust,ignore
/// let history = HistoryClient::new(&config, auth.clone());
/// for entry in history.list().await? {
///     println!("{}  {} ({} results)", entry.timestamp, entry.query, entry.result_count);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct HistoryClient {
    auth: AuthClient,
    endpoints: Endpoints,
}

impl HistoryClient {
    /// Creates a history client that reads the session through `auth`.
    #[must_use]
    pub fn new(config: &ClientConfig, auth: AuthClient) -> Self {
        Self {
            auth,
            endpoints: config.endpoints().clone(),
        }
    }

    /// Saves a completed search to the user's history.
    ///
    /// Does nothing when no session is stored.
    ///
    /// # Errors
    ///
    /// [`ClientError::SessionExpired`] or any transport / response failure.
    pub async fn record(&self, query: &SearchQuery, result_count: usize) -> Result<(), ClientError> {
        if self.auth.session().is_none() {
            return Ok(());
        }

        let request = HttpRequest::builder(HttpMethod::Post, &self.endpoints.history_save)
            .body(json!({
                "query": query.text.trim(),
                "filters": query.filters,
                "results_count": result_count,
            }))
            .build()?;

        self.auth.authorized(request).await?;
        tracing::debug!(query = %query.text, "Search recorded in history");
        Ok(())
    }

    /// Records a search on a detached task that only logs failures.
    ///
    /// Returns `None` when called outside a Tokio runtime, in which case
    /// nothing is recorded.
    pub fn spawn_record(&self, query: SearchQuery, result_count: usize) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(query = %query.text, "No async runtime, search not recorded");
            return None;
        };

        let client = self.clone();
        Some(runtime.spawn(async move {
            if let Err(error) = client.record(&query, result_count).await {
                tracing::warn!(query = %query.text, %error, "Failed to record search history");
            }
        }))
    }

    /// Lists the user's past searches, newest first.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`] without a session,
    /// [`ClientError::SessionExpired`], [`ClientError::UnexpectedResponse`]
    /// for an unreadable body, or any transport / response failure.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let request = HttpRequest::builder(HttpMethod::Get, &self.endpoints.history).build()?;
        let response = self.auth.authorized(request).await?;

        let body: HistoryBody = response
            .parse()
            .map_err(|e| ClientError::UnexpectedResponse {
                reason: format!("Failed to parse search history: {e}"),
            })?;
        Ok(body.into_newest_first())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::MemorySessionStore;
    use crate::config::ApiBaseUrl;

    fn client() -> HistoryClient {
        let config = ClientConfig::builder()
            .base_url(ApiBaseUrl::new("http://127.0.0.1:9").unwrap())
            .build()
            .unwrap();
        let auth = AuthClient::new(&config, Arc::new(MemorySessionStore::new()));
        HistoryClient::new(&config, auth)
    }

    #[test]
    fn test_record_without_session_is_a_no_op() {
        let result = tokio_test::block_on(client().record(&SearchQuery::text("kurta"), 4));
        assert!(result.is_ok());
    }

    #[test]
    fn test_list_without_session_is_not_authenticated() {
        let result = tokio_test::block_on(client().list());
        assert!(matches!(result, Err(ClientError::NotAuthenticated)));
    }

    #[test]
    fn test_spawn_record_outside_runtime_returns_none() {
        assert!(client()
            .spawn_record(SearchQuery::text("kurta"), 1)
            .is_none());
    }
}
