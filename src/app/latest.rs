//! Last-submitted-query-wins bookkeeping for the results view.

use std::sync::{Mutex, MutexGuard};

use crate::search::{sort_results, ProductResult, SearchQuery, SearchResponse, SortOrder};

/// Identifies one search submission.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchTicket {
    seq: u64,
    query: SearchQuery,
}

impl SearchTicket {
    /// Position of this submission; later submissions have larger values.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// The query that was submitted.
    #[must_use]
    pub const fn query(&self) -> &SearchQuery {
        &self.query
    }
}

/// What the results view currently shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsSnapshot {
    /// Query whose outcome is shown, if any search completed.
    pub query: Option<SearchQuery>,
    /// Products, in server order or the requested sort order.
    pub results: Vec<ProductResult>,
    /// Per-retailer problems reported alongside the results.
    pub warnings: Vec<String>,
    /// Message of the failed search, replacing any results.
    pub error: Option<String>,
    /// Sort order applied to `results`.
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Default)]
struct State {
    issued: u64,
    snapshot: ResultsSnapshot,
}

/// Holds the results of the most recently submitted search.
///
/// Every submission takes a [`SearchTicket`]; a response is applied only if
/// its ticket is still the latest one issued, so a slow response to an older
/// query never overwrites a newer one.
///
/// # Example
///
/// ```rust
/// use clothing_comparator::app::LatestResults;
/// use clothing_comparator::search::{SearchQuery, SearchResponse};
///
/// let latest = LatestResults::new();
/// let first = latest.issue(&SearchQuery::text("shirt"));
/// let second = latest.issue(&SearchQuery::text("kurta"));
///
/// assert!(latest.commit(&second, SearchResponse::default()));
/// assert!(!latest.commit(&first, SearchResponse::default()));
/// assert_eq!(latest.snapshot().query.unwrap().text, "kurta");
/// ```
#[derive(Debug, Default)]
pub struct LatestResults {
    state: Mutex<State>,
}

impl LatestResults {
    /// Creates an empty results holder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Registers a new submission, superseding all earlier ones.
    pub fn issue(&self, query: &SearchQuery) -> SearchTicket {
        let mut state = self.lock();
        state.issued += 1;
        SearchTicket {
            seq: state.issued,
            query: query.clone(),
        }
    }

    /// Returns `true` if no later submission has been issued.
    #[must_use]
    pub fn is_latest(&self, ticket: &SearchTicket) -> bool {
        self.lock().issued == ticket.seq
    }

    /// Applies a successful response if `ticket` is still the latest.
    ///
    /// The current sort order, if any, is applied to the new results.
    /// Returns `false` and discards the response otherwise.
    pub fn commit(&self, ticket: &SearchTicket, response: SearchResponse) -> bool {
        let mut state = self.lock();
        if state.issued != ticket.seq {
            tracing::debug!(
                query = %ticket.query.text,
                seq = ticket.seq,
                latest = state.issued,
                "Discarding superseded search response"
            );
            return false;
        }

        let mut results = response.results;
        if let Some(order) = state.snapshot.sort {
            sort_results(&mut results, order);
        }
        state.snapshot.query = Some(ticket.query.clone());
        state.snapshot.results = results;
        state.snapshot.warnings = response.errors;
        state.snapshot.error = None;
        true
    }

    /// Records a failed search if `ticket` is still the latest.
    ///
    /// Earlier results are cleared so a stale list is never shown under a
    /// newer query.
    pub fn fail(&self, ticket: &SearchTicket, message: impl Into<String>) -> bool {
        let mut state = self.lock();
        if state.issued != ticket.seq {
            return false;
        }
        state.snapshot.query = Some(ticket.query.clone());
        state.snapshot.results.clear();
        state.snapshot.warnings.clear();
        state.snapshot.error = Some(message.into());
        true
    }

    /// Empties the view and discards every search still in flight.
    ///
    /// The sort order is kept.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.issued += 1;
        let sort = state.snapshot.sort;
        state.snapshot = ResultsSnapshot {
            sort,
            ..ResultsSnapshot::default()
        };
    }

    /// Reorders the shown results and keeps the order for later commits.
    pub fn sort(&self, order: SortOrder) {
        let mut state = self.lock();
        state.snapshot.sort = Some(order);
        sort_results(&mut state.snapshot.results, order);
    }

    /// Returns a copy of what the view should show.
    #[must_use]
    pub fn snapshot(&self) -> ResultsSnapshot {
        self.lock().snapshot.clone()
    }

    /// Returns a copy of the shown products.
    #[must_use]
    pub fn results(&self) -> Vec<ProductResult> {
        self.lock().snapshot.results.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(prices: &[u32]) -> SearchResponse {
        let results: Vec<_> = prices
            .iter()
            .map(|p| json!({"name": format!("item-{p}"), "price": p}))
            .collect();
        serde_json::from_value(json!({ "results": results })).unwrap()
    }

    #[test]
    fn test_tickets_increase() {
        let latest = LatestResults::new();
        let a = latest.issue(&SearchQuery::text("a"));
        let b = latest.issue(&SearchQuery::text("b"));
        assert!(b.seq() > a.seq());
        assert!(!latest.is_latest(&a));
        assert!(latest.is_latest(&b));
    }

    #[test]
    fn test_stale_response_is_discarded_even_if_it_arrives_last() {
        let latest = LatestResults::new();
        let a = latest.issue(&SearchQuery::text("a"));
        let b = latest.issue(&SearchQuery::text("b"));

        assert!(latest.commit(&b, response(&[1])));
        assert!(!latest.commit(&a, response(&[2, 3])));

        let snapshot = latest.snapshot();
        assert_eq!(snapshot.query.unwrap().text, "b");
        assert_eq!(snapshot.results.len(), 1);
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let latest = LatestResults::new();
        let a = latest.issue(&SearchQuery::text("a"));
        let b = latest.issue(&SearchQuery::text("b"));
        assert!(latest.commit(&b, response(&[1])));
        assert!(!latest.fail(&a, "boom"));
        assert!(latest.snapshot().error.is_none());
    }

    #[test]
    fn test_failure_clears_previous_results() {
        let latest = LatestResults::new();
        let a = latest.issue(&SearchQuery::text("a"));
        latest.commit(&a, response(&[1, 2]));

        let b = latest.issue(&SearchQuery::text("b"));
        assert!(latest.fail(&b, "Scraper unavailable"));

        let snapshot = latest.snapshot();
        assert!(snapshot.results.is_empty());
        assert_eq!(snapshot.error.as_deref(), Some("Scraper unavailable"));
    }

    #[test]
    fn test_clear_supersedes_in_flight_searches() {
        let latest = LatestResults::new();
        latest.sort(SortOrder::RatingDescending);
        let ticket = latest.issue(&SearchQuery::text("a"));

        latest.clear();
        assert!(!latest.commit(&ticket, response(&[1])));

        let snapshot = latest.snapshot();
        assert!(snapshot.query.is_none());
        assert_eq!(snapshot.sort, Some(SortOrder::RatingDescending));
    }

    #[test]
    fn test_sort_order_survives_new_results() {
        let latest = LatestResults::new();
        latest.sort(SortOrder::PriceDescending);

        let ticket = latest.issue(&SearchQuery::text("shirt"));
        latest.commit(&ticket, response(&[300, 900, 100]));

        let prices: Vec<_> = latest.results().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![Some(900.0), Some(300.0), Some(100.0)]);

        latest.sort(SortOrder::PriceAscending);
        let prices: Vec<_> = latest.results().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![Some(100.0), Some(300.0), Some(900.0)]);
    }
}
