//! Product search: queries, filters, results and client-side sorting.
//!
//! - [`SearchQuery`] / [`SearchFilters`]: what to look for; only non-default
//!   filters reach the server
//! - [`SearchClient`]: issues the request, normalizes failures and performs
//!   the single refresh-and-retry after a 401
//! - [`ProductResult`] / [`SearchResponse`]: what comes back
//! - [`sort_results`]: view-requested reordering

mod client;
mod filters;
mod product;
mod sort;

pub use client::SearchClient;
pub use filters::{Color, Gender, SearchFilters, SearchQuery, Site, Size, MAX_RATING};
pub use product::{format_price, parse_price, parse_rating, ProductResult, SearchResponse};
pub use sort::{sort_results, SortOrder};
