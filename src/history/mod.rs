//! Per-user search history.
//!
//! Searches by signed-in users are recorded in the background by
//! [`SearchClient`](crate::search::SearchClient) when a [`HistoryClient`] is
//! attached; [`HistoryClient::list`] reads them back newest first.

mod client;
mod entry;

pub use client::HistoryClient;
pub use entry::HistoryEntry;
