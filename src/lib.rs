//! # Clothing Comparator Client
//!
//! An async client for the clothing price comparison API: account
//! management, product search across retailers, and per-user search history.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Validated newtypes for the API base URL and the session storage key
//! - Login, registration, token refresh and account management via [`AuthClient`]
//! - Session persistence behind the [`SessionStore`](auth::SessionStore) trait
//! - Product search with optional filters via [`SearchClient`]
//! - Client-side sorting of results via [`search::sort_results`]
//! - Search history via [`HistoryClient`]
//! - View-level coordination (single-flight forms, last-query-wins results)
//!   via [`AppContext`]
//!
//! ## Quick Start
//!
//! ```rust
//! use clothing_comparator::{ApiBaseUrl, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .base_url(ApiBaseUrl::new("http://localhost:8000/api").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.endpoints().login, "auth/login");
//! ```
//!
//! ## Signing In and Searching
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use clothing_comparator::{AppContext, ClientConfig, ApiBaseUrl};
//! use clothing_comparator::auth::MemorySessionStore;
//! use clothing_comparator::search::{SearchFilters, SearchQuery, Site};
//!
//! let config = ClientConfig::builder()
//!     .base_url(ApiBaseUrl::new("http://localhost:8000/api")?)
//!     .build()?;
//! let app = AppContext::new(config, Arc::new(MemorySessionStore::new()));
//!
//! app.submit_login("asha@example.com", "Secret123").await?;
//!
//! let query = SearchQuery::new(
//!     "cotton kurta",
//!     SearchFilters { sites: vec![Site::FabIndia], ..SearchFilters::default() },
//! );
//! let response = app.search().search(&query).await?;
//! ```
//!
//! ## Error Handling
//!
//! Every client operation returns [`ClientError`]. Local validation failures
//! never reach the network; a 401 on an authorized call triggers exactly one
//! token refresh and one retry before [`ClientError::SessionExpired`] is
//! returned and the stored session is cleared.
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration and clients are instance-based and
//!   passed explicitly
//! - **Fail-fast validation**: Newtypes validate on construction; inputs are
//!   validated before any request
//! - **Single writer**: Only [`AuthClient`] writes the session store
//! - **Thread-safe**: All clients are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio async runtime

pub mod app;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod history;
pub mod search;

// Re-export public types at crate root for convenience
pub use app::AppContext;
pub use auth::{AuthClient, Profile, Session};
pub use config::{ApiBaseUrl, ClientConfig, ClientConfigBuilder, Endpoints, StorageKey};
pub use error::{ClientError, ConfigError, ValidationError};
pub use history::{HistoryClient, HistoryEntry};
pub use search::{ProductResult, SearchClient, SearchFilters, SearchQuery, SearchResponse};

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError,
};
