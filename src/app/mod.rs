//! Application context shared by the views.
//!
//! [`AppContext`] owns one instance of each client, all sharing a single
//! HTTP connection pool and session store, plus the view-level state that
//! keeps interactions consistent:
//!
//! - [`SubmitGuard`]: one outstanding login / registration / password change
//!   at a time
//! - [`LatestResults`]: only the most recently submitted search is shown

mod guard;
mod latest;

use std::sync::Arc;

pub use guard::{SubmitGuard, SubmitPermit};
pub use latest::{LatestResults, ResultsSnapshot, SearchTicket};

use crate::auth::{
    AuthClient, FileSessionStore, Profile, RegisterRequest, Session, SessionStore, StorageError,
};
use crate::clients::HttpClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::history::HistoryClient;
use crate::search::{SearchClient, SearchQuery};

/// Result of [`AppContext::submit_search`].
#[derive(Debug)]
pub enum SearchOutcome {
    /// The search completed and is now shown.
    Applied(ResultsSnapshot),
    /// A newer search was submitted meanwhile; this outcome was discarded.
    Superseded,
    /// The search failed and the failure is now shown.
    Failed(ClientError),
}

/// Explicit replacement for page-global state: configuration, clients and
/// view state, created once and passed to every handler.
///
/// # Example
///
/// ```rust,ignore
/// use clothing_comparator::{ApiBaseUrl, AppContext, ClientConfig};
/// use clothing_comparator::app::SearchOutcome;
/// use clothing_comparator::search::SearchQuery;
///
/// let config = ClientConfig::builder()
///     .base_url(ApiBaseUrl::new("http://localhost:8000/api")?)
///     .build()?;
/// let app = AppContext::with_file_store(config)?;
///
/// match app.submit_search(SearchQuery::text("cotton kurta")).await {
///     SearchOutcome::Applied(snapshot) => println!("{} results", snapshot.results.len()),
///     SearchOutcome::Superseded => {}
///     SearchOutcome::Failed(error) => eprintln!("{}", error.user_message()),
/// }
/// ```
#[derive(Debug)]
pub struct AppContext {
    config: ClientConfig,
    auth: AuthClient,
    search: SearchClient,
    history: HistoryClient,
    results: Arc<LatestResults>,
    login_guard: SubmitGuard,
    register_guard: SubmitGuard,
    password_guard: SubmitGuard,
}

impl AppContext {
    /// Builds every client around the given session store.
    #[must_use]
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Self {
        let http = HttpClient::new(&config);
        let auth = AuthClient::with_http(http, &config, store);
        let history = HistoryClient::new(&config, auth.clone());
        let search = SearchClient::new(&config, auth.clone()).with_history(history.clone());

        Self {
            config,
            auth,
            search,
            history,
            results: Arc::new(LatestResults::new()),
            login_guard: SubmitGuard::new(),
            register_guard: SubmitGuard::new(),
            password_guard: SubmitGuard::new(),
        }
    }

    /// Builds the context with the session persisted under the configured
    /// storage key in the user's local data directory.
    ///
    /// # Errors
    ///
    /// [`StorageError::NoDataDir`] when the platform has no such directory.
    pub fn with_file_store(config: ClientConfig) -> Result<Self, StorageError> {
        let store = FileSessionStore::in_default_dir(config.storage_key())?;
        Ok(Self::new(config, Arc::new(store)))
    }

    /// The configuration the clients were built from.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The authentication client.
    #[must_use]
    pub const fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// The search client, with history recording attached.
    #[must_use]
    pub const fn search(&self) -> &SearchClient {
        &self.search
    }

    /// The history client.
    #[must_use]
    pub const fn history(&self) -> &HistoryClient {
        &self.history
    }

    /// The results currently shown.
    #[must_use]
    pub fn results(&self) -> Arc<LatestResults> {
        Arc::clone(&self.results)
    }

    /// The signed-in user's session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.auth.session()
    }

    /// Runs a search and shows its outcome unless a newer search was
    /// submitted while it was in flight.
    ///
    /// Local validation failures are returned as [`SearchOutcome::Failed`]
    /// without touching the shown results or issuing a ticket.
    pub async fn submit_search(&self, query: SearchQuery) -> SearchOutcome {
        if let Err(error) = query.validate() {
            return SearchOutcome::Failed(error.into());
        }

        let ticket = self.results.issue(&query);
        match self.search.search(&query).await {
            Ok(response) => {
                if self.results.commit(&ticket, response) {
                    SearchOutcome::Applied(self.results.snapshot())
                } else {
                    SearchOutcome::Superseded
                }
            }
            Err(error) => {
                if self.results.fail(&ticket, error.user_message()) {
                    SearchOutcome::Failed(error)
                } else {
                    SearchOutcome::Superseded
                }
            }
        }
    }

    /// Signs in, rejecting a second submission while one is in flight.
    ///
    /// # Errors
    ///
    /// [`ClientError::InProgress`] while another login is outstanding, or
    /// any error of [`AuthClient::login`].
    pub async fn submit_login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let _permit = self.login_guard.try_begin().ok_or(ClientError::InProgress)?;
        self.auth.login(email, password).await
    }

    /// Creates an account, rejecting a second submission while one is in
    /// flight.
    ///
    /// # Errors
    ///
    /// [`ClientError::InProgress`] while another registration is outstanding,
    /// or any error of [`AuthClient::register`].
    pub async fn submit_register(&self, data: &RegisterRequest) -> Result<Profile, ClientError> {
        let _permit = self
            .register_guard
            .try_begin()
            .ok_or(ClientError::InProgress)?;
        self.auth.register(data).await
    }

    /// Changes the password, rejecting a second submission while one is in
    /// flight.
    ///
    /// # Errors
    ///
    /// [`ClientError::InProgress`] while another change is outstanding, or
    /// any error of [`AuthClient::change_password`].
    pub async fn submit_change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let _permit = self
            .password_guard
            .try_begin()
            .ok_or(ClientError::InProgress)?;
        self.auth.change_password(old_password, new_password).await
    }

    /// Signs out and clears the shown results.
    pub fn logout(&self) {
        self.auth.logout();
        self.results.clear();
        tracing::debug!("View state reset after sign-out");
    }
}

// Verify AppContext can be shared across tasks
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppContext>();
};
