//! The authentication client.
//!
//! [`AuthClient`] is the only writer of the [`SessionStore`]. Other clients
//! read the session through it and route authorized requests through
//! [`AuthClient::authorized`], which owns the single refresh-and-retry step.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::auth::validation::{validate_email, validate_new_password, validate_phone};
use crate::auth::{Profile, Session, SessionStore};
use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse};
use crate::config::{ClientConfig, Endpoints};
use crate::error::{ClientError, ValidationError};

/// Fields submitted to create an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    /// Display name.
    pub username: String,
    /// Account email.
    pub email: String,
    /// Plain-text password; sent once over the wire.
    pub password: String,
    /// Optional phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl RegisterRequest {
    /// Checks the fields locally, before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming every offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        if self.username.trim().is_empty() {
            problems.push(ValidationError::field("username", "Username is required"));
        }
        if let Err(e) = validate_email(&self.email) {
            problems.push(e);
        }
        if let Err(e) = validate_new_password("password", &self.password) {
            problems.push(e);
        }
        if let Some(phone) = &self.phone {
            if let Err(e) = validate_phone(phone) {
                problems.push(e);
            }
        }

        merge_problems(problems)
    }
}

/// Profile fields to change; `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_none() && self.email.is_none() && self.phone.is_none() {
            return Err(ValidationError::new("Nothing to update"));
        }
        let mut problems = Vec::new();
        if matches!(&self.username, Some(name) if name.trim().is_empty()) {
            problems.push(ValidationError::field("username", "Username cannot be empty"));
        }
        if let Some(email) = &self.email {
            if let Err(e) = validate_email(email) {
                problems.push(e);
            }
        }
        if let Some(phone) = &self.phone {
            if let Err(e) = validate_phone(phone) {
                problems.push(e);
            }
        }
        merge_problems(problems)
    }
}

fn merge_problems(problems: Vec<ValidationError>) -> Result<(), ValidationError> {
    let mut iter = problems.into_iter();
    let Some(mut merged) = iter.next() else {
        return Ok(());
    };
    for problem in iter {
        merged.message = format!("{}; {}", merged.message, problem.message);
        for (field, messages) in problem.fields {
            merged.fields.entry(field).or_default().extend(messages);
        }
    }
    Err(merged)
}

/// Body of a successful registration.
#[derive(Debug, Deserialize)]
struct RegisterResponse {
    #[serde(alias = "profile")]
    user: Option<Profile>,
}

/// Free-form per-user settings kept by the server.
pub type Preferences = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct PreferencesBody {
    #[serde(default)]
    preferences: Option<Preferences>,
}

/// Body of a successful token refresh.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(alias = "access", alias = "accessToken")]
    access_token: String,
}

/// Client for the login, registration, token and account endpoints.
///
/// Cloning is cheap; clones share the HTTP connection pool and the store.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use clothing_comparator::{ApiBaseUrl, ClientConfig};
/// use clothing_comparator::auth::{AuthClient, MemorySessionStore};
///
/// let config = ClientConfig::builder()
///     .base_url(ApiBaseUrl::new("http://localhost:8000/api").unwrap())
///     .build()
///     .unwrap();
///
/// let auth = AuthClient::new(&config, Arc::new(MemorySessionStore::new()));
/// let session = auth.login("asha@example.com", "Secret123").await?;
/// println!("Welcome back, {}", session.profile.username);
/// ```
#[derive(Clone, Debug)]
pub struct AuthClient {
    http: HttpClient,
    endpoints: Endpoints,
    store: Arc<dyn SessionStore>,
}

impl AuthClient {
    /// Creates a client that persists sessions in `store`.
    #[must_use]
    pub fn new(config: &ClientConfig, store: Arc<dyn SessionStore>) -> Self {
        Self::with_http(HttpClient::new(config), config, store)
    }

    /// Creates a client sharing an existing HTTP client.
    #[must_use]
    pub fn with_http(http: HttpClient, config: &ClientConfig, store: Arc<dyn SessionStore>) -> Self {
        Self {
            http,
            endpoints: config.endpoints().clone(),
            store,
        }
    }

    /// Returns a copy of the stored session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.store.current()
    }

    /// Exchanges credentials for a session and stores it.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] for a malformed email or empty password
    /// - [`ClientError::InvalidCredentials`] when the password is wrong (401)
    /// - [`ClientError::ShouldRegister`] when no account exists (404)
    /// - [`ClientError::Response`] / [`ClientError::Request`] otherwise
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::field("password", "Password is required").into());
        }

        let request = HttpRequest::builder(HttpMethod::Post, &self.endpoints.login)
            .body(json!({ "email": email.trim(), "password": password }))
            .build()?;

        let response = match self.http.request(request).await {
            Ok(response) => response,
            Err(HttpError::Response(e)) if e.should_register || e.code == 404 => {
                return Err(ClientError::ShouldRegister { message: e.message });
            }
            Err(HttpError::Response(e)) if e.code == 401 => {
                return Err(ClientError::InvalidCredentials { message: e.message });
            }
            Err(e) => return Err(e.into()),
        };

        let session: Session = response
            .parse()
            .map_err(|e| ClientError::UnexpectedResponse {
                reason: format!("Failed to parse login response: {e}"),
            })?;
        if session.access_token.is_empty() {
            return Err(ClientError::UnexpectedResponse {
                reason: "Login response carried no access token".to_string(),
            });
        }

        self.store.save(&session)?;
        tracing::debug!(user = %session.profile.email, "Signed in");
        Ok(session)
    }

    /// Creates an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] for local problems, and for server-side
    ///   rejections (400 / 409, e.g. a duplicate email) with the server's
    ///   per-field messages
    /// - [`ClientError::Response`] / [`ClientError::Request`] otherwise
    pub async fn register(&self, data: &RegisterRequest) -> Result<Profile, ClientError> {
        data.validate()?;

        let body = serde_json::to_value(data).map_err(|e| ClientError::UnexpectedResponse {
            reason: format!("Failed to encode registration: {e}"),
        })?;
        let request = HttpRequest::builder(HttpMethod::Post, &self.endpoints.register)
            .body(body)
            .build()?;

        let response = match self.http.request(request).await {
            Ok(response) => response,
            Err(HttpError::Response(e)) if e.code == 400 || e.code == 409 => {
                return Err(ValidationError {
                    message: e.message,
                    fields: e.field_errors,
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };

        let created = response
            .parse::<RegisterResponse>()
            .ok()
            .and_then(|r| r.user)
            .unwrap_or_else(|| Profile {
                username: data.username.clone(),
                email: data.email.clone(),
                phone: data.phone.clone(),
                ..Profile::default()
            });
        Ok(created)
    }

    /// Obtains a new access token using the stored refresh token.
    ///
    /// On success only the access token is replaced; the refresh token and
    /// profile are preserved. On any failure the session is cleared.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotAuthenticated`] when no session is stored
    /// - [`ClientError::SessionExpired`] when the refresh fails for any reason
    /// - [`ClientError::Storage`] when the refreshed session cannot be saved
    pub async fn refresh(&self) -> Result<Session, ClientError> {
        let mut session = self.session().ok_or(ClientError::NotAuthenticated)?;

        let request = HttpRequest::builder(HttpMethod::Post, &self.endpoints.refresh)
            .body(json!({ "refresh": session.refresh_token }))
            .build()?;

        let access_token = match self.http.request(request).await {
            Ok(response) => response
                .parse::<RefreshResponse>()
                .ok()
                .map(|r| r.access_token)
                .filter(|token| !token.is_empty()),
            Err(error) => {
                tracing::debug!(%error, "Token refresh rejected");
                None
            }
        };

        let Some(access_token) = access_token else {
            self.expire_session();
            return Err(ClientError::SessionExpired);
        };

        session.access_token = access_token;
        self.store.save(&session)?;
        tracing::debug!("Access token refreshed");
        Ok(session)
    }

    /// Signs out locally. Never touches the network and never fails.
    pub fn logout(&self) {
        self.expire_session();
        tracing::debug!("Signed out");
    }

    /// Clears the stored session after an unrecoverable authorization failure.
    pub fn expire_session(&self) {
        if let Err(error) = self.store.clear() {
            tracing::warn!(%error, "Failed to clear stored session");
        }
    }

    /// Fetches the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`], [`ClientError::SessionExpired`], or
    /// any transport / response failure.
    pub async fn profile(&self) -> Result<Profile, ClientError> {
        let request = HttpRequest::builder(HttpMethod::Get, &self.endpoints.profile).build()?;
        let response = self.authorized(request).await?;
        response.parse().map_err(|e| ClientError::UnexpectedResponse {
            reason: format!("Failed to parse profile: {e}"),
        })
    }

    /// Updates profile fields and mirrors the result into the stored session.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for bad input (including server-side 400s),
    /// [`ClientError::NotAuthenticated`], [`ClientError::SessionExpired`], or
    /// any transport / response failure.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ClientError> {
        update.validate()?;

        let body = serde_json::to_value(update).map_err(|e| ClientError::UnexpectedResponse {
            reason: format!("Failed to encode profile update: {e}"),
        })?;
        let request = HttpRequest::builder(HttpMethod::Put, &self.endpoints.profile)
            .body(body)
            .build()?;

        let response = self.authorized(request).await.map_err(validation_from_400)?;

        let mut session = self.session().ok_or(ClientError::NotAuthenticated)?;
        let profile = response
            .parse::<Profile>()
            .ok()
            .filter(|p| !p.email.is_empty() || !p.username.is_empty())
            .unwrap_or_else(|| {
                let mut merged = session.profile.clone();
                if let Some(username) = &update.username {
                    merged.username.clone_from(username);
                }
                if let Some(email) = &update.email {
                    merged.email.clone_from(email);
                }
                if update.phone.is_some() {
                    merged.phone.clone_from(&update.phone);
                }
                merged
            });

        session.profile = profile.clone();
        self.store.save(&session)?;
        Ok(profile)
    }

    /// Changes the signed-in user's password.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for a weak new password or a server-side
    /// rejection of the old one, [`ClientError::NotAuthenticated`],
    /// [`ClientError::SessionExpired`], or any transport / response failure.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        if old_password.is_empty() {
            return Err(
                ValidationError::field("old_password", "Current password is required").into(),
            );
        }
        validate_new_password("new_password", new_password)?;

        let request = HttpRequest::builder(HttpMethod::Post, &self.endpoints.change_password)
            .body(json!({ "old_password": old_password, "new_password": new_password }))
            .build()?;

        self.authorized(request).await.map_err(validation_from_400)?;
        Ok(())
    }

    /// Asks the server to email a password-reset link.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for a malformed email, or any transport /
    /// response failure (404 when the email is unknown).
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ClientError> {
        validate_email(email)?;
        let request = HttpRequest::builder(HttpMethod::Post, &self.endpoints.password_reset)
            .body(json!({ "email": email.trim() }))
            .build()?;
        self.http.request(request).await?;
        Ok(())
    }

    /// Sets a new password using the token from a reset link.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for an empty token, a weak password, or an
    /// expired/invalid token (400), or any transport / response failure.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ClientError> {
        let token = link_token(token, "Invalid reset token")?;
        validate_new_password("password", new_password)?;

        let path = format!(
            "{}/{}",
            self.endpoints.password_reset.trim_end_matches('/'),
            token
        );
        let request = HttpRequest::builder(HttpMethod::Post, path)
            .body(json!({ "password": new_password }))
            .build()?;

        self.http
            .request(request)
            .await
            .map_err(ClientError::from)
            .map_err(validation_from_400)?;
        Ok(())
    }

    /// Asks the server to email a verification link to the signed-in user.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`], [`ClientError::SessionExpired`], or
    /// any transport / response failure.
    pub async fn send_verification_email(&self) -> Result<(), ClientError> {
        let request = HttpRequest::builder(HttpMethod::Post, &self.endpoints.verify_email)
            .body(json!({}))
            .build()?;
        self.authorized(request).await?;
        Ok(())
    }

    /// Confirms an email address using the token from a verification link.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for a malformed token or an expired/unknown
    /// one (400), or any transport / response failure.
    pub async fn verify_email(&self, token: &str) -> Result<(), ClientError> {
        let token = link_token(token, "Invalid verification token")?;
        let path = format!(
            "{}/{}",
            self.endpoints.verify_email.trim_end_matches('/'),
            token
        );
        let request = HttpRequest::builder(HttpMethod::Post, path)
            .body(json!({}))
            .build()?;

        self.http
            .request(request)
            .await
            .map_err(ClientError::from)
            .map_err(validation_from_400)?;
        Ok(())
    }

    /// Fetches the signed-in user's stored preferences.
    ///
    /// A user who never saved any gets an empty map.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`], [`ClientError::SessionExpired`],
    /// [`ClientError::UnexpectedResponse`], or any transport / response failure.
    pub async fn preferences(&self) -> Result<Preferences, ClientError> {
        let request = HttpRequest::builder(HttpMethod::Get, &self.endpoints.preferences).build()?;
        let response = self.authorized(request).await?;
        let body: PreferencesBody =
            response
                .parse()
                .map_err(|e| ClientError::UnexpectedResponse {
                    reason: format!("Failed to parse preferences: {e}"),
                })?;
        Ok(body.preferences.unwrap_or_default())
    }

    /// Replaces the signed-in user's stored preferences.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`], [`ClientError::SessionExpired`], or
    /// any transport / response failure.
    pub async fn update_preferences(&self, preferences: &Preferences) -> Result<(), ClientError> {
        let request = HttpRequest::builder(HttpMethod::Put, &self.endpoints.preferences)
            .body(json!({ "preferences": preferences }))
            .build()?;
        self.authorized(request).await?;
        Ok(())
    }

    /// Sends a request that requires a session.
    ///
    /// A stored access token that is visibly expired (a JWT whose `exp` has
    /// passed) is refreshed before the request goes out; otherwise a 401
    /// triggers the refresh. Either way there is exactly one
    /// [`refresh`](Self::refresh) and one retry
    /// with the new token. If the refresh fails, or the retry is also
    /// rejected with 401, the session is cleared and
    /// [`ClientError::SessionExpired`] is returned.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`] when no session is stored, plus the
    /// failures described above.
    pub async fn authorized(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let session = self.session().ok_or(ClientError::NotAuthenticated)?;
        self.send_with_refresh(request, session).await
    }

    /// Sends a request, attaching the bearer token when a session exists.
    ///
    /// Without a session the request goes out anonymously and a 401 surfaces
    /// as [`ClientError::NotAuthenticated`].
    ///
    /// # Errors
    ///
    /// As [`authorized`](Self::authorized), except that a missing session is
    /// not an error up front.
    pub async fn optionally_authorized(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, ClientError> {
        match self.session() {
            Some(session) => self.send_with_refresh(request, session).await,
            None => match self.http.request(request).await.map_err(ClientError::from) {
                Err(e) if e.is_unauthorized() => Err(ClientError::NotAuthenticated),
                other => other,
            },
        }
    }

    async fn send_with_refresh(
        &self,
        request: HttpRequest,
        session: Session,
    ) -> Result<HttpResponse, ClientError> {
        if !session.is_active() {
            tracing::debug!(path = %request.path, "Access token expired, refreshing before sending");
            let refreshed = self.refresh().await?;
            return self.retry_with(&request, refreshed).await;
        }

        match self
            .http
            .request(request.with_bearer(session.access_token))
            .await
            .map_err(ClientError::from)
        {
            Err(e) if e.is_unauthorized() => {}
            other => return other,
        }

        tracing::debug!(path = %request.path, "Authorization rejected, refreshing token once");
        let refreshed = self.refresh().await?;
        self.retry_with(&request, refreshed).await
    }

    async fn retry_with(
        &self,
        request: &HttpRequest,
        refreshed: Session,
    ) -> Result<HttpResponse, ClientError> {
        match self
            .http
            .request(request.with_bearer(refreshed.access_token))
            .await
            .map_err(ClientError::from)
        {
            Err(e) if e.is_unauthorized() => {
                self.expire_session();
                Err(ClientError::SessionExpired)
            }
            other => other,
        }
    }
}

/// Accepts the alphanumeric tokens the server puts in emailed links.
fn link_token<'a>(token: &'a str, message: &str) -> Result<&'a str, ValidationError> {
    let token = token.trim();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::field("token", message));
    }
    Ok(token)
}

fn validation_from_400(error: ClientError) -> ClientError {
    match error {
        ClientError::Response(e) if e.code == 400 => ValidationError {
            message: e.message,
            fields: e.field_errors,
        }
        .into(),
        other => other,
    }
}
