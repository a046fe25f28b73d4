//! Session types for API authentication.
//!
//! This module provides the [`Session`] credential bundle and the [`Profile`]
//! of the signed-in user.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The profile of the signed-in user.
///
/// The server has used both `phone` and `phone_number` for the same field;
/// both are accepted, `phone` is written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Server-side user id.
    pub id: Option<u64>,
    /// Display name.
    pub username: String,
    /// Account email.
    pub email: String,
    /// Contact phone number.
    #[serde(alias = "phone_number")]
    pub phone: Option<String>,
}

/// Represents an authenticated session for API calls.
///
/// Sessions are created by a successful login, have their access token
/// replaced by a refresh, and are deleted on logout. Token contents are
/// opaque to the session store; only [`Session::access_token_expires_at`]
/// looks inside them.
///
/// The login response shapes seen in the wild (`access`/`refresh`/`user` and
/// `accessToken`/`refreshToken`/`profile`) both deserialize into a `Session`.
///
/// # Example
///
/// ```rust
/// use clothing_comparator::Session;
///
/// let session: Session = serde_json::from_str(
///     r#"{"access": "a-token", "refresh": "r-token", "user": {"id": 7, "username": "asha", "email": "asha@example.com"}}"#,
/// ).unwrap();
///
/// assert_eq!(session.access_token, "a-token");
/// assert_eq!(session.profile.id, Some(7));
/// assert!(session.is_active());
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authorized requests.
    #[serde(alias = "access", alias = "accessToken")]
    pub access_token: String,

    /// Token used to obtain a new access token.
    #[serde(alias = "refresh", alias = "refreshToken")]
    pub refresh_token: String,

    /// The signed-in user.
    #[serde(default, alias = "user")]
    pub profile: Profile,
}

/// Claims read from an access token.
#[derive(Debug, Deserialize)]
struct AccessClaims {
    exp: Option<i64>,
}

impl Session {
    /// Creates a new session.
    #[must_use]
    pub const fn new(access_token: String, refresh_token: String, profile: Profile) -> Self {
        Self {
            access_token,
            refresh_token,
            profile,
        }
    }

    /// Returns when the access token expires, if it is a JWT with an `exp` claim.
    ///
    /// The signature is not verified; the client only needs the expiry to
    /// decide whether the token is still worth sending.
    #[must_use]
    pub fn access_token_expires_at(&self) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<AccessClaims>(
            &self.access_token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )
        .ok()?;

        DateTime::from_timestamp(data.claims.exp?, 0)
    }

    /// Returns `true` if the access token has a known expiry in the past.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.access_token_expires_at()
            .is_some_and(|expires| Utc::now() >= expires)
    }

    /// Returns `true` if this session is active (has an access token that is not expired).
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.access_token.is_empty() && !self.expired()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"*****")
            .field("refresh_token", &"*****")
            .field("profile", &self.profile)
            .finish()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};
