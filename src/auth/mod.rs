//! Authentication types for the clothing comparator SDK.
//!
//! # Overview
//!
//! - [`Session`]: The stored credential bundle (tokens + [`Profile`])
//! - [`SessionStore`]: The single persisted slot holding the current session,
//!   with [`MemorySessionStore`] and [`FileSessionStore`] implementations
//! - [`AuthClient`]: Login, registration, token refresh, logout and account
//!   management; the only writer of the store
//!
//! # Example
//!
//! ```rust
//! use clothing_comparator::auth::{MemorySessionStore, Profile, Session, SessionStore};
//!
//! let store = MemorySessionStore::new();
//! store
//!     .save(&Session::new("access".into(), "refresh".into(), Profile::default()))
//!     .unwrap();
//! assert!(store.current().is_some());
//!
//! store.clear().unwrap();
//! assert!(store.current().is_none());
//! ```

mod client;
pub mod session;
mod store;
pub mod validation;

pub use client::{AuthClient, Preferences, ProfileUpdate, RegisterRequest};
pub use session::{Profile, Session};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StorageError};
