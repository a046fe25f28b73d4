//! Persistent storage for the current [`Session`].
//!
//! A store holds a single slot. Writes are last-write-wins; the slot's own
//! lock (or the filesystem rename) is the only synchronization.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::auth::Session;
use crate::config::StorageKey;

/// Errors raised while persisting the session.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the session file failed.
    #[error("Session storage I/O error at {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The session could not be encoded.
    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),

    /// No per-user data directory exists on this platform.
    #[error("Cannot determine a local data directory for session storage")]
    NoDataDir,
}

/// A single-slot store for the current session.
///
/// Contents are an opaque pass-through: implementations do not inspect or
/// validate tokens.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Persists `session`, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the session cannot be written.
    fn save(&self, session: &Session) -> Result<(), StorageError>;

    /// Returns the stored session, if any.
    fn current(&self) -> Option<Session>;

    /// Removes the stored session. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<(), StorageError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn current(&self) -> Option<Session> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Session store backed by one JSON file named after the storage key.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// slot, so a reader never observes a half-written session. Every write uses
/// its own temporary name, and on Unix the file is readable by its owner
/// only.
///
/// # Example
///
/// ```rust,no_run
/// use clothing_comparator::auth::{FileSessionStore, SessionStore};
/// use clothing_comparator::StorageKey;
///
/// let store = FileSessionStore::in_default_dir(&StorageKey::default()).unwrap();
/// if let Some(session) = store.current() {
///     println!("Signed in as {}", session.profile.email);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Directory name used under the platform data directory.
    pub const APP_DIR: &'static str = "clothing-comparator";

    /// Creates a store whose slot lives in `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, key: &StorageKey) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key.as_ref())),
        }
    }

    /// Creates a store in the platform's local data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoDataDir`] if the platform has no such directory.
    pub fn in_default_dir(key: &StorageKey) -> Result<Self, StorageError> {
        let dir = dirs::data_local_dir().ok_or(StorageError::NoDataDir)?;
        Ok(Self::new(dir.join(Self::APP_DIR), key))
    }

    /// Returns the path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A sibling path no other write (in this or another process) uses.
    fn tmp_path(&self) -> PathBuf {
        static WRITES: AtomicU64 = AtomicU64::new(0);

        let name = self
            .path
            .file_name()
            .map_or_else(|| "session".into(), |name| name.to_string_lossy());
        self.path.with_file_name(format!(
            ".{name}.{}.{}.tmp",
            std::process::id(),
            WRITES.fetch_add(1, Ordering::Relaxed)
        ))
    }

    fn create_private(path: &Path) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options.open(path)
    }

    fn io_error(path: &Path, source: io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| Self::io_error(dir, e))?;
        }

        let contents = serde_json::to_vec_pretty(session)?;
        let tmp = self.tmp_path();
        let written = Self::create_private(&tmp)
            .and_then(|mut file| {
                file.write_all(&contents)?;
                file.sync_all()
            })
            .map_err(|e| Self::io_error(&tmp, e))
            .and_then(|()| {
                std::fs::rename(&tmp, &self.path).map_err(|e| Self::io_error(&self.path, e))
            });

        if written.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        written
    }

    fn current(&self) -> Option<Session> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "Failed to read stored session");
                return None;
            }
        };

        match serde_json::from_slice(&contents) {
            Ok(session) => Some(session),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "Ignoring unreadable stored session");
                None
            }
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Profile;

    fn sample_session(token: &str) -> Session {
        Session::new(
            token.to_string(),
            "refresh".to_string(),
            Profile {
                id: Some(9),
                username: "meera".to_string(),
                email: "meera@example.com".to_string(),
                phone: Some("9876543210".to_string()),
            },
        )
    }

    #[test]
    fn test_memory_store_save_current_clear() {
        let store = MemorySessionStore::new();
        assert!(store.current().is_none());

        store.save(&sample_session("a")).unwrap();
        assert_eq!(store.current().unwrap().access_token, "a");

        store.save(&sample_session("b")).unwrap();
        assert_eq!(store.current().unwrap().access_token, "b");

        store.clear().unwrap();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let key = StorageKey::new("user").unwrap();

        FileSessionStore::new(dir.path(), &key)
            .save(&sample_session("persisted"))
            .unwrap();

        let reopened = FileSessionStore::new(dir.path(), &key);
        assert_eq!(reopened.path(), dir.path().join("user.json"));
        assert_eq!(reopened.current(), Some(sample_session("persisted")));
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), &StorageKey::default());

        store.clear().unwrap();
        store.save(&sample_session("a")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("deeper");
        let store = FileSessionStore::new(&nested, &StorageKey::default());

        store.save(&sample_session("a")).unwrap();
        assert!(store.current().is_some());
    }

    #[test]
    fn test_file_store_concurrent_saves_leave_one_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(FileSessionStore::new(dir.path(), &StorageKey::default()));

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        store.save(&sample_session(&format!("token-{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let current = store.current().unwrap();
        assert!(current.access_token.starts_with("token-"));

        let slot = store.path().file_name().unwrap().to_owned();
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| *name != slot)
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), &StorageKey::default());
        store.save(&sample_session("a")).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_corrupt_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), &StorageKey::default());
        std::fs::write(store.path(), b"{not json").unwrap();

        assert!(store.current().is_none());
    }
}
