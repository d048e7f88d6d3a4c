use futures_signals::signal::{Mutable, MutableSignalCloned, SignalExt, SignalStream};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// The credential identifying the logged-in user.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("failed to replace token file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Durable backing for a [`TokenStore`].
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<SessionToken>, TokenStoreError>;

    /// Persists `token`, or removes the persisted value when `None`.
    fn save(&self, token: Option<&SessionToken>) -> Result<(), TokenStoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenDocument {
    todo_token: Option<SessionToken>,
}

/// Keeps the token in a small JSON file. Writes go through a temporary file
/// in the same directory and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<SessionToken>, TokenStoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let document: TokenDocument = serde_json::from_str(&content)?;
        Ok(document.todo_token)
    }

    fn save(&self, token: Option<&SessionToken>) -> Result<(), TokenStoreError> {
        let Some(token) = token else {
            return match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let document = TokenDocument {
            todo_token: Some(token.clone()),
        };
        let mut file = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer(&mut file, &document)?;
        file.flush()?;
        file.persist(&self.path)?;
        Ok(())
    }
}

/// Non-durable storage, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    value: Mutex<Option<SessionToken>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<SessionToken>, TokenStoreError> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: Option<&SessionToken>) -> Result<(), TokenStoreError> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = token.cloned();
        Ok(())
    }
}

/// Holds the current session token as an observable value.
///
/// The in-memory value is updated before the storage is touched, so a read
/// that follows a completed `write` or `clear` always sees it, even when
/// persisting failed. Observers receive the latest value; intermediate
/// values may be skipped.
pub struct TokenStore {
    token: Mutable<Option<SessionToken>>,
    storage: Mutex<Box<dyn TokenStorage>>,
}

impl TokenStore {
    /// Loads the persisted token, if any.
    pub fn open(storage: impl TokenStorage + 'static) -> Result<Self, TokenStoreError> {
        let initial = storage.load()?;
        debug!(present = initial.is_some(), "token store opened");
        Ok(Self {
            token: Mutable::new(initial),
            storage: Mutex::new(Box::new(storage)),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            token: Mutable::new(None),
            storage: Mutex::new(Box::new(MemoryTokenStorage::new())),
        }
    }

    pub fn read(&self) -> Option<SessionToken> {
        self.token.get_cloned()
    }

    pub fn is_present(&self) -> bool {
        self.token.lock_ref().is_some()
    }

    pub fn write(&self, token: SessionToken) -> Result<(), TokenStoreError> {
        let storage = self.storage.lock().unwrap_or_else(PoisonError::into_inner);
        self.token.set(Some(token.clone()));
        info!("session token stored");
        storage.save(Some(&token)).inspect_err(|e| {
            warn!(error = %e, "failed to persist session token");
        })
    }

    pub fn clear(&self) -> Result<(), TokenStoreError> {
        let storage = self.storage.lock().unwrap_or_else(PoisonError::into_inner);
        self.token.set(None);
        info!("session token cleared");
        storage.save(None).inspect_err(|e| {
            warn!(error = %e, "failed to remove persisted session token");
        })
    }

    pub fn signal(&self) -> MutableSignalCloned<Option<SessionToken>> {
        self.token.signal_cloned()
    }

    /// Stream of token values, starting with the current one.
    pub fn observe(&self) -> SignalStream<MutableSignalCloned<Option<SessionToken>>> {
        self.token.signal_cloned().to_stream()
    }
}

impl Debug for TokenStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("present", &self.is_present())
            .finish()
    }
}
