use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Bearer token issued by the backend at sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

impl StoredCredential {
    #[must_use]
    pub fn new(token: impl Into<String>, saved_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            saved_at,
        }
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("token", &"<redacted>")
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

/// Holds at most one credential: the one for the current session.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Fetch the stored credential, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn load_credential(&self) -> Result<Option<StoredCredential>, StorageError>;

    /// Replace the stored credential.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the credential cannot be written.
    async fn save_credential(&self, credential: &StoredCredential) -> Result<(), StorageError>;

    /// Forget the stored credential. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    async fn clear_credential(&self) -> Result<(), StorageError>;

    /// Forget the stored credential only if it still holds `token`.
    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    async fn discard_credential(&self, token: &str) -> Result<bool, StorageError>;
}

/// In-memory credential store for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    credential: Arc<Mutex<Option<StoredCredential>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a credential already present.
    #[must_use]
    pub fn with_credential(credential: StoredCredential) -> Self {
        Self {
            credential: Arc::new(Mutex::new(Some(credential))),
        }
    }
}

#[async_trait]
impl CredentialRepository for InMemoryRepository {
    async fn load_credential(&self) -> Result<Option<StoredCredential>, StorageError> {
        let guard = self
            .credential
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_credential(&self, credential: &StoredCredential) -> Result<(), StorageError> {
        let mut guard = self
            .credential
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(credential.clone());
        Ok(())
    }

    async fn clear_credential(&self) -> Result<(), StorageError> {
        let mut guard = self
            .credential
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }

    async fn discard_credential(&self, token: &str) -> Result<bool, StorageError> {
        let mut guard = self
            .credential
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.as_ref().is_some_and(|c| c.token == token) {
            *guard = None;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Repositories behind trait objects so the backend can be swapped.
#[derive(Clone)]
pub struct Storage {
    pub credentials: Arc<dyn CredentialRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let credentials: Arc<dyn CredentialRepository> = Arc::new(InMemoryRepository::new());
        Self { credentials }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::time::fixed_now;

    #[tokio::test]
    async fn save_load_clear_cycle() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_credential().await.unwrap().is_none());

        let credential = StoredCredential::new("tok-1", fixed_now());
        repo.save_credential(&credential).await.unwrap();
        assert_eq!(repo.load_credential().await.unwrap(), Some(credential));

        repo.save_credential(&StoredCredential::new("tok-2", fixed_now()))
            .await
            .unwrap();
        let loaded = repo.load_credential().await.unwrap().unwrap();
        assert_eq!(loaded.token, "tok-2");

        repo.clear_credential().await.unwrap();
        repo.clear_credential().await.unwrap();
        assert!(repo.load_credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn discard_only_removes_matching_token() {
        let repo = InMemoryRepository::with_credential(StoredCredential::new("new", fixed_now()));
        assert!(!repo.discard_credential("old").await.unwrap());
        assert_eq!(repo.load_credential().await.unwrap().unwrap().token, "new");
        assert!(repo.discard_credential("new").await.unwrap());
        assert!(repo.load_credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let repo = InMemoryRepository::with_credential(StoredCredential::new("tok", fixed_now()));
        let storage = Storage {
            credentials: Arc::new(repo.clone()),
        };
        storage.credentials.clear_credential().await.unwrap();
        assert!(repo.load_credential().await.unwrap().is_none());
    }

    #[test]
    fn debug_hides_token() {
        let credential = StoredCredential::new("secret-token", fixed_now());
        assert!(!format!("{credential:?}").contains("secret-token"));
    }
}
