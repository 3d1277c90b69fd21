//! Where the client keeps its session between runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::session::Session;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session data: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistence for a single session.
///
/// Only [`AuthContext`](crate::AuthContext) reads or writes it.
pub trait SessionStorage: Send {
    /// The stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored data cannot be read.
    fn load(&self) -> Result<Option<Session>, StorageError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be written.
    fn save(&mut self, session: &Session) -> Result<(), StorageError>;

    /// Remove the stored session. Clearing empty storage succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored data cannot be removed.
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// Storage that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    session: Option<Session>,
}

impl MemoryStorage {
    #[must_use]
    pub const fn new() -> Self {
        Self { session: None }
    }

    /// Storage pre-filled with `session`.
    #[must_use]
    pub const fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        Ok(self.session.clone())
    }

    fn save(&mut self, session: &Session) -> Result<(), StorageError> {
        self.session = Some(session.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.session = None;
        Ok(())
    }
}

/// Storage backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::session::tests::session_with_role;

    #[test]
    fn test_memory_storage() {
        let session = session_with_role("admin", Duration::days(1));
        let mut storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_none());

        storage.save(&session).unwrap();
        assert_eq!(storage.load().unwrap(), Some(session));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let session = session_with_role("customer", Duration::days(1));

        FileStorage::new(&path).save(&session).unwrap();
        assert_eq!(FileStorage::new(&path).load().unwrap(), Some(session));
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("session.json"));

        assert!(storage.load().unwrap().is_none());
        storage.clear().unwrap();
    }

    #[test]
    fn test_file_storage_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{ not json").unwrap();

        assert!(matches!(
            FileStorage::new(&path).load(),
            Err(StorageError::Serde(_))
        ));
    }
}
