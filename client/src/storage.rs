//! [`TokenStorage`] definitions.

use std::{future::Future, io, path::PathBuf};

use tokio::sync::Mutex;

/// Durable storage of a session token.
pub trait TokenStorage {
    /// Loads the stored token, if any.
    fn load(&self) -> impl Future<Output = io::Result<Option<String>>> + Send;

    /// Stores the provided `token`, replacing the previous one.
    fn store(&self, token: &str) -> impl Future<Output = io::Result<()>> + Send;

    /// Removes the stored token, if any.
    fn clear(&self) -> impl Future<Output = io::Result<()>> + Send;
}

/// [`TokenStorage`] keeping the token in a single file.
#[derive(Clone, Debug)]
pub struct FileStorage {
    /// Path to the file holding the token.
    path: PathBuf,
}

impl FileStorage {
    /// Creates a new [`FileStorage`] keeping the token at the provided
    /// `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStorage for FileStorage {
    async fn load(&self) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(token) => {
                let token = token.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn store(&self, token: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&self.path, token).await
    }

    async fn clear(&self) -> io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            res => res,
        }
    }
}

/// [`TokenStorage`] keeping the token in memory only.
#[derive(Debug, Default)]
pub struct MemoryStorage(Mutex<Option<String>>);

impl MemoryStorage {
    /// Creates a new [`MemoryStorage`] holding the provided `token`.
    #[must_use]
    pub fn with(token: impl Into<String>) -> Self {
        Self(Mutex::new(Some(token.into())))
    }
}

impl TokenStorage for MemoryStorage {
    async fn load(&self) -> io::Result<Option<String>> {
        Ok(self.0.lock().await.clone())
    }

    async fn store(&self, token: &str) -> io::Result<()> {
        *self.0.lock().await = Some(token.to_owned());
        Ok(())
    }

    async fn clear(&self) -> io::Result<()> {
        *self.0.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use super::{FileStorage, MemoryStorage, TokenStorage as _};

    #[tokio::test]
    async fn file_storage_persists_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token");

        let storage = FileStorage::new(&path);
        assert_eq!(storage.load().await.unwrap(), None);

        storage.store("abc.def.ghi").await.unwrap();
        let reopened = FileStorage::new(&path);
        assert_eq!(
            reopened.load().await.unwrap().as_deref(),
            Some("abc.def.ghi"),
        );

        reopened.clear().await.unwrap();
        reopened.clear().await.unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_storage_replaces_token() {
        let storage = MemoryStorage::with("first");

        storage.store("second").await.unwrap();
        assert_eq!(storage.load().await.unwrap().as_deref(), Some("second"));

        storage.clear().await.unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
    }
}
