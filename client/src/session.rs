//! [`Session`] definitions.

use std::io;

use tokio::sync::RwLock;

use crate::TokenStorage;

/// Token of the signed in user, kept in memory and mirrored into a
/// [`TokenStorage`].
#[derive(Debug)]
pub struct Session<S> {
    /// Token used by the requests.
    token: RwLock<Option<String>>,

    /// [`TokenStorage`] the token survives restarts in.
    storage: S,
}

impl<S: TokenStorage> Session<S> {
    /// Creates a new empty [`Session`] backed by the provided `storage`.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            token: RwLock::new(None),
            storage,
        }
    }

    /// Creates a new [`Session`] with the token loaded from the provided
    /// `storage`.
    ///
    /// # Errors
    ///
    /// If the `storage` fails to load the token.
    pub async fn restore(storage: S) -> io::Result<Self> {
        let session = Self::new(storage);
        _ = session.reload().await?;
        Ok(session)
    }

    /// Returns the current token, if any.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Replaces the in-memory token with the stored one and returns it.
    ///
    /// # Errors
    ///
    /// If the [`TokenStorage`] fails to load the token.
    pub async fn reload(&self) -> io::Result<Option<String>> {
        let stored = self.storage.load().await?;
        self.token.write().await.clone_from(&stored);
        Ok(stored)
    }

    /// Sets the provided `token` both in memory and in the [`TokenStorage`].
    ///
    /// # Errors
    ///
    /// If the [`TokenStorage`] fails to store the token. The in-memory token
    /// is set anyway.
    pub async fn set(&self, token: impl Into<String>) -> io::Result<()> {
        let token = token.into();
        let stored = self.storage.store(&token).await;
        *self.token.write().await = Some(token);
        stored
    }

    /// Removes the token both from memory and from the [`TokenStorage`].
    ///
    /// # Errors
    ///
    /// If the [`TokenStorage`] fails to remove the token. The in-memory token
    /// is removed anyway.
    pub async fn clear(&self) -> io::Result<()> {
        *self.token.write().await = None;
        self.storage.clear().await
    }

    /// Returns the [`TokenStorage`] of this [`Session`].
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod spec {
    use crate::{MemoryStorage, TokenStorage as _};

    use super::Session;

    #[tokio::test]
    async fn mirrors_token_into_storage() {
        let session = Session::new(MemoryStorage::default());

        session.set("token").await.unwrap();
        assert_eq!(session.token().await.as_deref(), Some("token"));
        assert_eq!(
            session.storage().load().await.unwrap().as_deref(),
            Some("token"),
        );

        session.clear().await.unwrap();
        assert_eq!(session.token().await, None);
        assert_eq!(session.storage().load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn restores_stored_token() {
        let session = Session::restore(MemoryStorage::with("stored"))
            .await
            .unwrap();

        assert_eq!(session.token().await.as_deref(), Some("stored"));
    }
}
