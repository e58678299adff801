//! [`SessionContext`] definitions.

use secrecy::SecretString;
use tokio::sync::watch;

use crate::{
    model::{NewUser, User},
    token, Api, Error, TokenStorage,
};

/// State of the signed in user.
#[derive(Clone, Debug, PartialEq)]
pub enum State {
    /// Stored session is being restored.
    Loading,

    /// [`User`] is signed in.
    Authenticated(User),

    /// Nobody is signed in.
    Anonymous,
}

/// Decision about entering a page which requires a signed in user.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    /// Wait until the [`State`] is known, rendering nothing.
    Pending,

    /// Enter the page.
    Granted,

    /// Go to the login page instead.
    RedirectToLogin,
}

/// Tracker of the signed in user, publishing its [`State`] to subscribers.
#[derive(Debug)]
pub struct SessionContext<S> {
    /// [`Api`] to fetch the signed in [`User`] with.
    api: Api<S>,

    /// Current [`State`].
    state: watch::Sender<State>,
}

impl<S: TokenStorage> SessionContext<S> {
    /// Creates a new [`SessionContext`] in the [`State::Loading`].
    #[must_use]
    pub fn new(api: Api<S>) -> Self {
        Self {
            api,
            state: watch::Sender::new(State::Loading),
        }
    }

    /// Returns the [`Api`] of this [`SessionContext`].
    #[must_use]
    pub fn api(&self) -> &Api<S> {
        &self.api
    }

    /// Subscribes to changes of the [`State`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    /// Returns the current [`State`].
    #[must_use]
    pub fn state(&self) -> State {
        self.state.borrow().clone()
    }

    /// Returns the signed in [`User`], if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        match &*self.state.borrow() {
            State::Authenticated(user) => Some(user.clone()),
            State::Loading | State::Anonymous => None,
        }
    }

    /// Decides whether a page requiring a signed in user may be entered.
    #[must_use]
    pub fn guard(&self) -> Access {
        match &*self.state.borrow() {
            State::Loading => Access::Pending,
            State::Authenticated(_) => Access::Granted,
            State::Anonymous => Access::RedirectToLogin,
        }
    }

    /// Restores the session from the stored token.
    ///
    /// Any failure to restore it signs the user out.
    pub async fn init(&self) -> State {
        let session = self.api.session();
        let stored = session.reload().await.unwrap_or_else(|e| {
            tracing::warn!("failed to load stored session token: {e}");
            None
        });
        let state = match stored {
            Some(token) => self.authenticate(&token).await,
            None => State::Anonymous,
        };
        self.publish(state)
    }

    /// Signs in with the provided `token`, keeping it in the session.
    ///
    /// # Errors
    ///
    /// If the `token` cannot be stored.
    pub async fn login(&self, token: &str) -> Result<State, Error> {
        self.api
            .session()
            .set(token)
            .await
            .map_err(|e| Error::failed("Failed to login", e))?;
        let state = self.authenticate(token).await;
        Ok(self.publish(state))
    }

    /// Signs in with the provided credentials.
    ///
    /// # Errors
    ///
    /// If the [`Api::login()`] call fails.
    pub async fn login_with(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<State, Error> {
        let token = self.api.login(username, password).await?;
        let state = self.authenticate(&token).await;
        Ok(self.publish(state))
    }

    /// Registers the provided [`NewUser`] and signs them in.
    ///
    /// # Errors
    ///
    /// If the [`Api::signup()`] call fails.
    pub async fn signup(&self, new_user: &NewUser) -> Result<State, Error> {
        let token = self.api.signup(new_user).await?;
        let state = self.authenticate(&token).await;
        Ok(self.publish(state))
    }

    /// Signs the user out, forgetting the token.
    pub async fn logout(&self) {
        self.purge().await;
        _ = self.publish(State::Anonymous);
    }

    /// Resolves the [`User`] the provided `token` belongs to.
    ///
    /// Purges the token if it cannot be resolved.
    async fn authenticate(&self, token: &str) -> State {
        let Some(claims) = token::decode(token) else {
            tracing::info!("stored session token is malformed, signing out");
            self.purge().await;
            return State::Anonymous;
        };
        match self.api.user(&claims.username).await {
            Ok(user) => State::Authenticated(user),
            Err(e) => {
                tracing::info!("failed to restore session: {e}");
                self.purge().await;
                State::Anonymous
            }
        }
    }

    /// Clears the session token.
    async fn purge(&self) {
        if let Err(e) = self.api.session().clear().await {
            tracing::warn!("failed to clear session token: {e}");
        }
    }

    /// Publishes the provided [`State`] and returns it back.
    fn publish(&self, state: State) -> State {
        _ = self.state.send_replace(state.clone());
        state
    }
}
