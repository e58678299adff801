//! [`Command`] for creating a [`Session`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Password, Username};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Username`] of a [`User`].
        username: user::Username,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] for the [`User`] with the provided
    /// [`Username`], without checking any credentials.
    ByUsername(user::Username),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    ///
    /// [`DateTime`]: common::DateTime
    pub expires_at: session::ExpirationDateTime,
}

impl<Db, Up> Command<CreateUserSession> for Service<Db, Up>
where
    Db: Database<
        Select<By<Option<User>, user::Username>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { username, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(username)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                if !user.password_hash.verify(password.expose_secret()) {
                    return Err(tracerr::new!(E::WrongCredentials));
                }

                user
            }
            Cmd::ByUsername(username) => self
                .database()
                .execute(Select(By::new(username.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(username))
                .map_err(tracerr::wrap!())?,
        };

        let session = Session::issue(&user, self.config().session_ttl);
        let expires_at = session.expires_at;
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &session,
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        tracing::debug!(username = %user.username, "issued a session");

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided [`Username`] does not exist.
    #[display("`User(username: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Username),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{AuthorizeUserSession, Command as _, CreateUserSession},
        fixture,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn issues_token_for_own_username() {
        let svc = fixture::service();
        let user = svc
            .execute(fixture::create_user("alice", "pw123"))
            .await
            .unwrap();

        let out = svc
            .execute(CreateUserSession::ByCredentials {
                username: user.username.clone(),
                password: SecretBox::new(Box::new("pw123".parse().unwrap())),
            })
            .await
            .unwrap();
        let session = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();

        assert_eq!(session.username, user.username);
        assert!(!session.is_admin);
        assert_eq!(
            session.expires_at.unix_timestamp(),
            out.expires_at.unix_timestamp(),
        );
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let svc = fixture::service();
        let user = svc
            .execute(fixture::create_user("alice", "pw123"))
            .await
            .unwrap();

        let err = svc
            .execute(CreateUserSession::ByCredentials {
                username: user.username,
                password: SecretBox::new(Box::new("pw124".parse().unwrap())),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }

    #[tokio::test]
    async fn rejects_unknown_username() {
        let svc = fixture::service();

        let err = svc
            .execute(CreateUserSession::ByCredentials {
                username: "nobody".parse().unwrap(),
                password: SecretBox::new(Box::new("pw123".parse().unwrap())),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }
}
