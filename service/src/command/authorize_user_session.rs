//! [`Command`] for authorizing a [`User`].

use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::user::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [`Session`] token.
///
/// Only the token itself is checked: its signature and expiration. Tokens are
/// never refreshed or revoked.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, Up> Command<AuthorizeUserSession> for Service<Db, Up> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let mut validation = Validation::default();
        validation.leeway = 0;

        jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &validation,
        )
        .map(|data| data.claims)
        .map_err(tracerr::from_and_wrap!(=> E))
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error: malformed, badly signed or expired
    /// token.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::{
        command::{AuthorizeUserSession, Command as _},
        domain::user::{session::Token, Session},
        fixture,
    };

    fn sign(svc: &fixture::Service, session: &Session) -> Token {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            session,
            &svc.config().jwt_encoding_key,
        )
        .unwrap()
        .parse()
        .unwrap()
    }

    fn session(expires_in: Duration, expired: bool) -> Session {
        let now = DateTime::now();
        Session {
            username: "alice".parse().unwrap(),
            is_admin: false,
            issued_at: (now - Duration::from_secs(3600)).coerce(),
            expires_at: if expired {
                (now - expires_in).coerce()
            } else {
                (now + expires_in).coerce()
            },
        }
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let svc = fixture::service();
        let token = sign(&svc, &session(Duration::from_secs(60), false));

        let session = svc
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap();

        assert_eq!(session.username.to_string(), "alice");
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let svc = fixture::service();
        let token = sign(&svc, &session(Duration::from_secs(5), true));

        assert!(svc.execute(AuthorizeUserSession { token }).await.is_err());
    }

    #[tokio::test]
    async fn rejects_foreign_signature() {
        let svc = fixture::service();
        let token: Token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &session(Duration::from_secs(60), false),
            &jsonwebtoken::EncodingKey::from_secret(b"another secret"),
        )
        .unwrap()
        .parse()
        .unwrap();

        assert!(svc.execute(AuthorizeUserSession { token }).await.is_err());
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let svc = fixture::service();

        let res = svc
            .execute(AuthorizeUserSession {
                token: "not.a.token".parse().unwrap(),
            })
            .await;

        assert!(res.is_err());
    }
}
