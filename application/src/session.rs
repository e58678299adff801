//! [`Session`]-related definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::user::{self, session},
};

use crate::{define_error, AsError, Error, Service};

/// Authenticated session of the current HTTP request.
///
/// Extracting it rejects the request with `401 Unauthorized` unless it
/// carries a valid `Authorization: Bearer <token>` header.
#[derive(Clone, Debug)]
pub struct Session {
    /// Verified claims of the [`Session`].
    pub claims: user::Session,

    /// Authentication token.
    pub token: session::Token,
}

impl Session {
    /// Returns [`user::Username`] this [`Session`] was issued for.
    #[must_use]
    pub fn username(&self) -> &user::Username {
        &self.claims.username
    }

    /// Ensures this [`Session`] is allowed to act on behalf of the user with
    /// the provided [`user::Username`].
    ///
    /// # Errors
    ///
    /// If the [`Session`] belongs to another user and isn't an administrative
    /// one.
    pub fn ensure_may_act_as(
        &self,
        username: &user::Username,
    ) -> Result<(), Error> {
        self.claims
            .may_act_as(username)
            .then_some(())
            .ok_or_else(|| AuthError::NotOwner.into())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| Error::from(AuthError::AuthorizationRequired))?;

        // SAFETY: Malformed tokens are rejected by the authorization below.
        #[expect(unsafe_code, reason = "checked right away")]
        let token =
            unsafe { session::Token::new_unchecked(bearer.token().to_owned()) };

        let claims = service
            .execute(command::AuthorizeUserSession {
                token: token.clone(),
            })
            .await
            .map_err(AsError::into_error)?;

        Ok(Self { claims, token })
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::JsonWebTokenDecodeError(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "UNAUTHORIZED"]
        #[status = UNAUTHORIZED]
        #[message = "Not allowed to act on behalf of another user"]
        NotOwner,
    }
}
