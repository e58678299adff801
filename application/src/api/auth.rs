//! Authentication endpoints.

use axum::{http::StatusCode, Extension, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::user,
};

use crate::{api, define_error, AsError, Error, Service};

/// Body of a `POST /auth/token` request.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Username to log in with.
    pub username: Option<String>,

    /// Password to log in with.
    pub password: Option<String>,
}

/// Body of a `POST /auth/register` request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Username of the new user.
    pub username: Option<String>,

    /// Password of the new user.
    pub password: Option<String>,

    /// First name of the new user.
    pub first_name: Option<String>,

    /// Last name of the new user.
    pub last_name: Option<String>,

    /// Email of the new user.
    pub email: Option<String>,
}

/// Response carrying a freshly issued session token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Issued session token.
    pub token: String,
}

/// Logs a user in, issuing a new session token.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the credentials are missing;
/// - `WRONG_CREDENTIALS` if the credentials don't match any user.
#[tracing::instrument(skip_all, fields(username = ?body.username))]
pub async fn token(
    Extension(service): Extension<Service>,
    WithRejection(Json(body), _): WithRejection<Json<Credentials>, Error>,
) -> Result<Json<TokenResponse>, Error> {
    let Credentials { username, password } = body;
    let username: user::Username =
        api::require("username", username.as_deref())?;
    let password: user::Password =
        api::require("password", password.as_deref())?;

    let output = service
        .execute(command::CreateUserSession::ByCredentials {
            username,
            password: secrecy::SecretBox::init_with(move || password),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(TokenResponse {
        token: output.token.into(),
    }))
}

/// Registers a new user, issuing a session token for it.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if any field is missing or invalid;
/// - `USERNAME_OCCUPIED` if the username is taken already.
#[tracing::instrument(skip_all, fields(username = ?body.username))]
pub async fn register(
    Extension(service): Extension<Service>,
    WithRejection(Json(body), _): WithRejection<Json<Registration>, Error>,
) -> Result<(StatusCode, Json<TokenResponse>), Error> {
    let Registration {
        username,
        password,
        first_name,
        last_name,
        email,
    } = body;
    let password: user::Password =
        api::require("password", password.as_deref())?;

    let user = service
        .execute(command::CreateUser {
            username: api::require("username", username.as_deref())?,
            password: secrecy::SecretBox::init_with(move || password),
            first_name: api::require("firstName", first_name.as_deref())?,
            last_name: api::require("lastName", last_name.as_deref())?,
            email: api::require("email", email.as_deref())?,
        })
        .await
        .map_err(AsError::into_error)?;
    let output = service
        .execute(command::CreateUserSession::ByUsername(user.username))
        .await
        .map_err(AsError::into_error)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token: output.token.into(),
        }),
    ))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USERNAME_OCCUPIED"]
                #[status = BAD_REQUEST]
                #[message = "Username is taken by another user"]
                UsernameOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Hashing(_) => None,
            Self::UsernameOccupied(_) => Some(Error::UsernameOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = UNAUTHORIZED]
                #[message = "Invalid username/password"]
                WrongCredentials,

                #[code = "USER_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "User does not exist"]
                UserNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::WrongCredentials => Some(Error::WrongCredentials.into()),
            Self::UserNotExists(_) => Some(Error::UserNotExists.into()),
        }
    }
}
