//! User profile endpoints.

use axum::{extract::Path, Extension, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain,
    query::{self, Query as _},
};

use crate::{api, define_error, AsError, Error, Service, Session};

/// Public profile of a user.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique name of the user.
    pub username: String,

    /// First name of the user.
    pub first_name: String,

    /// Last name of the user.
    pub last_name: String,

    /// Email of the user.
    pub email: String,

    /// Indicator whether the user is an administrator.
    pub is_admin: bool,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            username: user.username.into(),
            first_name: user.first_name.to_string(),
            last_name: user.last_name.to_string(),
            email: user.email.to_string(),
            is_admin: user.is_admin,
        }
    }
}

/// Response carrying a [`User`].
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Requested [`User`].
    pub user: User,
}

/// Body of a `PATCH /users/:username` request.
///
/// Only the provided fields are updated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New first name.
    pub first_name: Option<String>,

    /// New last name.
    pub last_name: Option<String>,

    /// New email.
    pub email: Option<String>,

    /// New password.
    pub password: Option<String>,
}

/// Response to a `PATCH /users/:username` request.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    /// Updated [`User`].
    pub user: User,

    /// Session token reissued for the updated [`User`].
    pub token: String,
}

/// Returns the profile of the user with the provided username.
///
/// # Errors
///
/// - `UNAUTHORIZED` if the [`Session`] may not act on behalf of the user;
/// - `USER_NOT_EXISTS` if there is no such user.
#[tracing::instrument(skip_all, fields(%username))]
pub async fn get(
    Extension(service): Extension<Service>,
    session: Session,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, Error> {
    let username: domain::user::Username = api::parse("username", &username)?;
    session.ensure_may_act_as(&username)?;

    let user = service
        .execute(query::user::ByUsername::by(username))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(UserError::NotExists))?;

    Ok(Json(UserResponse { user: user.into() }))
}

/// Updates the profile of the user with the provided username.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if any provided field is invalid;
/// - `UNAUTHORIZED` if the [`Session`] may not act on behalf of the user;
/// - `USER_NOT_EXISTS` if there is no such user.
#[tracing::instrument(skip_all, fields(%username))]
pub async fn update(
    Extension(service): Extension<Service>,
    session: Session,
    Path(username): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<ProfileUpdate>, Error>,
) -> Result<Json<UpdateResponse>, Error> {
    let username: domain::user::Username = api::parse("username", &username)?;
    session.ensure_may_act_as(&username)?;

    let ProfileUpdate {
        first_name,
        last_name,
        email,
        password,
    } = body;
    let password: Option<domain::user::Password> = password
        .as_deref()
        .map(|p| api::parse("password", p))
        .transpose()?;

    let user = service
        .execute(command::UpdateUserProfile {
            username,
            first_name: first_name
                .as_deref()
                .map(|n| api::parse("firstName", n))
                .transpose()?,
            last_name: last_name
                .as_deref()
                .map(|n| api::parse("lastName", n))
                .transpose()?,
            email: email
                .as_deref()
                .map(|e| api::parse("email", e))
                .transpose()?,
            password: password
                .map(|p| secrecy::SecretBox::init_with(move || p)),
        })
        .await
        .map_err(AsError::into_error)?;
    let output = service
        .execute(command::CreateUserSession::ByUsername(user.username))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(UpdateResponse {
        user: output.user.into(),
        token: output.token.into(),
    }))
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "User does not exist"]
        NotExists,
    }
}

impl AsError for command::update_user_profile::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Hashing(_) => None,
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use http::StatusCode;
    use serde_json::json;

    use crate::api::fixture::Api;

    #[tokio::test]
    async fn register_then_get_user() {
        let api = Api::new();
        let token = api.register("alice").await;

        let (status, body) =
            api.call("GET", "/users/alice", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "user": {
                    "username": "alice",
                    "firstName": "Alice",
                    "lastName": "Smith",
                    "email": "alice@example.com",
                    "isAdmin": false,
                },
            }),
        );
    }

    #[tokio::test]
    async fn requires_token() {
        let api = Api::new();
        _ = api.register("alice").await;

        let (missing, body) = api.call("GET", "/users/alice", None, None).await;
        let (garbage, _) = api
            .call("GET", "/users/alice", Some("not.a.token"), None)
            .await;

        assert_eq!(missing, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTHORIZATION_REQUIRED");
        assert_eq!(garbage, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn forbids_other_users_profiles() {
        let api = Api::new();
        _ = api.register("alice").await;
        let bob = api.register("bob").await;

        let (status, body) =
            api.call("GET", "/users/alice", Some(&bob), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn updates_profile_and_reissues_token() {
        let api = Api::new();
        let token = api.register("alice").await;

        let (status, body) = api
            .call(
                "PATCH",
                "/users/alice",
                Some(&token),
                Some(json!({"firstName": "Alicia", "password": "new-pw"})),
            )
            .await;
        let (relogin, _) = api
            .call(
                "POST",
                "/auth/token",
                None,
                Some(json!({"username": "alice", "password": "new-pw"})),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["firstName"], "Alicia");
        assert_eq!(body["user"]["lastName"], "Smith");
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(relogin, StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_invalid_email() {
        let api = Api::new();
        let token = api.register("alice").await;

        let (status, body) = api
            .call(
                "PATCH",
                "/users/alice",
                Some(&token),
                Some(json!({"email": "not-an-email"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
