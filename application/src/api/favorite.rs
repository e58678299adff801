//! Favorite properties endpoints.
//!
//! Every endpoint acts on behalf of the user named in the request, defaulting
//! to the one of the current [`Session`].

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, favorite, property, user},
    query::{self, Query as _},
};

use crate::{api, define_error, AsError, Error, Service, Session};

/// Favorite property of a user.
#[derive(Clone, Debug, Serialize)]
pub struct Favorite {
    /// ID of the property.
    pub property_id: String,

    /// Snapshot of the property listing.
    #[serde(flatten)]
    pub attributes: favorite::Attributes,
}

impl From<domain::Favorite> for Favorite {
    fn from(favorite: domain::Favorite) -> Self {
        Self {
            property_id: favorite.property_id.to_string(),
            attributes: favorite.attributes,
        }
    }
}

/// Query parameters of a `GET /favorites` request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Username of the user to list favorites of.
    pub username: Option<String>,
}

/// Response to a `GET /favorites` request.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Listed [`Favorite`]s in the order they were added.
    pub favorites: Vec<Favorite>,
}

/// Body of a `POST /favorites/:property_id` request.
#[derive(Debug, Default, Deserialize)]
pub struct NewFavorite {
    /// Username of the user to add the favorite to.
    pub username: Option<String>,

    /// Snapshot of the property listing.
    #[serde(flatten)]
    pub attributes: favorite::Attributes,
}

/// Response carrying a single [`Favorite`].
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    /// Added [`Favorite`].
    pub favorite: Favorite,
}

/// Body of a `DELETE /favorites/:property_id` request.
#[derive(Debug, Default, Deserialize)]
pub struct Removal {
    /// Username of the user to remove the favorite from.
    pub username: Option<String>,
}

/// Response to a `DELETE /favorites/:property_id` request.
#[derive(Debug, Serialize)]
pub struct RemovalResponse {
    /// Human-readable outcome.
    pub message: &'static str,

    /// Removed [`Favorite`].
    pub favorite: Favorite,
}

/// Resolves the owner of the favorites an endpoint acts upon.
///
/// # Errors
///
/// If the `username` is invalid, or the [`Session`] may not act on its
/// behalf.
fn owner(
    session: &Session,
    username: Option<&str>,
) -> Result<user::Username, Error> {
    let owner = match username.filter(|u| !u.is_empty()) {
        Some(u) => api::parse("username", u)?,
        None => session.username().clone(),
    };
    session.ensure_may_act_as(&owner)?;
    Ok(owner)
}

/// Lists favorite properties of a user.
///
/// # Errors
///
/// - `UNAUTHORIZED` if the [`Session`] may not act on behalf of the user.
#[tracing::instrument(skip_all, fields(username = ?params.username))]
pub async fn list(
    Extension(service): Extension<Service>,
    session: Session,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> Result<Json<ListResponse>, Error> {
    let owner = owner(&session, params.username.as_deref())?;

    let favorites = service
        .execute(query::favorites::ByOwner::by(owner))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(ListResponse {
        favorites: favorites.into_iter().map(Into::into).collect(),
    }))
}

/// Adds a property to the favorites of a user.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the property ID or the body is invalid;
/// - `UNAUTHORIZED` if the [`Session`] may not act on behalf of the user;
/// - `USER_NOT_EXISTS` if there is no such user;
/// - `FAVORITE_EXISTS` if the property is among the favorites already.
#[tracing::instrument(skip_all, fields(%property_id))]
pub async fn add(
    Extension(service): Extension<Service>,
    session: Session,
    Path(property_id): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<NewFavorite>, Error>,
) -> Result<(StatusCode, Json<FavoriteResponse>), Error> {
    let property_id: property::Id = api::parse("propertyId", &property_id)?;
    let NewFavorite {
        username,
        attributes,
    } = body;
    let owner = owner(&session, username.as_deref())?;

    let favorite = service
        .execute(command::AddFavorite {
            owner,
            property_id,
            attributes,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        StatusCode::CREATED,
        Json(FavoriteResponse {
            favorite: favorite.into(),
        }),
    ))
}

/// Removes a property from the favorites of a user.
///
/// The body is optional: without it the user of the current [`Session`] is
/// assumed.
///
/// # Errors
///
/// - `UNAUTHORIZED` if the [`Session`] may not act on behalf of the user;
/// - `FAVORITE_NOT_EXISTS` if the property is not among the favorites.
#[tracing::instrument(skip_all, fields(%property_id))]
pub async fn remove(
    Extension(service): Extension<Service>,
    session: Session,
    Path(property_id): Path<String>,
    body: Option<Json<Removal>>,
) -> Result<Json<RemovalResponse>, Error> {
    let property_id: property::Id = api::parse("propertyId", &property_id)?;
    let Removal { username } = body.map(|Json(b)| b).unwrap_or_default();
    let owner = owner(&session, username.as_deref())?;

    let favorite = service
        .execute(command::RemoveFavorite { owner, property_id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(RemovalResponse {
        message: "Property removed from favorites",
        favorite: favorite.into(),
    }))
}

define_error! {
    enum FavoriteError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "User does not exist"]
        OwnerNotExists,

        #[code = "FAVORITE_EXISTS"]
        #[status = BAD_REQUEST]
        #[message = "Property already in favorites"]
        AlreadyExists,

        #[code = "FAVORITE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Property not found in favorites"]
        NotExists,
    }
}

impl AsError for command::add_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::OwnerNotExists(_) => {
                Some(FavoriteError::OwnerNotExists.into())
            }
            Self::AlreadyExists(_) => {
                Some(FavoriteError::AlreadyExists.into())
            }
        }
    }
}

impl AsError for command::remove_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotExists(_) => Some(FavoriteError::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use http::StatusCode;
    use serde_json::json;

    use crate::api::fixture::Api;

    #[tokio::test]
    async fn add_list_remove_scenario() {
        let api = Api::new();
        let token = api.register("alice").await;

        let (added, body) = api
            .call(
                "POST",
                "/favorites/zpid123",
                Some(&token),
                Some(json!({
                    "username": "alice",
                    "address": "1 Main St",
                    "price": 250_000,
                    "beds": 3,
                    "baths": 2.5,
                })),
            )
            .await;
        assert_eq!(added, StatusCode::CREATED);
        assert_eq!(body["favorite"]["property_id"], "zpid123");
        assert_eq!(body["favorite"]["beds"], 3);

        let (_, body) = api
            .call("GET", "/favorites?username=alice", Some(&token), None)
            .await;
        assert_eq!(body["favorites"].as_array().unwrap().len(), 1);
        assert_eq!(body["favorites"][0]["property_id"], "zpid123");
        assert_eq!(body["favorites"][0]["address"], "1 Main St");

        let (removed, body) = api
            .call(
                "DELETE",
                "/favorites/zpid123",
                Some(&token),
                Some(json!({"username": "alice"})),
            )
            .await;
        assert_eq!(removed, StatusCode::OK);
        assert_eq!(body["message"], "Property removed from favorites");

        let (_, body) =
            api.call("GET", "/favorites", Some(&token), None).await;
        assert_eq!(body["favorites"], json!([]));
    }

    #[tokio::test]
    async fn duplicate_favorite_is_rejected() {
        let api = Api::new();
        let token = api.register("alice").await;

        let (first, _) = api
            .call("POST", "/favorites/42", Some(&token), Some(json!({})))
            .await;
        let (second, body) = api
            .call("POST", "/favorites/42", Some(&token), Some(json!({})))
            .await;
        let (_, listed) =
            api.call("GET", "/favorites", Some(&token), None).await;

        assert_eq!(first, StatusCode::CREATED);
        assert_eq!(second, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Property already in favorites");
        assert_eq!(listed["favorites"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removing_missing_favorite_is_not_found() {
        let api = Api::new();
        let token = api.register("alice").await;

        let (status, body) =
            api.call("DELETE", "/favorites/42", Some(&token), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "FAVORITE_NOT_EXISTS");
    }

    #[tokio::test]
    async fn foreign_favorites_require_admin() {
        let api = Api::new();
        _ = api.register("alice").await;
        let bob = api.register("bob").await;

        let (status, _) = api
            .call("GET", "/favorites?username=alice", Some(&bob), None)
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
