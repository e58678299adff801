//! [`Api`] definitions.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Url};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use service::domain::{favorite, property, user};

use crate::{
    error::{Envelope, ServerError},
    model::{Favorite, NewUser, ProfileUpdate, SearchResults, User},
    token, Error, Session, TokenStorage,
};

/// Facade of the CribbUp HTTP JSON API.
///
/// Every call checks the token of the [`Session`] first: an expired one is
/// cleared and the call fails with [`Error::SessionExpired`] without
/// reaching the network.
#[derive(Debug)]
pub struct Api<S> {
    /// HTTP client performing the requests.
    http: reqwest::Client,

    /// Base URL of the server.
    base_url: Url,

    /// [`Session`] the requests are made on behalf of.
    session: Arc<Session<S>>,
}

impl<S> Clone for Api<S> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            session: Arc::clone(&self.session),
        }
    }
}

impl<S: TokenStorage> Api<S> {
    /// Creates a new [`Api`] of the server at the provided `base_url`.
    #[must_use]
    pub fn new(base_url: Url, session: Arc<Session<S>>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    /// Returns the [`Session`] of this [`Api`].
    #[must_use]
    pub fn session(&self) -> &Arc<Session<S>> {
        &self.session
    }

    /// Searches properties for sale in the provided `location`.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the `location` is blank;
    /// - [`Error::SessionExpired`] if the token has expired;
    /// - [`Error::Failed`] if the request fails.
    pub async fn search_properties(
        &self,
        location: &str,
        page: u32,
        limit: u32,
    ) -> Result<SearchResults, Error> {
        let location = location.trim();
        if location.is_empty() {
            return Err(Error::Validation(
                "Please enter a valid city or ZIP code.",
            ));
        }

        self.send(
            "Failed to load properties",
            Method::GET,
            &["cribbup", "search"],
            |r| {
                r.query(&[
                    ("location", location.to_owned()),
                    ("page", page.to_string()),
                    ("limit", limit.to_string()),
                ])
            },
        )
        .await
    }

    /// Returns details of the property with the provided `zpid`.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionExpired`] if the token has expired;
    /// - [`Error::Failed`] if the request fails.
    pub async fn property_details(
        &self,
        zpid: &property::Id,
    ) -> Result<property::Details, Error> {
        #[derive(Deserialize)]
        struct Response {
            building: property::Details,
        }

        let zpid: &str = zpid.as_ref();
        let Response { building } = self
            .send(
                "Failed to load building",
                Method::GET,
                &["cribbup", "property"],
                |r| r.query(&[("zpid", zpid)]),
            )
            .await?;
        Ok(building)
    }

    /// Signs in with the provided credentials and keeps the issued token in
    /// the [`Session`].
    ///
    /// # Errors
    ///
    /// - [`Error::SessionExpired`] if the previous token has expired;
    /// - [`Error::Failed`] if the request fails or the token cannot be
    ///   stored.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<String, Error> {
        const FAILURE: &str = "Failed to login";

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });
        let TokenResponse { token } = self
            .send(FAILURE, Method::POST, &["auth", "token"], |r| {
                r.json(&body)
            })
            .await?;
        self.keep(FAILURE, &token).await?;
        Ok(token)
    }

    /// Registers the provided [`NewUser`] and keeps the issued token in the
    /// [`Session`].
    ///
    /// # Errors
    ///
    /// - [`Error::SessionExpired`] if the previous token has expired;
    /// - [`Error::Failed`] if the request fails or the token cannot be
    ///   stored.
    pub async fn signup(&self, new_user: &NewUser) -> Result<String, Error> {
        const FAILURE: &str = "Failed to sign up";

        let body = json!({
            "username": new_user.username,
            "password": new_user.password.expose_secret(),
            "firstName": new_user.first_name,
            "lastName": new_user.last_name,
            "email": new_user.email,
        });
        let TokenResponse { token } = self
            .send(FAILURE, Method::POST, &["auth", "register"], |r| {
                r.json(&body)
            })
            .await?;
        self.keep(FAILURE, &token).await?;
        Ok(token)
    }

    /// Returns the profile of the user with the provided `username`.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionExpired`] if the token has expired;
    /// - [`Error::Failed`] if the request fails.
    pub async fn user(
        &self,
        username: &user::Username,
    ) -> Result<User, Error> {
        let UserResponse { user } = self
            .send(
                "Failed to load user",
                Method::GET,
                &["users", AsRef::<str>::as_ref(username)],
                |r| r,
            )
            .await?;
        Ok(user)
    }

    /// Applies the provided [`ProfileUpdate`] to the profile of the user with
    /// the provided `username`, keeping the reissued token in the
    /// [`Session`].
    ///
    /// # Errors
    ///
    /// - [`Error::SessionExpired`] if the token has expired;
    /// - [`Error::Failed`] if the request fails or the token cannot be
    ///   stored.
    pub async fn edit_profile(
        &self,
        username: &user::Username,
        update: &ProfileUpdate,
    ) -> Result<User, Error> {
        const FAILURE: &str = "Failed to update profile";

        #[derive(Deserialize)]
        struct Response {
            user: User,
            token: String,
        }

        let ProfileUpdate {
            first_name,
            last_name,
            email,
            password,
        } = update;
        let mut body = Map::new();
        for (key, value) in [
            ("firstName", first_name.as_deref()),
            ("lastName", last_name.as_deref()),
            ("email", email.as_deref()),
            ("password", password.as_ref().map(|p| p.expose_secret())),
        ] {
            if let Some(value) = value {
                _ = body.insert(key.to_owned(), Value::from(value));
            }
        }

        let Response { user, token } = self
            .send(
                FAILURE,
                Method::PATCH,
                &["users", AsRef::<str>::as_ref(username)],
                |r| r.json(&body),
            )
            .await?;
        self.keep(FAILURE, &token).await?;
        Ok(user)
    }

    /// Lists favorite properties of the user with the provided `username`.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionExpired`] if the token has expired;
    /// - [`Error::Failed`] if the request fails.
    pub async fn favorites(
        &self,
        username: &user::Username,
    ) -> Result<Vec<Favorite>, Error> {
        #[derive(Deserialize)]
        struct Response {
            favorites: Vec<Favorite>,
        }

        let username: &str = username.as_ref();
        let Response { favorites } = self
            .send(
                "Failed to fetch favorite properties",
                Method::GET,
                &["favorites"],
                |r| r.query(&[("username", username)]),
            )
            .await?;
        Ok(favorites)
    }

    /// Adds the property with the provided ID and [`favorite::Attributes`]
    /// to the favorites of the user with the provided `username`.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionExpired`] if the token has expired;
    /// - [`Error::Failed`] if the request fails.
    pub async fn add_favorite(
        &self,
        username: &user::Username,
        property_id: &property::Id,
        attributes: &favorite::Attributes,
    ) -> Result<Favorite, Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            username: &'a user::Username,
            #[serde(flatten)]
            attributes: &'a favorite::Attributes,
        }

        let body = Body {
            username,
            attributes,
        };
        let FavoriteResponse { favorite } = self
            .send(
                "Failed to add property to favorites",
                Method::POST,
                &["favorites", property_id.as_ref()],
                |r| r.json(&body),
            )
            .await?;
        Ok(favorite)
    }

    /// Removes the property with the provided ID from the favorites of the
    /// user with the provided `username`.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionExpired`] if the token has expired;
    /// - [`Error::Failed`] if the request fails.
    pub async fn remove_favorite(
        &self,
        username: &user::Username,
        property_id: &property::Id,
    ) -> Result<Favorite, Error> {
        let body = json!({ "username": username });
        let FavoriteResponse { favorite } = self
            .send(
                "Failed to remove property from favorites",
                Method::DELETE,
                &["favorites", property_id.as_ref()],
                |r| r.json(&body),
            )
            .await?;
        Ok(favorite)
    }

    /// Returns the token of the [`Session`] if it's still valid.
    ///
    /// # Errors
    ///
    /// With [`Error::SessionExpired`] if the token has expired, clearing the
    /// [`Session`].
    async fn valid_token(&self) -> Result<Option<String>, Error> {
        let Some(token) = self.session.token().await else {
            return Ok(None);
        };
        if !token::is_expired(&token) {
            return Ok(Some(token));
        }

        tracing::info!("session token has expired, signing out");
        if let Err(e) = self.session.clear().await {
            tracing::warn!("failed to clear expired session token: {e}");
        }
        Err(Error::SessionExpired)
    }

    /// Keeps the provided `token` in the [`Session`].
    async fn keep(
        &self,
        failure: &'static str,
        token: &str,
    ) -> Result<(), Error> {
        self.session
            .set(token)
            .await
            .map_err(|e| Error::failed(failure, e))
    }

    /// Sends a request to the endpoint at the provided `path` segments,
    /// authorized with the [`Session`] token, and decodes its JSON response.
    ///
    /// Segments are percent-encoded, so they never alter the path
    /// structure.
    ///
    /// Any failure is reported under the provided `failure` message.
    async fn send<T: DeserializeOwned>(
        &self,
        failure: &'static str,
        method: Method,
        path: &[&str],
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, Error> {
        let token = self.valid_token().await?;

        let mut url = self.base_url.clone();
        _ = url
            .path_segments_mut()
            .map_err(|()| Error::Validation("Server URL cannot be a base."))?
            .pop_if_empty()
            .extend(path);
        let mut request = self.http.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = build(request)
            .send()
            .await
            .map_err(|e| Error::failed(failure, e))?;

        let status = response.status();
        if !status.is_success() {
            let error = match response.json::<Envelope>().await {
                Ok(Envelope { error }) => error,
                Err(_) => ServerError {
                    message: status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_owned(),
                    status: status.as_u16(),
                    code: String::new(),
                },
            };
            tracing::debug!(%status, code = %error.code, "{failure}: {error}");
            return Err(Error::failed(failure, error));
        }

        response.json().await.map_err(|e| Error::failed(failure, e))
    }
}

/// Response carrying a session token.
#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Response carrying a [`User`].
#[derive(Deserialize)]
struct UserResponse {
    user: User,
}

/// Response carrying a [`Favorite`].
#[derive(Deserialize)]
struct FavoriteResponse {
    favorite: Favorite,
}
