//! HTTP JSON API definitions.

pub mod auth;
pub mod favorite;
pub mod property;
pub mod user;

use std::str::FromStr;

use axum::{
    routing::{get, post},
    Router,
};

use crate::Error;

/// Builds the [`Router`] serving the whole HTTP API.
///
/// [`Service`] is expected to be provided as an [`Extension`] layer.
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register))
        .route("/users/:username", get(user::get).patch(user::update))
        .route("/favorites", get(favorite::list))
        .route(
            "/favorites/:property_id",
            post(favorite::add).delete(favorite::remove),
        )
        .route("/cribbup/search", get(property::search))
        .route("/cribbup/property", get(property::details))
}

/// Parses the provided `value` of a request field.
///
/// # Errors
///
/// With a validation [`Error`] if the `value` is not a valid `T`.
fn parse<T>(field: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::validation(format!("Invalid `{field}`: {e}")))
}

/// Parses the provided `value` of a required request field.
///
/// # Errors
///
/// With a validation [`Error`] if the `value` is missing or is not a valid
/// `T`.
fn require<T>(field: &str, value: Option<&str>) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::validation(format!("Missing `{field}`")))?;
    parse(field, value)
}

#[cfg(test)]
pub(crate) mod fixture {
    use axum::{body::Body, Extension, Router};
    use http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use service::{
        infra::{
            database::Memory,
            upstream::{Gateway, Replica},
        },
        Config,
    };
    use tower::ServiceExt as _;

    use crate::Service;

    /// Running API over in-memory storage and a saved upstream of
    /// `25` properties.
    pub(crate) struct Api {
        /// Directory of the saved upstream responses.
        _dir: tempfile::TempDir,

        /// [`Router`] serving the API.
        router: Router,
    }

    impl Api {
        pub(crate) fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(
                dir.path().join(Replica::SEARCH_FILE),
                json!({
                    "props": (1..=25)
                        .map(|n| json!({
                            "zpid": n,
                            "address": format!("{n} Main St"),
                        }))
                        .collect::<Vec<_>>(),
                    "totalResultCount": 25,
                })
                .to_string(),
            )
            .unwrap();
            std::fs::write(
                dir.path().join(Replica::PROPERTY_FILE),
                json!([
                    {"zpid": 7, "description": "Cozy", "bedrooms": 3},
                    {},
                ])
                .to_string(),
            )
            .unwrap();

            let service = Service::new(
                Config::new(b"secret", Config::DEFAULT_SESSION_TTL),
                Memory::default(),
                Gateway::Replica(Replica::new(dir.path())),
            );
            Self {
                _dir: dir,
                router: super::router().layer(Extension(service)),
            }
        }

        pub(crate) async fn call(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                req = req
                    .header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let req = match body {
                Some(body) => req
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => req.body(Body::empty()),
            }
            .unwrap();

            let resp = self.router.clone().oneshot(req).await.unwrap();
            let status = resp.status();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }

        /// Registers a new user and returns its token.
        pub(crate) async fn register(&self, username: &str) -> String {
            let (status, body) = self
                .call(
                    "POST",
                    "/auth/register",
                    None,
                    Some(json!({
                        "username": username,
                        "password": "pw123",
                        "firstName": "Alice",
                        "lastName": "Smith",
                        "email": format!("{username}@example.com"),
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["token"].as_str().unwrap().to_owned()
        }
    }
}
