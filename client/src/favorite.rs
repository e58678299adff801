//! [`FavoriteToggle`] definitions.

use rust_decimal::prelude::ToPrimitive as _;
use service::domain::{favorite, property, user};

use crate::{model::Favorite, Api, Error, Notice, TokenStorage};

/// Favorite mark of a single property in the search results.
#[derive(Clone, Debug)]
pub struct FavoriteToggle {
    /// Signed in user owning the favorites, if any.
    owner: Option<user::Username>,

    /// Property this [`FavoriteToggle`] is about.
    property: property::Summary,

    /// Indicator whether the property is among the owner's favorites.
    is_favorite: bool,
}

impl FavoriteToggle {
    /// Creates a new [`FavoriteToggle`] of the provided `property`, checking
    /// it against the already loaded `favorites` of the `owner`.
    #[must_use]
    pub fn new(
        owner: Option<user::Username>,
        property: property::Summary,
        favorites: &[Favorite],
    ) -> Self {
        let is_favorite = owner.is_some()
            && favorites.iter().any(|f| f.property_id == property.zpid);
        Self {
            owner,
            property,
            is_favorite,
        }
    }

    /// Creates a new [`FavoriteToggle`] of the provided `property`, loading
    /// the favorites of the `owner` to check it against.
    ///
    /// # Errors
    ///
    /// If the favorites fail to load.
    pub async fn reconcile<S: TokenStorage>(
        api: &Api<S>,
        owner: Option<user::Username>,
        property: property::Summary,
    ) -> Result<Self, Error> {
        let favorites = match &owner {
            Some(owner) => api.favorites(owner).await?,
            None => Vec::new(),
        };
        Ok(Self::new(owner, property, &favorites))
    }

    /// Indicates whether the property is among the owner's favorites.
    #[must_use]
    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    /// Returns the property of this [`FavoriteToggle`].
    #[must_use]
    pub fn property(&self) -> &property::Summary {
        &self.property
    }

    /// Adds the property to the favorites, or removes it from them if it's
    /// there already, describing the outcome with a [`Notice`].
    pub async fn toggle<S: TokenStorage>(&mut self, api: &Api<S>) -> Notice {
        let Some(owner) = &self.owner else {
            return Notice::failure("You must be logged in to add favorites.");
        };

        let zpid = &self.property.zpid;
        let res = if self.is_favorite {
            api.remove_favorite(owner, zpid)
                .await
                .map(|_| "Property removed from favorites!")
        } else {
            api.add_favorite(owner, zpid, &attributes(&self.property))
                .await
                .map(|_| "Property added to favorites!")
        };

        match res {
            Ok(message) => {
                self.is_favorite = !self.is_favorite;
                Notice::success(message)
            }
            Err(e @ Error::SessionExpired) => Notice::alert(e.to_string()),
            Err(e) => {
                tracing::warn!(%zpid, "failed to update favorite: {e}");
                Notice::failure("Failed to update favorite. Please try again.")
            }
        }
    }
}

/// Captures [`favorite::Attributes`] of the provided listing.
#[must_use]
pub fn attributes(summary: &property::Summary) -> favorite::Attributes {
    favorite::Attributes {
        address: summary.address.clone(),
        price: summary.price,
        image_url: summary.img_src.clone(),
        beds: summary.bedrooms,
        baths: summary.bathrooms,
        square_feet: summary.living_area.and_then(|a| a.round().to_i32()),
    }
}

#[cfg(test)]
mod spec {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{
        extract::Path,
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use service::domain::{property, user};

    use crate::{
        fixture::{self, Server},
        notice::Kind,
        Api, FavoriteToggle, MemoryStorage,
    };

    fn summary(zpid: &str) -> property::Summary {
        let mut page = fixture::page(1, 1);
        page["properties"][0]["zpid"] = json!(zpid);
        serde_json::from_value(page["properties"][0].clone()).unwrap()
    }

    fn alice() -> Option<user::Username> {
        user::Username::new("alice")
    }

    /// Stub keeping favorites in memory, failing for property `500`.
    async fn server() -> Server {
        let favorites = Arc::new(Mutex::new(vec![json!({
            "property_id": "100",
        })]));
        let listed = Arc::clone(&favorites);
        let added = Arc::clone(&favorites);
        let removed = Arc::clone(&favorites);

        Server::spawn(
            Router::new()
                .route(
                    "/favorites",
                    get(move || async move {
                        let favorites = listed.lock().unwrap().clone();
                        Json(json!({ "favorites": favorites }))
                    }),
                )
                .route(
                    "/favorites/:id",
                    post(
                        move |Path(id): Path<String>,
                              Json(mut body): Json<Value>| async move {
                            if id == "500" {
                                return Err(StatusCode::INTERNAL_SERVER_ERROR);
                            }
                            body["property_id"] = json!(id);
                            let fields = body.as_object_mut().unwrap();
                            _ = fields.remove("username");
                            added.lock().unwrap().push(body.clone());
                            Ok((
                                StatusCode::CREATED,
                                Json(json!({ "favorite": body })),
                            ))
                        },
                    )
                    .delete(move |Path(id): Path<String>| async move {
                        let mut favorites = removed.lock().unwrap();
                        let pos = favorites
                            .iter()
                            .position(|f| f["property_id"] == json!(id))
                            .ok_or(StatusCode::NOT_FOUND)?;
                        let favorite = favorites.remove(pos);
                        Ok::<_, StatusCode>(Json(json!({
                            "message": "Property removed from favorites",
                            "favorite": favorite,
                        })))
                    }),
                ),
        )
        .await
    }

    async fn api(server: &Server) -> Api<MemoryStorage> {
        server
            .api(MemoryStorage::with(fixture::token(
                "alice",
                Duration::from_secs(60),
            )))
            .await
    }

    #[tokio::test]
    async fn reconciles_with_favorites() {
        let server = server().await;
        let api = api(&server).await;

        let saved = FavoriteToggle::reconcile(&api, alice(), summary("100"))
            .await
            .unwrap();
        let other = FavoriteToggle::reconcile(&api, alice(), summary("200"))
            .await
            .unwrap();

        assert!(saved.is_favorite());
        assert!(!other.is_favorite());
    }

    #[tokio::test]
    async fn toggles_back_and_forth() {
        let server = server().await;
        let api = api(&server).await;
        let mut toggle = FavoriteToggle::new(alice(), summary("200"), &[]);

        let added = toggle.toggle(&api).await;
        assert_eq!(added.kind, Kind::Success);
        assert_eq!(added.message, "Property added to favorites!");
        assert!(!added.persistent);
        assert!(toggle.is_favorite());

        let stored = api.favorites(&alice().unwrap()).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].attributes.beds, Some(3));
        assert_eq!(stored[1].attributes.square_feet, Some(1450));

        let removed = toggle.toggle(&api).await;
        assert_eq!(removed.message, "Property removed from favorites!");
        assert!(!toggle.is_favorite());
    }

    #[tokio::test]
    async fn failure_keeps_state() {
        let server = server().await;
        let api = api(&server).await;
        let mut toggle = FavoriteToggle::new(alice(), summary("500"), &[]);

        let notice = toggle.toggle(&api).await;

        assert_eq!(notice.kind, Kind::Failure);
        assert_eq!(
            notice.message,
            "Failed to update favorite. Please try again.",
        );
        assert!(!toggle.is_favorite());
    }

    #[tokio::test]
    async fn requires_signed_in_user() {
        let server = server().await;
        let api = api(&server).await;
        let mut toggle = FavoriteToggle::new(None, summary("100"), &[]);

        let notice = toggle.toggle(&api).await;

        assert_eq!(notice.message, "You must be logged in to add favorites.");
        assert_eq!(server.hits(), 0);
    }
}
