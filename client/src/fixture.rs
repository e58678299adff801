//! Test fixtures: an in-process stub of the server and session tokens.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use axum::{extract::Request, middleware, middleware::Next, Router};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{json, Value};

use crate::{Api, Session, TokenStorage};

/// Stub server listening on a random local port.
pub(crate) struct Server {
    /// Base URL of this [`Server`].
    pub(crate) url: String,

    /// Number of requests received so far.
    hits: Arc<AtomicUsize>,
}

impl Server {
    /// Serves the provided `router`, counting every received request.
    pub(crate) async fn spawn(router: Router) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let router = router.layer(middleware::from_fn(
            move |req: Request, next: Next| {
                let counter = Arc::clone(&counter);
                async move {
                    _ = counter.fetch_add(1, Ordering::SeqCst);
                    next.run(req).await
                }
            },
        ));

        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        }));

        Self {
            url: format!("http://{addr}"),
            hits,
        }
    }

    /// Returns the number of requests received so far.
    pub(crate) fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Creates an [`Api`] of this [`Server`] over the provided `storage`,
    /// restoring the token stored in it.
    pub(crate) async fn api<S: TokenStorage>(&self, storage: S) -> Api<S> {
        let session = Session::restore(storage).await.unwrap();
        Api::new(self.url.parse().unwrap(), Arc::new(session))
    }
}

/// Seconds elapsed since the Unix epoch.
fn now() -> i64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    i64::try_from(elapsed.as_secs()).unwrap()
}

/// Signs a session token of the provided user issued at `iat` and expiring
/// at `exp`.
fn sign(username: &str, iat: i64, exp: i64) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &json!({
            "username": username,
            "isAdmin": false,
            "iat": iat,
            "exp": exp,
        }),
        &EncodingKey::from_secret(b"server-side-secret"),
    )
    .unwrap()
}

/// Issues a session token of the provided user valid for `ttl`.
pub(crate) fn token(username: &str, ttl: Duration) -> String {
    let now = now();
    sign(username, now, now + i64::try_from(ttl.as_secs()).unwrap())
}

/// Issues a session token of the provided user which expired an hour ago.
pub(crate) fn expired_token(username: &str) -> String {
    let now = now();
    sign(username, now - 7200, now - 3600)
}

/// Renders the profile of the provided user the way the server does.
pub(crate) fn user(username: &str) -> Value {
    json!({
        "username": username,
        "firstName": "Alice",
        "lastName": "Smith",
        "email": format!("{username}@example.com"),
        "isAdmin": false,
    })
}

/// Renders a search result page with a single property.
pub(crate) fn page(current: u32, total_pages: u32) -> Value {
    json!({
        "totalResults": total_pages * 12,
        "totalPages": total_pages,
        "properties": [{
            "zpid": format!("{current}00"),
            "address": format!("{current} Main St"),
            "price": 250_000,
            "bedrooms": 3,
            "bathrooms": 2.5,
            "livingArea": 1450.4,
            "imgSrc": "https://example.com/1.jpg",
        }],
        "currentPage": current,
        "resultsPerPage": 12,
    })
}
