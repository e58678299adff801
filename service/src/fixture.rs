//! Shared fixtures of [`Service`] tests.

use secrecy::SecretBox;
use serde_json::json;

use crate::{
    command::CreateUser,
    infra::{database::Memory, upstream::Replica},
    Config,
};

/// [`crate::Service`] backed by in-memory storage and a saved upstream.
pub(crate) type Service = crate::Service<Memory, Replica>;

/// Creates a new empty [`Service`] whose upstream has nothing saved.
pub(crate) fn service() -> Service {
    Service::new(
        Config::new(b"secret", Config::DEFAULT_SESSION_TTL),
        Memory::default(),
        Replica::new("/nonexistent/replica"),
    )
}

/// Creates a new empty [`Service`] whose upstream serves `count` properties
/// with sequential IDs starting from `1`.
///
/// Returned directory must outlive the [`Service`].
pub(crate) fn service_with_replica(
    count: usize,
) -> (tempfile::TempDir, Service) {
    replica_service(count, Some(count))
}

/// Same as [`service_with_replica()`], but the saved search response lacks
/// the `totalResultCount`, as the provider does for small result sets.
pub(crate) fn service_with_uncounted_replica(
    count: usize,
) -> (tempfile::TempDir, Service) {
    replica_service(count, None)
}

/// Creates a new [`Service`] whose upstream serves `count` properties and
/// reports the provided `total`.
fn replica_service(
    count: usize,
    total: Option<usize>,
) -> (tempfile::TempDir, Service) {
    let dir = tempfile::tempdir().unwrap();
    let mut search = json!({
        "props": (1..=count)
            .map(|n| json!({"zpid": n.to_string(), "price": 100_000 + n}))
            .collect::<Vec<_>>(),
    });
    if let Some(total) = total {
        search["totalResultCount"] = json!(total);
    }
    std::fs::write(
        dir.path().join(Replica::SEARCH_FILE),
        serde_json::to_vec(&search).unwrap(),
    )
    .unwrap();
    std::fs::write(dir.path().join(Replica::PROPERTY_FILE), b"[]").unwrap();

    let svc = Service::new(
        Config::new(b"secret", Config::DEFAULT_SESSION_TTL),
        Memory::default(),
        Replica::new(dir.path()),
    );
    (dir, svc)
}

/// Creates a new [`CreateUser`] command with the provided credentials.
pub(crate) fn create_user(username: &str, password: &str) -> CreateUser {
    CreateUser {
        username: username.parse().unwrap(),
        password: SecretBox::new(Box::new(password.parse().unwrap())),
        first_name: "Alice".parse().unwrap(),
        last_name: "Smith".parse().unwrap(),
        email: format!("{username}@example.com").parse().unwrap(),
    }
}
