//! [`Command`] for removing a [`Favorite`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{user::Username, User};
use crate::{
    domain::{property, user, Favorite},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing a property from the [`Favorite`]s of a [`User`].
#[derive(Clone, Debug)]
pub struct RemoveFavorite {
    /// [`Username`] of the [`User`] owning the [`Favorite`].
    pub owner: user::Username,

    /// ID of the property to remove.
    pub property_id: property::Id,
}

impl<Db, Up> Command<RemoveFavorite> for Service<Db, Up>
where
    Db: Database<
        Delete<By<Option<Favorite>, (user::Username, property::Id)>>,
        Ok = Option<Favorite>,
        Err = Traced<database::Error>,
    >,
{
    /// Removed [`Favorite`].
    type Ok = Favorite;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RemoveFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RemoveFavorite { owner, property_id } = cmd;

        self.database()
            .execute(Delete(By::new((owner, property_id.clone()))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotExists(property_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`RemoveFavorite`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Property is not a [`Favorite`] of the [`User`].
    #[display("Property `{_0}` is not in favorites")]
    #[from(ignore)]
    NotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{AddFavorite, Command as _, RemoveFavorite},
        domain::favorite,
        fixture, query,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn add_list_remove_scenario() {
        let svc = fixture::service();
        let alice = svc
            .execute(fixture::create_user("alice", "pw123"))
            .await
            .unwrap()
            .username;

        _ = svc
            .execute(AddFavorite {
                owner: alice.clone(),
                property_id: "zpid123".parse().unwrap(),
                attributes: favorite::Attributes::default(),
            })
            .await
            .unwrap();
        let listed = svc
            .execute(query::favorites::ByOwner::by(alice.clone()))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].property_id.to_string(), "zpid123");

        let removed = svc
            .execute(RemoveFavorite {
                owner: alice.clone(),
                property_id: "zpid123".parse().unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(removed.property_id.to_string(), "zpid123");

        let listed = svc
            .execute(query::favorites::ByOwner::by(alice))
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn removing_missing_favorite_fails() {
        let svc = fixture::service();
        let alice = svc
            .execute(fixture::create_user("alice", "pw123"))
            .await
            .unwrap()
            .username;
        _ = svc
            .execute(AddFavorite {
                owner: alice.clone(),
                property_id: "kept".parse().unwrap(),
                attributes: favorite::Attributes::default(),
            })
            .await
            .unwrap();

        let err = svc
            .execute(RemoveFavorite {
                owner: alice.clone(),
                property_id: "never-added".parse().unwrap(),
            })
            .await
            .unwrap_err();
        let listed = svc
            .execute(query::favorites::ByOwner::by(alice))
            .await
            .unwrap();

        assert!(matches!(err.as_ref(), ExecutionError::NotExists(_)));
        assert_eq!(listed.len(), 1);
    }
}
