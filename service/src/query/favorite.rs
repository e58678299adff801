//! [`Query`] collection related to a single [`Favorite`].

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{property, user, Favorite},
    infra::{database, Database},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries a [`Favorite`] by its owner and property ID.
pub type ByKey =
    DatabaseQuery<By<Option<Favorite>, (user::Username, property::Id)>>;

/// [`Query`] checking whether a property is a [`Favorite`] of a [`User`].
#[derive(Clone, Debug)]
pub struct Exists {
    /// [`user::Username`] of the [`User`] owning the [`Favorite`].
    pub owner: user::Username,

    /// ID of the property.
    pub property_id: property::Id,
}

impl<Db, Up> Query<Exists> for Service<Db, Up>
where
    Db: Database<
        Select<By<Option<Favorite>, (user::Username, property::Id)>>,
        Ok = Option<Favorite>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(&self, query: Exists) -> Result<Self::Ok, Self::Err> {
        let Exists { owner, property_id } = query;

        self.database()
            .execute(Select(By::new((owner, property_id))))
            .await
            .map(|f| f.is_some())
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{AddFavorite, Command as _},
        domain::favorite,
        fixture,
        query::favorite::{ByKey, Exists},
    };

    #[tokio::test]
    async fn checks_existence() {
        let svc = fixture::service();
        let alice = svc
            .execute(fixture::create_user("alice", "pw123"))
            .await
            .unwrap()
            .username;
        _ = svc
            .execute(AddFavorite {
                owner: alice.clone(),
                property_id: "101".parse().unwrap(),
                attributes: favorite::Attributes {
                    beds: Some(3),
                    ..favorite::Attributes::default()
                },
            })
            .await
            .unwrap();

        let added = Exists {
            owner: alice.clone(),
            property_id: "101".parse().unwrap(),
        };
        let other = Exists {
            owner: alice.clone(),
            property_id: "202".parse().unwrap(),
        };

        assert!(svc.execute(added).await.unwrap());
        assert!(!svc.execute(other).await.unwrap());

        let found = svc
            .execute(ByKey::by((alice, "101".parse().unwrap())))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.attributes.beds, Some(3));
    }
}
