//! [`Command`] for adding a [`Favorite`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Username;
use crate::{
    domain::{favorite, property, user, Favorite, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a property to the [`Favorite`]s of a [`User`].
#[derive(Clone, Debug)]
pub struct AddFavorite {
    /// [`Username`] of the [`User`] owning the [`Favorite`].
    pub owner: user::Username,

    /// ID of the property to add.
    pub property_id: property::Id,

    /// [`favorite::Attributes`] of the property.
    pub attributes: favorite::Attributes,
}

impl<Db, Up> Command<AddFavorite> for Service<Db, Up>
where
    Db: Database<
            Select<By<Option<User>, user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<Favorite>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Favorite;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddFavorite) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddFavorite {
            owner,
            property_id,
            attributes,
        } = cmd;

        if self
            .database()
            .execute(Select(By::<Option<User>, _>::new(owner.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .is_none()
        {
            return Err(tracerr::new!(E::OwnerNotExists(owner)));
        }

        let favorite = Favorite {
            owner,
            property_id,
            attributes,
            created_at: DateTime::now().coerce(),
        };

        // Uniqueness is enforced by the insertion itself, so concurrent
        // duplicates can't both succeed.
        let inserted = self
            .database()
            .execute(Insert(favorite.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !inserted {
            return Err(tracerr::new!(E::AlreadyExists(favorite.property_id)));
        }

        tracing::debug!(
            owner = %favorite.owner,
            property_id = %favorite.property_id,
            "added a favorite",
        );

        Ok(favorite)
    }
}

/// Error of [`AddFavorite`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] owning the [`Favorite`] doesn't exist.
    #[display("`User(username: {_0})` does not exist")]
    #[from(ignore)]
    OwnerNotExists(#[error(not(source))] user::Username),

    /// Property is a [`Favorite`] of the [`User`] already.
    #[display("Property `{_0}` is already in favorites")]
    #[from(ignore)]
    AlreadyExists(#[error(not(source))] property::Id),
}
