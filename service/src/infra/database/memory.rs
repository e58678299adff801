//! In-memory [`Database`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{property, user, Favorite, User},
    infra::{database, Database},
};

/// In-memory [`Database`].
///
/// Transactions are not isolated: [`Transact`] returns a handle to the same
/// storage and [`Commit`] does nothing.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<RwLock<State>>);

/// Stored data of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`User`]s.
    users: HashMap<user::Username, User>,

    /// Stored [`Favorite`]s in insertion order.
    favorites: Vec<Favorite>,
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Username>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.users.get(by.inner()).cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if state.users.contains_key(&user.username) {
            return Ok(false);
        }
        drop(state.users.insert(user.username.clone(), user));
        Ok(true)
    }
}

impl Database<Update<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.0
                .write()
                .await
                .users
                .insert(user.username.clone(), user),
        );
        Ok(())
    }
}

impl Database<Lock<By<User, user::Username>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Vec<Favorite>, user::Username>>> for Memory {
    type Ok = Vec<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Favorite>, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .favorites
            .iter()
            .filter(|f| f.owner == owner)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Option<Favorite>, (user::Username, property::Id)>>>
    for Memory
{
    type Ok = Option<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<Favorite>, (user::Username, property::Id)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (owner, property_id) = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .favorites
            .iter()
            .find(|f| f.owner == owner && f.property_id == property_id)
            .cloned())
    }
}

impl Database<Insert<Favorite>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(favorite): Insert<Favorite>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.write().await;
        if state.favorites.iter().any(|f| {
            f.owner == favorite.owner && f.property_id == favorite.property_id
        }) {
            return Ok(false);
        }
        state.favorites.push(favorite);
        Ok(true)
    }
}

impl Database<Delete<By<Option<Favorite>, (user::Username, property::Id)>>>
    for Memory
{
    type Ok = Option<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<
            By<Option<Favorite>, (user::Username, property::Id)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (owner, property_id) = by.into_inner();
        let mut state = self.0.write().await;
        Ok(state
            .favorites
            .iter()
            .position(|f| f.owner == owner && f.property_id == property_id)
            .map(|idx| state.favorites.remove(idx)))
    }
}
