//! [`Command`] for creating a new [`User`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password, Username};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Username`] of a new [`User`].
    pub username: user::Username,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// First [`Name`] of a new [`User`].
    pub first_name: user::Name,

    /// Last [`Name`] of a new [`User`].
    pub last_name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,
}

impl<Db, Up> Command<CreateUser> for Service<Db, Up>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<User>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            username,
            password,
            first_name,
            last_name,
            email,
        } = cmd;

        let user = User {
            username,
            password_hash: user::PasswordHash::new(password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?,
            first_name,
            last_name,
            email,
            is_admin: false,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let inserted = tx
            .execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !inserted {
            return Err(tracerr::new!(E::UsernameOccupied(user.username)));
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Password`] hashing error.
    #[display("Failed to hash `Password`: {_0}")]
    Hashing(user::HashingError),

    /// [`Username`] is already occupied.
    #[display("`{_0}` username is occupied")]
    #[from(ignore)]
    UsernameOccupied(#[error(not(source))] user::Username),
}
