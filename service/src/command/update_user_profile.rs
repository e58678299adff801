//! [`Command`] for updating a profile of a [`User`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password, Username};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a profile of a [`User`].
///
/// Only the provided fields are changed.
#[derive(Debug)]
pub struct UpdateUserProfile {
    /// [`Username`] of the [`User`] whose profile should be updated.
    pub username: user::Username,

    /// New first [`Name`] of the [`User`].
    pub first_name: Option<user::Name>,

    /// New last [`Name`] of the [`User`].
    pub last_name: Option<user::Name>,

    /// New [`Email`] of the [`User`].
    pub email: Option<user::Email>,

    /// New [`Password`] of the [`User`].
    pub password: Option<SecretBox<user::Password>>,
}

impl<Db, Up> Command<UpdateUserProfile> for Service<Db, Up>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Username>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateUserProfile,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserProfile {
            username,
            first_name,
            last_name,
            email,
            password,
        } = cmd;

        let password_hash = password
            .map(|p| user::PasswordHash::new(p.expose_secret()))
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(username.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(username.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(username))
            .map_err(tracerr::wrap!())?;

        if first_name.is_none()
            && last_name.is_none()
            && email.is_none()
            && password_hash.is_none()
        {
            return Ok(user);
        }

        if let Some(name) = first_name {
            user.first_name = name;
        }
        if let Some(name) = last_name {
            user.last_name = name;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }

        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`UpdateUserProfile`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Password`] hashing error.
    #[display("Failed to hash `Password`: {_0}")]
    Hashing(user::HashingError),

    /// [`User`] doesn't exist.
    #[display("`User(username: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Username),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{Command as _, UpdateUserProfile},
        fixture,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn updates_only_provided_fields() {
        let svc = fixture::service();
        let user = svc
            .execute(fixture::create_user("alice", "pw123"))
            .await
            .unwrap();

        let updated = svc
            .execute(UpdateUserProfile {
                username: user.username.clone(),
                first_name: Some("Alicia".parse().unwrap()),
                last_name: None,
                email: None,
                password: Some(SecretBox::new(Box::new(
                    "new-pw".parse().unwrap(),
                ))),
            })
            .await
            .unwrap();

        assert_eq!(updated.first_name.to_string(), "Alicia");
        assert_eq!(updated.last_name, user.last_name);
        assert_eq!(updated.email, user.email);
        assert!(updated.password_hash.verify(&"new-pw".parse().unwrap()));
        assert!(!updated.password_hash.verify(&"pw123".parse().unwrap()));
    }

    #[tokio::test]
    async fn fails_for_unknown_user() {
        let svc = fixture::service();

        let err = svc
            .execute(UpdateUserProfile {
                username: "ghost".parse().unwrap(),
                first_name: None,
                last_name: None,
                email: None,
                password: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }
}
