//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds a [`User`] out of the provided [`Row`].
fn from_row(row: &Row) -> User {
    User {
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        is_admin: row.get("is_admin"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Username>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();

        const SQL: &str = "\
            SELECT username, password_hash, \
                   first_name, last_name, \
                   email, is_admin, \
                   created_at \
            FROM users \
            WHERE username = $1::VARCHAR \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&username])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
{
    /// Indicator whether the [`User`] has been inserted, being `false` when
    /// its [`user::Username`] is occupied already.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            username,
            password_hash,
            first_name,
            last_name,
            email,
            is_admin,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                username, password_hash, \
                first_name, last_name, \
                email, is_admin, \
                created_at\
            ) \
            VALUES (\
                $1::VARCHAR, $2::VARCHAR, \
                $3::VARCHAR, $4::VARCHAR, \
                $5::VARCHAR, $6::BOOLEAN, \
                $7::TIMESTAMPTZ\
            ) \
            ON CONFLICT (username) DO NOTHING";
        self.exec(
            SQL,
            &[
                &username,
                &password_hash,
                &first_name,
                &last_name,
                &email,
                &is_admin,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|inserted| inserted > 0)
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            username,
            password_hash,
            first_name,
            last_name,
            email,
            is_admin,
            created_at: _,
        } = user;

        const SQL: &str = "\
            UPDATE users \
            SET password_hash = $2::VARCHAR, \
                first_name = $3::VARCHAR, \
                last_name = $4::VARCHAR, \
                email = $5::VARCHAR, \
                is_admin = $6::BOOLEAN \
            WHERE username = $1::VARCHAR";
        self.exec(
            SQL,
            &[
                &username,
                &password_hash,
                &first_name,
                &last_name,
                &email,
                &is_admin,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<User, user::Username>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<User, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();

        const SQL: &str = "\
            SELECT 1 \
            FROM users \
            WHERE username = $1::VARCHAR \
            FOR UPDATE";
        self.query(SQL, &[&username])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
