//! [`Favorite`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{favorite, property, user, Favorite},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds a [`Favorite`] out of the provided [`Row`].
fn from_row(row: &Row) -> Favorite {
    Favorite {
        owner: row.get("user_id"),
        property_id: row.get("property_id"),
        attributes: favorite::Attributes {
            address: row.get("address"),
            price: row.get("price"),
            image_url: row.get("image_url"),
            beds: row.get("beds"),
            baths: row.get("baths"),
            square_feet: row.get("square_feet"),
        },
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Vec<Favorite>, user::Username>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Favorite>, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();

        const SQL: &str = "\
            SELECT user_id, property_id, \
                   address, price, image_url, \
                   beds, baths, square_feet, \
                   created_at \
            FROM favorites \
            WHERE user_id = $1::VARCHAR \
            ORDER BY id";
        Ok(self
            .query(SQL, &[&owner])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Option<Favorite>, (user::Username, property::Id)>>>
    for Postgres<C>
where
    C: Connection,
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

        const SQL: &str = "\
            SELECT user_id, property_id, \
                   address, price, image_url, \
                   beds, baths, square_feet, \
                   created_at \
            FROM favorites \
            WHERE user_id = $1::VARCHAR \
              AND property_id = $2::VARCHAR \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&owner, &property_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Favorite>> for Postgres<C>
where
    C: Connection,
{
    /// Indicator whether the [`Favorite`] has been inserted, being `false`
    /// when it exists already.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(favorite): Insert<Favorite>,
    ) -> Result<Self::Ok, Self::Err> {
        let Favorite {
            owner,
            property_id,
            attributes:
                favorite::Attributes {
                    address,
                    price,
                    image_url,
                    beds,
                    baths,
                    square_feet,
                },
            created_at,
        } = favorite;

        const SQL: &str = "\
            INSERT INTO favorites (\
                user_id, property_id, \
                address, price, image_url, \
                beds, baths, square_feet, \
                created_at\
            ) \
            VALUES (\
                $1::VARCHAR, $2::VARCHAR, \
                $3::VARCHAR, $4::NUMERIC, $5::VARCHAR, \
                $6::INT4, $7::NUMERIC, $8::INT4, \
                $9::TIMESTAMPTZ\
            ) \
            ON CONFLICT (user_id, property_id) DO NOTHING";
        self.exec(
            SQL,
            &[
                &owner,
                &property_id,
                &address,
                &price,
                &image_url,
                &beds,
                &baths,
                &square_feet,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|inserted| inserted > 0)
    }
}

impl<C> Database<Delete<By<Option<Favorite>, (user::Username, property::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    /// Deleted [`Favorite`], if it existed.
    type Ok = Option<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<
            By<Option<Favorite>, (user::Username, property::Id)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (owner, property_id) = by.into_inner();

        const SQL: &str = "\
            DELETE FROM favorites \
            WHERE user_id = $1::VARCHAR \
              AND property_id = $2::VARCHAR \
            RETURNING user_id, property_id, \
                      address, price, image_url, \
                      beds, baths, square_feet, \
                      created_at";
        Ok(self
            .query_opt(SQL, &[&owner, &property_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}
