//! Postgres [`Database`] implementation.

pub mod client;
pub mod connection;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

pub use deadpool_postgres::Config;

/// [`Database`] backed by a pool of Postgres connections.
///
/// `T` is either [`NonTx`], running each statement on its own pooled
/// connection, or [`Tx`], running them in a single transaction.
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a connection pool out of the provided [`Config`].
    ///
    /// Connections are established lazily, so an unreachable server is only
    /// reported by the first statement.
    ///
    /// # Errors
    ///
    /// If the [`Config`] is invalid.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement failed or the connection broke.
    #[display("Statement failed: {_0}")]
    Connection(connection::Error),

    /// [`Config`] doesn't describe a valid pool.
    #[display("Invalid pool configuration: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// No pooled connection could be obtained.
    #[display("Failed to get a pooled connection: {_0}")]
    PoolError(connection::PoolError),
}
