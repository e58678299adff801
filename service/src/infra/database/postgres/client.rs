//! Postgres database clients.
//!
//! [`NonTx`] runs every statement on its own, while [`Tx`] runs all of them
//! within a single transaction.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Converts the provided [`connection::PoolError`] into a [`Traced`]
/// [`database::Error`].
fn pool_error(e: connection::PoolError) -> Traced<database::Error> {
    tracerr::map_from(tracerr::new!(postgres::Error::from(e)))
}

/// Non-transactional Postgres database client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take a [`connection::Pooled`] connection from
    /// for every statement.
    pub(crate) pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Takes a [`connection::Pooled`] connection from the pool.
    pub(crate) async fn conn(
        &self,
    ) -> Result<connection::Pooled, Traced<database::Error>> {
        self.pool.get().await.map_err(pool_error)
    }
}

impl Connection for NonTx {
    async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        let conn = self.conn().await.map_err(tracerr::wrap!())?;
        conn.query(sql, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>> {
        let conn = self.conn().await.map_err(tracerr::wrap!())?;
        conn.query_opt(sql, params).await.map_err(tracerr::wrap!())
    }

    async fn exec(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>> {
        let conn = self.conn().await.map_err(tracerr::wrap!())?;
        conn.exec(sql, params).await.map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// The transaction begins with the first statement and lasts until
/// [`Tx::commit()`]. Dropping the client without committing rolls the
/// transaction back.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to take the connection of the transaction from.
    pool: connection::Pool,

    /// Lazily begun [`connection::Transaction`].
    tx: Arc<RwLock<Option<connection::Transaction>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client sharing the pool of the provided [`NonTx`]
    /// one.
    #[must_use]
    pub fn begin(client: &NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            tx: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the [`connection::Transaction`] of this [`Tx`] client,
    /// beginning it if necessary.
    async fn transaction(
        &self,
    ) -> Result<
        RwLockReadGuard<'_, connection::Transaction>,
        Traced<database::Error>,
    > {
        let current = self.tx.read().await;
        match RwLockReadGuard::try_map(current, Option::as_ref) {
            Ok(tx) => return Ok(tx),
            Err(none) => drop(none),
        }

        let mut slot = self.tx.write().await;
        if slot.is_none() {
            let conn = self.pool.get().await.map_err(pool_error)?;
            *slot = Some(
                connection::Transaction::begin(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        RwLockReadGuard::try_map(slot.downgrade(), Option::as_ref)
            .map_err(|_| tracerr::new!(database::Error::Finished))
    }

    /// Commits the transaction of this [`Tx`] client, if it has begun.
    ///
    /// The next statement begins a new transaction.
    ///
    /// # Errors
    ///
    /// If the commit fails.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let tx = self.tx.write().await.take();
        match tx {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

impl Connection for Tx {
    async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        let tx = self.transaction().await.map_err(tracerr::wrap!())?;
        tx.query(sql, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>> {
        let tx = self.transaction().await.map_err(tracerr::wrap!())?;
        tx.query_opt(sql, params).await.map_err(tracerr::wrap!())
    }

    async fn exec(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>> {
        let tx = self.transaction().await.map_err(tracerr::wrap!())?;
        tx.exec(sql, params).await.map_err(tracerr::wrap!())
    }
}
