//! [`Connection`] definitions.

use std::{fmt, future::Future};

use deadpool_postgres::GenericClient;
use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, Row};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as Pooled, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Database connection running SQL statements.
pub trait Connection {
    /// Runs the provided `sql` query returning all the resulting [`Row`]s.
    ///
    /// # Errors
    ///
    /// If the query fails.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>;

    /// Runs the provided `sql` query returning at most one [`Row`].
    ///
    /// # Errors
    ///
    /// If the query fails or returns more than one [`Row`].
    fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>;

    /// Executes the provided `sql` statement returning the number of affected
    /// rows.
    ///
    /// # Errors
    ///
    /// If the statement fails.
    fn exec(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>;
}

/// Converts the provided [`Error`] into a [`Traced`] [`database::Error`].
pub(crate) fn traced(e: Error) -> Traced<database::Error> {
    tracerr::map_from(tracerr::new!(postgres::Error::from(e)))
}

/// Transaction running in a [`Pooled`] connection it owns.
#[self_referencing]
pub struct Transaction {
    /// [`Pooled`] connection the transaction runs in.
    conn: Pooled,

    /// Transaction itself, until it's committed.
    #[borrows(mut conn)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("open", &self.open().is_some())
            .finish_non_exhaustive()
    }
}

impl Transaction {
    /// Begins a new [`Transaction`] in the provided [`Pooled`] connection.
    ///
    /// # Errors
    ///
    /// If the transaction cannot be started.
    pub async fn begin(
        conn: Pooled,
    ) -> Result<Self, Traced<database::Error>> {
        Self::try_new_async_send(conn, |c| c.transaction().map_ok(Some).boxed())
            .await
            .map_err(traced)
    }

    /// Returns the underlying transaction, unless it's finished.
    #[expect(
        clippy::redundant_closure_for_method_calls,
        reason = "different variance, see \
                  https://doc.rust-lang.org/nomicon/subtyping.html#variance"
    )]
    fn open(&self) -> Option<&deadpool_postgres::Transaction<'_>> {
        self.with_tx(|tx| tx.as_ref())
    }

    /// Returns the underlying transaction, or an error if it's finished.
    fn running(
        &self,
    ) -> Result<&deadpool_postgres::Transaction<'_>, Traced<database::Error>>
    {
        self.open()
            .ok_or_else(|| tracerr::new!(database::Error::Finished))
    }

    /// Commits this [`Transaction`].
    ///
    /// # Errors
    ///
    /// If the commit fails.
    #[expect(
        clippy::redundant_closure_for_method_calls,
        reason = "different variance"
    )]
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        let tx = self.with_tx_mut(|tx| tx.take());
        match tx {
            Some(tx) => tx.commit().await.map_err(traced),
            None => Ok(()),
        }
    }
}

impl Connection for Pooled {
    async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        GenericClient::query(self, sql, params)
            .await
            .map_err(traced)
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>> {
        GenericClient::query_opt(self, sql, params)
            .await
            .map_err(traced)
    }

    async fn exec(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>> {
        GenericClient::execute(self, sql, params)
            .await
            .map_err(traced)
    }
}

impl Connection for Transaction {
    async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        GenericClient::query(self.running()?, sql, params)
            .await
            .map_err(traced)
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>> {
        GenericClient::query_opt(self.running()?, sql, params)
            .await
            .map_err(traced)
    }

    async fn exec(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>> {
        GenericClient::execute(self.running()?, sql, params)
            .await
            .map_err(traced)
    }
}

#[cfg(test)]
mod spec {
    use super::{Connection, Pooled, Transaction};
    use crate::infra::database::postgres::{NonTx, Tx};

    fn runs_statements<C: Connection>() {}

    #[test]
    fn every_client_runs_statements() {
        runs_statements::<Pooled>();
        runs_statements::<Transaction>();
        runs_statements::<NonTx>();
        runs_statements::<Tx>();
    }
}
