//! [`Database`]-related implementations.

#[cfg(any(test, feature = "memory"))]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(any(test, feature = "memory"))]
pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Statement was issued to an already finished transaction.
    #[display("Transaction is already finished")]
    #[from(ignore)]
    Finished,

    /// [`Postgres`] error.
    #[cfg(feature = "postgres")]
    #[display("Postgres error: {_0}")]
    Postgres(postgres::Error),
}
