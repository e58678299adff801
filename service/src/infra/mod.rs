//! Infrastructure layer.

pub mod database;
pub mod upstream;

pub use self::{database::Database, upstream::Upstream};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
