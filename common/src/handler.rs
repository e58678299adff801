//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Every layer of the application speaks through this single trait: commands
/// and queries of the service, operations of a database, and requests to the
/// upstream property provider are all `Handler`s parametrized with the
/// operation they accept.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes the provided `args` operation with this [`Handler`].
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
