//! [`Query`] collection related to multiple [`Favorite`]s.

use common::operations::By;

use crate::domain::{user, Favorite};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries all the [`Favorite`]s of a [`User`], in the order they were added.
pub type ByOwner = DatabaseQuery<By<Vec<Favorite>, user::Username>>;
