//! [`Favorite`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::{property, user};

/// Property saved by a [`User`] to come back to later.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Favorite {
    /// [`user::Username`] of the [`User`] owning this [`Favorite`].
    pub owner: user::Username,

    /// ID of the favorite property.
    pub property_id: property::Id,

    /// [`Attributes`] of the property captured when it was favorited.
    pub attributes: Attributes,

    /// [`DateTime`] when this [`Favorite`] was created.
    pub created_at: CreationDateTime,
}

/// Snapshot of a property listing kept along with a [`Favorite`], so the
/// favorites list renders without querying the upstream provider.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Attributes {
    /// Street address of the property.
    pub address: Option<String>,

    /// Listed price of the property.
    pub price: Option<Decimal>,

    /// URL of the main image of the property.
    pub image_url: Option<String>,

    /// Number of bedrooms.
    pub beds: Option<i32>,

    /// Number of bathrooms.
    pub baths: Option<Decimal>,

    /// Living area in square feet.
    pub square_feet: Option<i32>,
}

/// [`DateTime`] when a [`Favorite`] was created.
pub type CreationDateTime = DateTimeOf<(Favorite, unit::Creation)>;
