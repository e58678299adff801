//! Property listing definitions.
//!
//! Properties are never stored, they're fetched from the upstream provider on
//! every request and normalized into [`Summary`] and [`Details`].

use std::fmt;

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

/// ID of a property on the upstream provider (its `zpid`).
///
/// The provider reports it either as a number or as a string, so both forms
/// are accepted and normalized into a string.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(String);

impl Id {
    /// Creates a new [`Id`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`Id`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        !id.is_empty()
            && id.len() <= 64
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl std::str::FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid property `Id`")
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a property ID as a string or a number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Id, E> {
                Id::new(v).ok_or_else(|| E::custom("invalid property `Id`"))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Id, E> {
                Ok(Id(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Id, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom("negative property `Id`"))
                    .and_then(|v| self.visit_u64(v))
            }
        }

        d.deserialize_any(Visitor)
    }
}

/// Location to search properties in: a city, a ZIP code or an address.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        let trimmed = location.trim();
        (!trimmed.is_empty() && trimmed.len() <= 255)
            .then(|| Self(trimmed.to_owned()))
    }
}

/// Short description of a property, as listed in search results.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// [`Id`] of the property.
    pub zpid: Id,

    /// Full address in a single line.
    pub address: Option<String>,

    /// Listed price.
    pub price: Option<Decimal>,

    /// Number of bedrooms.
    pub bedrooms: Option<i32>,

    /// Number of bathrooms.
    pub bathrooms: Option<Decimal>,

    /// Living area in square feet.
    pub living_area: Option<Decimal>,

    /// URL of the main image.
    pub img_src: Option<String>,

    /// Kind of the property (`SINGLE_FAMILY`, `TOWNHOUSE`, etc).
    pub property_type: Option<String>,

    /// Status of the listing.
    pub listing_status: Option<String>,

    /// Additional photos of the property.
    #[serde(default, deserialize_with = "null_as_default")]
    pub carousel_photos: Vec<Photo>,

    /// Path of the listing on the provider's website.
    pub detail_url: Option<String>,

    /// Provider's estimation of the market value.
    pub zestimate: Option<Decimal>,
}

/// Photo of a property.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Photo {
    /// URL of the photo.
    pub url: String,
}

/// Full description of a single property.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    /// [`Id`] of the property.
    pub zpid: Id,

    /// [`Address`] of the property.
    pub address: Option<Address>,

    /// Free-form description given by the seller.
    pub description: Option<String>,

    /// Listed price.
    pub price: Option<Decimal>,

    /// Number of bedrooms.
    pub bedrooms: Option<i32>,

    /// Number of bathrooms.
    pub bathrooms: Option<Decimal>,

    /// Living area in square feet.
    pub living_area: Option<Decimal>,

    /// Year the property was built.
    pub year_built: Option<i32>,

    /// Kind of the property.
    pub home_type: Option<String>,

    /// Status of the listing.
    pub home_status: Option<String>,

    /// Provider's estimation of the market value.
    pub zestimate: Option<Decimal>,

    /// Provider's estimation of the monthly rent.
    pub rent_zestimate: Option<Decimal>,

    /// Human-readable date of when the listing was posted.
    pub date_posted_string: Option<String>,

    /// URL of the main image.
    pub img_src: Option<String>,

    /// Latitude of the property.
    pub latitude: Option<f64>,

    /// Longitude of the property.
    pub longitude: Option<f64>,

    /// [`School`]s nearby.
    #[serde(default, deserialize_with = "null_as_default")]
    pub schools: Vec<School>,
}

/// Postal address of a property.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street and house number.
    pub street_address: Option<String>,

    /// City.
    pub city: Option<String>,

    /// State code.
    pub state: Option<String>,

    /// ZIP code.
    pub zipcode: Option<String>,
}

/// School near a property.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct School {
    /// Name of the school.
    pub name: Option<String>,

    /// Rating of the school on a 1 to 10 scale.
    pub rating: Option<i32>,

    /// Grade levels served.
    pub level: Option<String>,

    /// Distance to the school in miles.
    pub distance: Option<f64>,
}

/// Single page of search results as served by the upstream provider.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Properties on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub props: Vec<Summary>,

    /// Total number of properties matching the search.
    #[serde(default)]
    pub total_result_count: u32,
}

/// Deserializes `null` as the [`Default`] value.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use super::{Details, Id, Listing, Location};

    #[test]
    fn trims_location() {
        assert_eq!(
            Location::new("  Austin, TX ").unwrap().to_string(),
            "Austin, TX",
        );
        assert!(Location::new("   ").is_none());
    }

    #[test]
    fn id_from_string_or_number() {
        let from_str: Id = serde_json::from_value(json!("2077")).unwrap();
        let from_num: Id = serde_json::from_value(json!(2077)).unwrap();

        assert_eq!(from_str, from_num);
        assert_eq!(serde_json::to_value(&from_num).unwrap(), json!("2077"));
    }

    #[test]
    fn rejects_empty_id() {
        assert!(serde_json::from_value::<Id>(json!("")).is_err());
        assert!(Id::new("").is_none());
    }

    #[test]
    fn normalizes_listing() {
        let listing: Listing = serde_json::from_value(json!({
            "props": [{
                "zpid": "123",
                "address": "1 Main St, Springfield, IL 62701",
                "price": 250_000,
                "bedrooms": 3,
                "bathrooms": 2.5,
                "livingArea": 1800,
                "imgSrc": "https://example.com/1.jpg",
                "propertyType": "SINGLE_FAMILY",
                "carouselPhotos": null,
                "unknownField": true,
            }],
            "totalResultCount": 25,
        }))
        .unwrap();

        assert_eq!(listing.total_result_count, 25);
        assert_eq!(listing.props.len(), 1);
        assert_eq!(listing.props[0].zpid.to_string(), "123");
        assert!(listing.props[0].carousel_photos.is_empty());
        assert_eq!(listing.props[0].listing_status, None);
    }

    #[test]
    fn rejects_malformed_details() {
        let res = serde_json::from_value::<Details>(json!({
            "zpid": 1,
            "price": "a lot",
        }));

        assert!(res.is_err());
    }
}
