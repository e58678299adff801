//! [`Upstream`] property provider implementations.

pub mod replica;
pub mod zillow;

use common::operations::{By, Select};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

use crate::domain::property;

pub use self::{replica::Replica, zillow::Zillow};

/// Operation of the upstream property provider.
pub use common::Handler as Upstream;

/// Number of properties the upstream provider serves on a single page.
pub const PAGE_SIZE: usize = 41;

/// Selector of a single upstream [`property::Listing`] page.
#[derive(Clone, Debug)]
pub struct ListingPage {
    /// [`property::Location`] to search properties in.
    pub location: property::Location,

    /// Number of the upstream page, starting from `1`.
    pub number: u32,
}

/// [`Upstream`] error.
///
/// Any of these means no data is returned to the caller at all.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Request didn't complete: transport failure, timeout or a non-success
    /// HTTP status.
    #[display("Upstream request failed: {_0}")]
    Request(reqwest::Error),

    /// Response doesn't match the expected schema.
    #[display("Malformed upstream response: {_0}")]
    Malformed(serde_json::Error),

    /// Saved response cannot be read.
    #[display("Failed to read a saved upstream response: {_0}")]
    Io(std::io::Error),
}

/// [`Upstream`] provider chosen at runtime.
#[derive(Clone, Debug, From)]
pub enum Gateway {
    /// Live [`Zillow`] API.
    Zillow(Zillow),

    /// Saved [`Replica`] of the [`Zillow`] API responses.
    Replica(Replica),
}

impl Upstream<Select<By<property::Listing, ListingPage>>> for Gateway {
    type Ok = property::Listing;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        op: Select<By<property::Listing, ListingPage>>,
    ) -> Result<Self::Ok, Self::Err> {
        match self {
            Self::Zillow(z) => z.execute(op).await,
            Self::Replica(r) => r.execute(op).await,
        }
        .map_err(tracerr::wrap!())
    }
}

impl Upstream<Select<By<Option<property::Details>, property::Id>>>
    for Gateway
{
    type Ok = Option<property::Details>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        op: Select<By<Option<property::Details>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        match self {
            Self::Zillow(z) => z.execute(op).await,
            Self::Replica(r) => r.execute(op).await,
        }
        .map_err(tracerr::wrap!())
    }
}

/// Parses the provided upstream property details `payload`.
///
/// An empty JSON object is how the provider reports an unknown property, so
/// it's [`None`].
fn parse_details(
    payload: serde_json::Value,
) -> Result<Option<property::Details>, Traced<Error>> {
    if payload.as_object().is_some_and(serde_json::Map::is_empty) {
        return Ok(None);
    }
    serde_json::from_value(payload)
        .map(Some)
        .map_err(tracerr::from_and_wrap!(=> Error))
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use super::{parse_details, Error};

    #[test]
    fn empty_object_is_no_property() {
        assert_eq!(parse_details(json!({})).unwrap(), None);
    }

    #[test]
    fn parses_details() {
        let details = parse_details(json!({
            "zpid": 42,
            "address": {"streetAddress": "1 Main St", "city": "Austin"},
            "price": 300_000,
            "yearBuilt": 1999,
        }))
        .unwrap()
        .unwrap();

        assert_eq!(details.zpid.to_string(), "42");
        assert_eq!(details.year_built, Some(1999));
    }

    #[test]
    fn malformed_details_fail() {
        let err = parse_details(json!([1, 2, 3])).unwrap_err();

        assert!(matches!(err.as_ref(), Error::Malformed(_)));
    }
}
