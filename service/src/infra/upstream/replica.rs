//! [`Upstream`] implementation replaying saved provider responses.

use std::path::PathBuf;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::domain::property;

use super::{parse_details, Error, ListingPage, Upstream, PAGE_SIZE};

/// Offline replica of the upstream provider, serving responses saved into a
/// directory:
/// - `search.json` holds a single search response with all the properties,
///   served page by page regardless of the searched location, each page
///   reporting the saved `totalResultCount` (if any);
/// - `property.json` holds an array of property details.
///
/// Files are re-read on every request.
#[derive(Clone, Debug)]
pub struct Replica {
    /// Directory with the saved responses.
    dir: PathBuf,
}

impl Replica {
    /// Name of the file holding the saved search response.
    pub const SEARCH_FILE: &str = "search.json";

    /// Name of the file holding the saved property details.
    pub const PROPERTY_FILE: &str = "property.json";

    /// Creates a new [`Replica`] serving responses from the provided `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reads the saved response from the provided `file`.
    async fn read(&self, file: &str) -> Result<Vec<u8>, Traced<Error>> {
        tokio::fs::read(self.dir.join(file))
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

impl Upstream<Select<By<property::Listing, ListingPage>>> for Replica {
    type Ok = property::Listing;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<property::Listing, ListingPage>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ListingPage { number, .. } = by.into_inner();

        let saved: property::Listing = serde_json::from_slice(
            &self.read(Self::SEARCH_FILE).await.map_err(tracerr::wrap!())?,
        )
        .map_err(tracerr::from_and_wrap!(=> Error))?;

        let property::Listing {
            props,
            total_result_count,
        } = saved;
        let skip = (number.max(1) as usize - 1).saturating_mul(PAGE_SIZE);

        Ok(property::Listing {
            props: props.into_iter().skip(skip).take(PAGE_SIZE).collect(),
            total_result_count,
        })
    }
}

impl Upstream<Select<By<Option<property::Details>, property::Id>>>
    for Replica
{
    type Ok = Option<property::Details>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<property::Details>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let zpid = by.into_inner();

        let saved: Vec<serde_json::Value> = serde_json::from_slice(
            &self.read(Self::PROPERTY_FILE).await.map_err(tracerr::wrap!())?,
        )
        .map_err(tracerr::from_and_wrap!(=> Error))?;

        for payload in saved {
            let Some(details) =
                parse_details(payload).map_err(tracerr::wrap!())?
            else {
                continue;
            };
            if details.zpid == zpid {
                return Ok(Some(details));
            }
        }
        Ok(None)
    }
}
