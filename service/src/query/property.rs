//! [`Query`] collection related to properties of the upstream provider.

use common::{
    operations::{By, Select},
    pagination,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::property,
    infra::{
        upstream::{self, ListingPage, PAGE_SIZE},
        Upstream,
    },
    Service,
};

use super::Query;

/// [`Query`] searching properties for sale in a [`property::Location`].
///
/// The upstream provider serves results in pages of a fixed size, so pages
/// of the requested size are assembled out of the upstream pages covering
/// them.
#[derive(Clone, Debug)]
pub struct SearchProperties {
    /// [`property::Location`] to search properties in.
    pub location: property::Location,

    /// [`pagination::Arguments`] selecting the page of results.
    pub arguments: pagination::Arguments,
}

impl<Db, Up> Query<SearchProperties> for Service<Db, Up>
where
    Up: Upstream<
        Select<By<property::Listing, ListingPage>>,
        Ok = property::Listing,
        Err = Traced<upstream::Error>,
    >,
{
    type Ok = pagination::Page<property::Summary>;
    type Err = Traced<SearchError>;

    async fn execute(
        &self,
        query: SearchProperties,
    ) -> Result<Self::Ok, Self::Err> {
        use SearchError as E;

        let SearchProperties {
            location,
            arguments,
        } = query;

        let upstream = self.upstream();
        let mut total = None;
        let mut items = Vec::new();
        for chunk in arguments.chunks(PAGE_SIZE) {
            let offset = (chunk.number as usize - 1) * PAGE_SIZE;
            if total.is_some_and(|t: u32| offset >= t as usize) {
                break;
            }

            let property::Listing {
                props,
                total_result_count,
            } = listing(upstream, &location, chunk.number)
                .await
                .map_err(tracerr::wrap!())?;

            // The provider omits the count for tiny result sets.
            let count = if total_result_count > 0 {
                total_result_count
            } else if props.is_empty() && chunk.number > 1 {
                // Past the end, so only the first page tells the size.
                let first = listing(upstream, &location, 1)
                    .await
                    .map_err(tracerr::wrap!())?;
                if first.total_result_count > 0 {
                    first.total_result_count
                } else {
                    u32::try_from(first.props.len()).unwrap_or(u32::MAX)
                }
            } else {
                u32::try_from(offset + props.len()).unwrap_or(u32::MAX)
            };
            if count == 0 {
                return Err(tracerr::new!(E::NotFound));
            }
            _ = total.get_or_insert(count);

            let is_last = props.len() < PAGE_SIZE;
            let within = chunk.within.start.min(props.len())
                ..chunk.within.end.min(props.len());
            items.extend(props.into_iter().take(within.end).skip(within.start));
            if is_last {
                break;
            }
        }

        tracing::debug!(
            %location,
            page = arguments.page(),
            found = items.len(),
            "searched properties",
        );

        Ok(pagination::Page::new(
            arguments,
            total.unwrap_or_default(),
            items,
        ))
    }
}

/// Fetches the upstream [`property::Listing`] page of the provided `number`.
async fn listing<Up>(
    upstream: &Up,
    location: &property::Location,
    number: u32,
) -> Result<property::Listing, Traced<SearchError>>
where
    Up: Upstream<
        Select<By<property::Listing, ListingPage>>,
        Ok = property::Listing,
        Err = Traced<upstream::Error>,
    >,
{
    upstream
        .execute(Select(By::new(ListingPage {
            location: location.clone(),
            number,
        })))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> SearchError))
}

/// Error of [`SearchProperties`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum SearchError {
    /// [`Upstream`] error.
    #[display("`Upstream` request failed: {_0}")]
    Upstream(upstream::Error),

    /// Nothing matches the search.
    #[display("No properties found")]
    NotFound,
}

/// [`Query`] fetching [`property::Details`] of a single property.
#[derive(Clone, Debug)]
pub struct PropertyDetails {
    /// [`property::Id`] of the property.
    pub zpid: property::Id,
}

impl<Db, Up> Query<PropertyDetails> for Service<Db, Up>
where
    Up: Upstream<
        Select<By<Option<property::Details>, property::Id>>,
        Ok = Option<property::Details>,
        Err = Traced<upstream::Error>,
    >,
{
    type Ok = property::Details;
    type Err = Traced<DetailsError>;

    async fn execute(
        &self,
        query: PropertyDetails,
    ) -> Result<Self::Ok, Self::Err> {
        use DetailsError as E;

        let PropertyDetails { zpid } = query;

        self.upstream()
            .execute(Select(By::new(zpid.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotFound(zpid))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`PropertyDetails`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum DetailsError {
    /// [`Upstream`] error.
    #[display("`Upstream` request failed: {_0}")]
    Upstream(upstream::Error),

    /// Property doesn't exist.
    #[display("Property `{_0}` not found")]
    #[from(ignore)]
    NotFound(#[error(not(source))] property::Id),
}
