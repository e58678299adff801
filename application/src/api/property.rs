//! Property search and details endpoints, backed by the upstream provider.

use axum::{extract::Query, Extension, Json};
use axum_extra::extract::WithRejection;
use common::pagination;
use serde::{Deserialize, Serialize};
use service::{
    domain::property,
    query::{self, Query as _},
};

use crate::{api, define_error, AsError, Error, Service, Session};

/// Query parameters of a `GET /cribbup/search` request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// City, ZIP code or address to search properties in.
    pub location: Option<String>,

    /// Number of the requested page, starting from `1`.
    pub page: Option<u32>,

    /// Number of properties on a page.
    pub limit: Option<u32>,
}

/// Response to a `GET /cribbup/search` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Total number of found properties.
    pub total_results: u32,

    /// Total number of pages of found properties.
    pub total_pages: u32,

    /// Properties on the requested page.
    pub properties: Vec<property::Summary>,

    /// Number of the requested page.
    pub current_page: u32,

    /// Number of properties on a page.
    pub results_per_page: u32,
}

impl From<pagination::Page<property::Summary>> for SearchResponse {
    fn from(page: pagination::Page<property::Summary>) -> Self {
        Self {
            total_results: page.total_results,
            total_pages: page.total_pages,
            properties: page.items,
            current_page: page.current_page,
            results_per_page: page.per_page,
        }
    }
}

/// Query parameters of a `GET /cribbup/property` request.
#[derive(Debug, Default, Deserialize)]
pub struct DetailsParams {
    /// ID of the property.
    pub zpid: Option<String>,
}

/// Response to a `GET /cribbup/property` request.
#[derive(Debug, Serialize)]
pub struct DetailsResponse {
    /// Details of the requested property.
    pub building: property::Details,
}

/// Searches properties for sale in a location, a page at a time.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the location is missing, or the page or the limit
///   is zero;
/// - `PROPERTIES_NOT_FOUND` if nothing is found in the location;
/// - `UPSTREAM_FAILED` if the upstream provider fails.
#[tracing::instrument(skip_all, fields(location = ?params.location))]
pub async fn search(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, Error>,
) -> Result<Json<SearchResponse>, Error> {
    let SearchParams {
        location,
        page,
        limit,
    } = params;
    let location = location
        .as_deref()
        .and_then(property::Location::new)
        .ok_or_else(|| {
            Error::validation("Missing parameter! Please add a location.")
        })?;
    let arguments = pagination::Arguments::new(
        page.unwrap_or(1),
        limit.unwrap_or(pagination::Arguments::DEFAULT_LIMIT),
    )
    .ok_or_else(|| {
        Error::validation(
            "`page` must be positive and `limit` must be between 1 and 100",
        )
    })?;

    let page = service
        .execute(query::SearchProperties {
            location,
            arguments,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(page.into()))
}

/// Returns details of a single property.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the `zpid` is missing or invalid;
/// - `PROPERTY_NOT_FOUND` if there is no such property;
/// - `UPSTREAM_FAILED` if the upstream provider fails.
#[tracing::instrument(skip_all, fields(zpid = ?params.zpid))]
pub async fn details(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Query(params), _): WithRejection<Query<DetailsParams>, Error>,
) -> Result<Json<DetailsResponse>, Error> {
    let zpid = api::require("zpid", params.zpid.as_deref())?;

    let building = service
        .execute(query::PropertyDetails { zpid })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(DetailsResponse { building }))
}

define_error! {
    enum PropertyError {
        #[code = "PROPERTIES_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "No properties found"]
        NothingFound,

        #[code = "PROPERTY_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "No building found"]
        NotFound,

        #[code = "UPSTREAM_FAILED"]
        #[status = BAD_GATEWAY]
        #[message = "Failed to fetch data from the property provider"]
        Upstream,
    }
}

impl AsError for query::property::SearchError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Upstream(_) => PropertyError::Upstream.into(),
            Self::NotFound => PropertyError::NothingFound.into(),
        })
    }
}

impl AsError for query::property::DetailsError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Upstream(_) => PropertyError::Upstream.into(),
            Self::NotFound(_) => PropertyError::NotFound.into(),
        })
    }
}
