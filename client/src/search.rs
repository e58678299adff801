//! [`Search`] definitions.

use crate::{model::SearchResults, Api, Error, TokenStorage};

/// State of a paginated property search.
///
/// Navigation relies on the pages reported by the server only.
#[derive(Clone, Debug)]
pub struct Search {
    /// Searched location.
    location: String,

    /// Number of properties on a page.
    limit: u32,

    /// Last loaded page, if any.
    results: Option<SearchResults>,
}

impl Default for Search {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

impl Search {
    /// Default number of properties on a page.
    pub const DEFAULT_LIMIT: u32 = 12;

    /// Creates a new [`Search`] showing `limit` properties on a page.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            location: String::new(),
            limit,
            results: None,
        }
    }

    /// Returns the searched location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the last loaded page, if any.
    #[must_use]
    pub fn results(&self) -> Option<&SearchResults> {
        self.results.as_ref()
    }

    /// Indicates whether there is a page after the current one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.results
            .as_ref()
            .is_some_and(|r| r.current_page < r.total_pages)
    }

    /// Indicates whether there is a page before the current one.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.results.as_ref().is_some_and(|r| r.current_page > 1)
    }

    /// Starts searching in the provided `location` from its first page.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the `location` is blank;
    /// - any other [`Error`] of [`Api::search_properties()`], leaving no
    ///   page loaded.
    pub async fn submit<S: TokenStorage>(
        &mut self,
        api: &Api<S>,
        location: &str,
    ) -> Result<(), Error> {
        self.results = None;
        location.trim().clone_into(&mut self.location);
        self.load(api, 1).await
    }

    /// Loads the next page, if there is one.
    ///
    /// Returns whether the page has changed.
    ///
    /// # Errors
    ///
    /// If the [`Api::search_properties()`] call fails, keeping the current
    /// page.
    pub async fn next<S: TokenStorage>(
        &mut self,
        api: &Api<S>,
    ) -> Result<bool, Error> {
        let page = match &self.results {
            Some(r) if self.has_next() => r.current_page + 1,
            Some(_) | None => return Ok(false),
        };
        self.load(api, page).await?;
        Ok(true)
    }

    /// Loads the previous page, if there is one.
    ///
    /// Returns whether the page has changed.
    ///
    /// # Errors
    ///
    /// If the [`Api::search_properties()`] call fails, keeping the current
    /// page.
    pub async fn previous<S: TokenStorage>(
        &mut self,
        api: &Api<S>,
    ) -> Result<bool, Error> {
        let page = match &self.results {
            Some(r) if self.has_previous() => r.current_page - 1,
            Some(_) | None => return Ok(false),
        };
        self.load(api, page).await?;
        Ok(true)
    }

    /// Loads the provided `page` of the searched location.
    async fn load<S: TokenStorage>(
        &mut self,
        api: &Api<S>,
        page: u32,
    ) -> Result<(), Error> {
        let results = api
            .search_properties(&self.location, page, self.limit)
            .await?;
        tracing::debug!(
            location = %self.location,
            page = results.current_page,
            total_pages = results.total_pages,
            "loaded search results",
        );
        self.results = Some(results);
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use std::{collections::HashMap, time::Duration};

    use axum::{extract::Query, routing::get, Json, Router};

    use crate::{
        fixture::{self, Server},
        Error, MemoryStorage, Search,
    };

    async fn server() -> Server {
        Server::spawn(Router::new().route(
            "/cribbup/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let page = params["page"].parse().unwrap();
                Json(fixture::page(page, 3))
            }),
        ))
        .await
    }

    #[tokio::test]
    async fn navigates_reported_pages() {
        let server = server().await;
        let api = server
            .api(MemoryStorage::with(fixture::token(
                "alice",
                Duration::from_secs(60),
            )))
            .await;
        let mut search = Search::default();

        search.submit(&api, " 78701 ").await.unwrap();
        assert_eq!(search.location(), "78701");
        assert_eq!(search.results().unwrap().current_page, 1);
        assert!(!search.has_previous());
        assert!(!search.previous(&api).await.unwrap());

        assert!(search.next(&api).await.unwrap());
        assert!(search.next(&api).await.unwrap());
        assert_eq!(search.results().unwrap().current_page, 3);
        assert!(!search.has_next());
        assert!(!search.next(&api).await.unwrap());

        assert!(search.previous(&api).await.unwrap());
        assert_eq!(search.results().unwrap().current_page, 2);
        assert_eq!(server.hits(), 4);
    }

    #[tokio::test]
    async fn rejects_blank_location() {
        let server = server().await;
        let api = server.api(MemoryStorage::default()).await;
        let mut search = Search::default();

        let res = search.submit(&api, "  ").await;

        assert!(
            matches!(
                res,
                Err(Error::Validation("Please enter a valid city or ZIP code."))
            ),
            "{res:?}",
        );
        assert!(search.results().is_none());
        assert_eq!(server.hits(), 0);
    }
}
