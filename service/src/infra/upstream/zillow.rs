//! [Zillow API] [`Upstream`] implementation.
//!
//! [Zillow API]: https://rapidapi.com/apimaker/api/zillow-com1

use std::time::Duration;

use common::operations::{By, Select};
use derive_more::Debug;
use secrecy::{ExposeSecret as _, SecretString};
use tracerr::Traced;

use crate::domain::property;

use super::{parse_details, Error, ListingPage, Upstream};

/// [`Zillow`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the [Zillow API].
    ///
    /// [Zillow API]: https://rapidapi.com/apimaker/api/zillow-com1
    pub base_url: String,

    /// Value of the `x-rapidapi-host` header.
    pub host: String,

    /// Key to access the [Zillow API] with.
    ///
    /// [Zillow API]: https://rapidapi.com/apimaker/api/zillow-com1
    pub api_key: SecretString,

    /// Maximum [`Duration`] of a single request.
    pub timeout: Duration,
}

impl Config {
    /// Default base URL of the [Zillow API].
    ///
    /// [Zillow API]: https://rapidapi.com/apimaker/api/zillow-com1
    pub const DEFAULT_BASE_URL: &str = "https://zillow-com1.p.rapidapi.com";

    /// Default value of the `x-rapidapi-host` header.
    pub const DEFAULT_HOST: &str = "zillow-com1.p.rapidapi.com";
}

/// [Zillow API] client.
///
/// [Zillow API]: https://rapidapi.com/apimaker/api/zillow-com1
#[derive(Clone, Debug)]
pub struct Zillow {
    /// HTTP client performing requests.
    #[debug(skip)]
    client: reqwest::Client,

    /// Base URL of the API, without a trailing slash.
    base_url: String,

    /// Value of the `x-rapidapi-host` header.
    host: String,

    /// Key to access the API with.
    api_key: SecretString,
}

impl Zillow {
    /// Creates a new [`Zillow`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the underlying HTTP client cannot be initialized.
    pub fn new(conf: Config) -> Result<Self, Traced<Error>> {
        let Config {
            base_url,
            host,
            api_key,
            timeout,
        } = conf;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            host,
            api_key,
        })
    }

    /// Performs a `GET` request to the provided `endpoint` and returns its
    /// JSON payload.
    async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, Traced<Error>> {
        tracing::debug!(endpoint, ?query, "requesting Zillow API");

        let payload = self
            .client
            .get(format!("{}/{endpoint}", self.base_url))
            .query(query)
            .header("x-rapidapi-key", self.api_key.expose_secret())
            .header("x-rapidapi-host", &self.host)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(tracerr::from_and_wrap!(=> Error))?
            .bytes()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        serde_json::from_slice(&payload)
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

impl Upstream<Select<By<property::Listing, ListingPage>>> for Zillow {
    type Ok = property::Listing;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<property::Listing, ListingPage>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ListingPage { location, number } = by.into_inner();
        let number = number.to_string();

        let payload = self
            .get(
                "propertyExtendedSearch",
                &[
                    ("location", location.as_ref()),
                    ("status_type", "ForSale"),
                    ("home_type", "Houses,Townhomes"),
                    ("page", number.as_str()),
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        serde_json::from_value(payload)
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

impl Upstream<Select<By<Option<property::Details>, property::Id>>> for Zillow {
    type Ok = Option<property::Details>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<property::Details>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let zpid = by.into_inner();

        let payload = self
            .get("property", &[("zpid", zpid.as_ref())])
            .await
            .map_err(tracerr::wrap!())?;

        parse_details(payload).map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use std::{collections::HashMap, time::Duration};

    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use common::operations::{By, Select};
    use secrecy::SecretString;
    use serde_json::json;
    use tokio::sync::mpsc;

    use crate::{
        domain::property,
        infra::upstream::{Error, ListingPage, Upstream as _},
    };

    use super::{Config, Zillow};

    type Params = HashMap<String, String>;

    async fn serve(router: Router) -> String {
        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        }));
        format!("http://{addr}")
    }

    fn zillow(base_url: String, timeout: Duration) -> Zillow {
        Zillow::new(Config {
            base_url,
            host: "zillow.test".to_owned(),
            api_key: SecretString::from("key-123"),
            timeout,
        })
        .unwrap()
    }

    fn page(number: u32) -> Select<By<property::Listing, ListingPage>> {
        Select(By::new(ListingPage {
            location: property::Location::new("Austin, TX").unwrap(),
            number,
        }))
    }

    fn details(
        zpid: &str,
    ) -> Select<By<Option<property::Details>, property::Id>> {
        Select(By::new(property::Id::new(zpid).unwrap()))
    }

    #[tokio::test]
    async fn sends_search_parameters_and_credentials() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let router = Router::new().route(
            "/propertyExtendedSearch",
            get(move |Query(params): Query<Params>, headers: HeaderMap| {
                let tx = tx.clone();
                async move {
                    tx.send((params, headers)).unwrap();
                    Json(json!({
                        "props": [{"zpid": "1"}, {"zpid": 2}],
                        "totalResultCount": 90,
                    }))
                }
            }),
        );
        let url = serve(router).await;

        let listing = zillow(format!("{url}/"), Duration::from_secs(5))
            .execute(page(2))
            .await
            .unwrap();
        let (params, headers) = rx.recv().await.unwrap();

        assert_eq!(listing.total_result_count, 90);
        assert_eq!(listing.props.len(), 2);
        assert_eq!(listing.props[1].zpid.to_string(), "2");
        assert_eq!(
            params,
            HashMap::from([
                ("location".to_owned(), "Austin, TX".to_owned()),
                ("status_type".to_owned(), "ForSale".to_owned()),
                ("home_type".to_owned(), "Houses,Townhomes".to_owned()),
                ("page".to_owned(), "2".to_owned()),
            ]),
        );
        assert_eq!(headers["x-rapidapi-key"], "key-123");
        assert_eq!(headers["x-rapidapi-host"], "zillow.test");
    }

    #[tokio::test]
    async fn server_error_fails_the_request() {
        let router = Router::new().route(
            "/propertyExtendedSearch",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let url = serve(router).await;

        let err = zillow(url, Duration::from_secs(5))
            .execute(page(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            Error::Request(e) if e.status() == Some(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ));
    }

    #[tokio::test]
    async fn malformed_payload_fails() {
        let router = Router::new()
            .route("/propertyExtendedSearch", get(|| async { "not json" }))
            .route("/property", get(|| async { Json(json!([1, 2])) }));
        let url = serve(router).await;
        let zillow = zillow(url, Duration::from_secs(5));

        let garbage = zillow.execute(page(1)).await.unwrap_err();
        let wrong_shape = zillow.execute(details("7")).await.unwrap_err();

        assert!(matches!(garbage.as_ref(), Error::Malformed(_)));
        assert!(matches!(wrong_shape.as_ref(), Error::Malformed(_)));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let router = Router::new().route(
            "/propertyExtendedSearch",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"props": [], "totalResultCount": 0}))
            }),
        );
        let url = serve(router).await;

        let err = zillow(url, Duration::from_millis(100))
            .execute(page(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            Error::Request(e) if e.is_timeout(),
        ));
    }

    #[tokio::test]
    async fn unreachable_provider_fails() {
        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = zillow(format!("http://{addr}"), Duration::from_secs(5))
            .execute(page(1))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), Error::Request(_)));
    }

    #[tokio::test]
    async fn empty_details_are_no_property() {
        let router = Router::new().route(
            "/property",
            get(|Query(params): Query<Params>| async move {
                Json(if params.get("zpid").map(String::as_str) == Some("7") {
                    json!({"zpid": 7, "bedrooms": 3})
                } else {
                    json!({})
                })
            }),
        );
        let url = serve(router).await;
        let zillow = zillow(url, Duration::from_secs(5));

        let found = zillow.execute(details("7")).await.unwrap();
        let missing = zillow.execute(details("8")).await.unwrap();

        assert_eq!(found.map(|d| d.bedrooms), Some(Some(3)));
        assert_eq!(missing, None);
    }
}
