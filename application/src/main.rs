use std::{io, sync::OnceLock, time};

use application::{api, config, Args, Config, Service};
use axum::{extract::MatchedPath, Extension};
use axum_client_ip::InsecureClientIp;
use service::infra::{postgres, upstream, Postgres};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{MakeSpan, OnResponse, TraceLayer},
};
use tracing as log;
use tracing_subscriber::{
    filter::{filter_fn, FilterFn},
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

/// Levels written to `stderr` rather than `stdout`.
const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

/// Maximum level to log, known once the [`Config`] is loaded.
static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(levels(false)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(levels(true)),
        )
        .init();

    _ = start().await;
}

/// Passes spans, and events of the configured [`LOG_LEVEL`] going either to
/// `stderr` or to `stdout`.
fn levels(
    stderr: bool,
) -> FilterFn<impl Fn(&log::Metadata<'_>) -> bool + Send + Sync> {
    filter_fn(move |meta| {
        let level = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
        meta.is_span()
            || (STDERR_LEVELS.contains(meta.level()) == stderr
                && level >= *meta.level())
    })
}

async fn start() -> Result<(), ()> {
    let Args { config, port } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;
    let Config {
        server,
        service,
        upstream,
        postgres,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;
    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let mut postgres = Postgres::new(&postgres.into()).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;
    migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| log::error!("failed to run database migrations: {e}"))?;

    let upstream = upstream::Gateway::try_from(upstream).map_err(|e| {
        log::error!("failed to initialize upstream property provider: {e}");
    })?;
    let service = Service::new(service.into(), postgres, upstream);

    let app = api::router()
        .layer(Extension(service))
        .layer(cors(&server.cors)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(RequestSpan)
                .on_response(ResponseLog),
        );

    let addr = (server.host.clone(), port.unwrap_or(server.port));
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        log::error!("failed to listen on `{}:{}`: {e}", addr.0, addr.1);
    })?;
    log::info!("listening on `{}:{}`", addr.0, addr.1);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for shutdown signal: {e}");
            }
            log::info!("shutting down");
        })
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}

/// Builds the [`CorsLayer`] allowing the configured origins, or any origin
/// if `*` is among them.
fn cors(conf: &config::Cors) -> Result<CorsLayer, ()> {
    let origins = if conf.origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            conf.origins
                .iter()
                .map(|origin| {
                    origin.parse::<http::HeaderValue>().map_err(|e| {
                        log::error!("invalid CORS origin `{origin}`: {e}");
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    Ok(CorsLayer::new()
        .allow_methods([
            http::Method::DELETE,
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::PATCH,
            http::Method::POST,
        ])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
        ])
        .allow_origin(origins))
}

/// [`MakeSpan`] describing an incoming HTTP request.
#[derive(Clone, Copy, Debug)]
struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, r: &http::Request<B>) -> tracing::Span {
        tracing::info_span!(
            "HTTP request",
            http.client_ip = InsecureClientIp::from(r.headers(), r.extensions())
                .map(|ip| ip.0.to_string())
                .ok(),
            http.method = r.method().as_str(),
            http.route = r
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str),
            http.target = r
                .uri()
                .path_and_query()
                .map(http::uri::PathAndQuery::as_str),
            http.user_agent = r
                .headers()
                .get(http::header::USER_AGENT)
                .and_then(|h| h.to_str().ok()),
            http.status_code = tracing::field::Empty,
        )
    }
}

/// [`OnResponse`] recording the status and the duration of a request.
#[derive(Clone, Copy, Debug)]
struct ResponseLog;

impl<B> OnResponse<B> for ResponseLog {
    fn on_response(
        self,
        r: &http::Response<B>,
        dur: time::Duration,
        span: &tracing::Span,
    ) {
        let status = r.status();
        _ = span.record("http.status_code", status.as_u16());

        let duration = format!("{}ms", dur.as_millis());
        if status.is_server_error() {
            log::error!(duration = duration.as_str());
        } else if status.is_client_error() {
            log::warn!(duration = duration.as_str());
        } else {
            log::info!(duration = duration.as_str());
        }
    }
}
