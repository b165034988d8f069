pub mod handlers;
pub mod types;

use crate::{
    Error, Result,
    analyzer::EmotionAnalyzer,
    config::{Config, CorsConfig, ServerConfig},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    routing::post,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub const ANALYZE_PATH: &str = "/api/analyze";

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::OPTIONS,
    Method::PATCH,
    Method::DELETE,
    Method::POST,
    Method::PUT,
];

const ALLOWED_HEADERS: [&str; 9] = [
    "x-csrf-token",
    "x-requested-with",
    "accept",
    "accept-version",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "x-api-version",
];

pub async fn run(config: Config) -> Result<()> {
    let analyzer = EmotionAnalyzer::from_config(&config.provider)?;
    info!(
        "Using {} ({}) with {:?} prompt",
        analyzer.provider_name(),
        config.provider.model(),
        config.provider.prompt
    );

    let app_state = handlers::AppState {
        analyzer: Arc::new(analyzer),
    };

    let app = router(app_state, &config.server)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: handlers::AppState, config: &ServerConfig) -> Result<Router> {
    let app = Router::new()
        .route(
            ANALYZE_PATH,
            post(handlers::analyze)
                .fallback(handlers::method_not_allowed)
                .layer(DefaultBodyLimit::max(config.max_body_bytes)),
        )
        .with_state(state)
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors)?);

    Ok(app)
}

/// OPTIONS requests are answered here with 200 and never reach a handler.
fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static));

    if config.allows_any_origin() {
        return Ok(layer.allow_origin(AllowOrigin::any()));
    }

    let origins = config
        .allow_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| Error::config(format!("Invalid CORS origin: '{}'", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true))
}
