mod ai;
mod config;
mod constants;
mod domain;
mod import;
mod metrics;
mod models;
mod routes;
mod services;

use axum::http::{HeaderValue, Method, header};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use services::llm::{self, LlmClient, OpenAiClient};
use services::rate_limit::{self, AI_RATE_LIMITER};

/// Idle AI rate-limit buckets are evicted on this interval
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

pub struct AppState {
    pub db: PgPool,
    pub jwt_secret: String,
    /// Text generation provider; `None` serves fallback content
    pub llm: Option<LlmClient>,
    /// Embedding provider; `None` disables vector endpoints
    pub embedder: Option<OpenAiClient>,
}

fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    Ok(match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokpulse_api=info,tower_http=info".into()),
        )
        .init();

    let db = services::db::connect(&config.database).await?;

    let llm = LlmClient::from_config(&config.llm)?;
    let embedder = llm::embedder_from_config(&config.llm)?;
    match &llm {
        Some(client) => tracing::info!(provider = client.provider_name(), "LLM provider configured"),
        None => tracing::warn!("no LLM API key configured, AI endpoints will serve fallback content"),
    }
    if embedder.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, embedding endpoints disabled");
    }

    let state = Arc::new(AppState {
        db,
        jwt_secret: config.jwt_secret.clone(),
        llm,
        embedder,
    });

    tokio::spawn(rate_limit::run_cleanup(
        &AI_RATE_LIMITER,
        RATE_LIMIT_CLEANUP_INTERVAL,
    ));

    let app = routes::build_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config.cors_origin.as_deref())?),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    // Connect info feeds the per-IP governor on the import routes
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
