pub mod account;
pub mod ai;
pub mod auth;
pub mod followers;
pub mod import;
pub mod kpis;
pub mod user;
pub mod videos;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(account::routes())
        .merge(ai::routes())
        .merge(followers::routes())
        .merge(import::routes())
        .merge(kpis::routes())
        .merge(user::routes())
        .merge(videos::routes())
}

/// GET /health - liveness check, no auth
async fn health() -> &'static str {
    "ok"
}
