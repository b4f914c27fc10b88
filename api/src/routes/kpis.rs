//! Dashboard KPI endpoint

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::videos::load_scored;
use crate::AppState;
use crate::constants::{DEFAULT_KPI_WINDOW_DAYS, MAX_KPI_WINDOW_DAYS};
use crate::domain::followers;
use crate::metrics::kpis::{KpiSummary, compute_kpis};
use crate::services::error::LogErr;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/kpis", get(get_kpis))
}

#[derive(Debug, Deserialize)]
pub struct KpiQuery {
    pub days: Option<i64>,
}

impl KpiQuery {
    pub fn window_days(&self) -> i64 {
        self.days
            .unwrap_or(DEFAULT_KPI_WINDOW_DAYS)
            .clamp(1, MAX_KPI_WINDOW_DAYS)
    }
}

/// GET /kpis?days=N - Current window vs the one before it
async fn get_kpis(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<KpiQuery>,
) -> Result<Json<KpiSummary>, StatusCode> {
    let scored = load_scored(&state, user_id).await?;
    let history = followers::list(&state.db, user_id)
        .await
        .log_500("List followers error")?;

    Ok(Json(compute_kpis(
        &scored,
        &history,
        query.window_days(),
        Utc::now().date_naive(),
    )))
}
