//! Follower history endpoints

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::AuthUser;
use crate::AppState;
use crate::domain::followers;
use crate::metrics::followers::{FollowerDelta, deltas, latest};
use crate::models::FollowersSnapshot;
use crate::services::error::LogErr;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/followers", get(list_followers).post(record_followers))
}

#[derive(Debug, Serialize)]
struct FollowersResponse {
    current: Option<i64>,
    history: Vec<FollowerDelta>,
}

/// GET /followers - History with day-over-day deltas
async fn list_followers(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<FollowersResponse>, StatusCode> {
    let history = followers::list(&state.db, user_id)
        .await
        .log_500("List followers error")?;

    Ok(Json(FollowersResponse {
        current: latest(&history),
        history: deltas(&history),
    }))
}

#[derive(Debug, Deserialize)]
struct RecordFollowersRequest {
    /// Defaults to today
    recorded_on: Option<NaiveDate>,
    follower_count: i64,
}

/// POST /followers - Record a snapshot; a second one for the same day replaces it
async fn record_followers(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<RecordFollowersRequest>,
) -> Result<(StatusCode, Json<FollowersSnapshot>), StatusCode> {
    if body.follower_count < 0 {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let recorded_on = body.recorded_on.unwrap_or_else(|| Utc::now().date_naive());

    let snapshot = followers::upsert(&state.db, user_id, recorded_on, body.follower_count)
        .await
        .log_500("Record followers error")?;

    Ok((StatusCode::CREATED, Json(snapshot)))
}
