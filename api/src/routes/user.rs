//! Current user endpoint (/me)

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::AppState;
use crate::domain::profiles;
use crate::services::error::LogErr;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(get_me))
}

/// GET /me - Profile of the signed-in user
/// A user without a profile row still gets their id back
async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, StatusCode> {
    let profile = profiles::get(&state.db, user_id)
        .await
        .log_500("Get profile error")?;

    Ok(Json(MeResponse {
        id: user_id,
        username: profile.as_ref().and_then(|p| p.username.clone()),
        display_name: profile.and_then(|p| p.display_name),
    }))
}
