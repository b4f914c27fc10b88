//! Account context endpoints (/account/context)

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use std::sync::Arc;

use super::auth::AuthUser;
use crate::AppState;
use crate::domain::account_context;
use crate::models::AccountContext;
use crate::services::error::LogErr;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/account/context", get(get_context).put(put_context))
}

/// GET /account/context - Empty context when none was saved
async fn get_context(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<AccountContext>, StatusCode> {
    let context = account_context::get(&state.db, user_id)
        .await
        .log_500("Get account context error")?
        .unwrap_or_default();
    Ok(Json(context))
}

/// PUT /account/context - Replace the context
async fn put_context(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AccountContext>,
) -> Result<Json<AccountContext>, StatusCode> {
    account_context::upsert(&state.db, user_id, &body)
        .await
        .log_500("Save account context error")
        .map(Json)
}
