//! Video endpoints: explorer list, detail, CRUD, embeddings

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::AppState;
use crate::ai::embeddings::{self, IndexError, SimilarVideo};
use crate::constants::{DEFAULT_SIMILAR_VIDEOS, MAX_PAGE_SIZE};
use crate::domain::{followers, videos};
use crate::metrics::detail::{VideoDetail, video_detail};
use crate::metrics::explorer::{ExplorerPage, ExplorerQuery};
use crate::metrics::{ScoredVideo, score_videos};
use crate::models::{NewVideo, Video, VideoPatch};
use crate::services::error::LogErr;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", get(list_videos).post(create_video))
        .route(
            "/videos/{id}",
            get(get_video).patch(update_video).delete(delete_video),
        )
        .route("/videos/{id}/embed", post(embed_video))
        .route("/videos/{id}/similar", get(similar_videos))
}

/// The user's whole catalogue, scored against itself
pub(crate) async fn load_scored(
    state: &AppState,
    user_id: Uuid,
) -> Result<Vec<ScoredVideo>, StatusCode> {
    let rows = videos::list_for_user(&state.db, user_id)
        .await
        .log_500("List videos error")?;
    Ok(score_videos(rows))
}

/// GET /videos - Filtered, sorted, paginated explorer view
/// Percentiles and viral scores are relative to the full catalogue, not the filtered page
async fn list_videos(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ExplorerQuery>,
) -> Result<Json<ExplorerPage>, StatusCode> {
    let scored = load_scored(&state, user_id).await?;
    Ok(Json(query.apply(scored)))
}

/// POST /videos - Create a video by hand
async fn create_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<NewVideo>,
) -> Result<(StatusCode, Json<Video>), StatusCode> {
    if body.title.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let video = videos::insert(&state.db, user_id, &body)
        .await
        .log_500("Insert video error")?;

    tracing::info!(%user_id, video_id = %video.id, "video created");
    Ok((StatusCode::CREATED, Json(video)))
}

/// GET /videos/{id} - Detail view with population comparisons and follower context
async fn get_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<VideoDetail>, StatusCode> {
    let scored = load_scored(&state, user_id).await?;
    let history = followers::list(&state.db, user_id)
        .await
        .log_500("List followers error")?;

    video_detail(scored, id, &history)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// PATCH /videos/{id} - Partial update
async fn update_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<VideoPatch>,
) -> Result<Json<Video>, StatusCode> {
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    videos::update(&state.db, user_id, id, &patch)
        .await
        .log_500("Update video error")?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// DELETE /videos/{id}
async fn delete_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = videos::delete(&state.db, user_id, id)
        .await
        .log_500("Delete video error")?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

#[derive(Debug, Serialize)]
struct EmbedResponse {
    video_id: Uuid,
    model: String,
    dimensions: usize,
}

/// POST /videos/{id}/embed - Index the video into the vector store
async fn embed_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EmbedResponse>, StatusCode> {
    let embedder = state
        .embedder
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let video = videos::get(&state.db, user_id, id)
        .await
        .log_500("Get video error")?
        .ok_or(StatusCode::NOT_FOUND)?;

    let stored = match embeddings::index_video(&state.db, embedder, &video).await {
        Ok(stored) => stored,
        Err(IndexError::EmptyContent) => return Err(StatusCode::UNPROCESSABLE_ENTITY),
        Err(e @ IndexError::Llm(_)) => {
            return Err(e).log_status("Embed video error", StatusCode::BAD_GATEWAY);
        }
        Err(e) => return Err(e).log_500("Store embedding error"),
    };

    Ok(Json(EmbedResponse {
        video_id: stored.video_id,
        dimensions: stored.embedding.len(),
        model: stored.model,
    }))
}

#[derive(Debug, Deserialize)]
struct SimilarQuery {
    limit: Option<usize>,
}

/// GET /videos/{id}/similar - Nearest videos by embedding
async fn similar_videos(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<SimilarQuery>,
) -> Result<Json<Vec<SimilarVideo>>, StatusCode> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SIMILAR_VIDEOS)
        .clamp(1, MAX_PAGE_SIZE as usize);

    embeddings::similar_videos(&state.db, user_id, id, limit)
        .await
        .log_500("Similar videos error")?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
