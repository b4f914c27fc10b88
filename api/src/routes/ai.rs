//! AI generation endpoints: ideas, scripts, growth insights, idea feedback
//!
//! Generation never fails because of the LLM; see `crate::ai`. Database
//! errors while loading the creator's data still return 500.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::post,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::auth::AuthUser;
use super::videos::load_scored;
use crate::AppState;
use crate::ai::{
    self, ContentIdea, CreatorSnapshot, Generated, GrowthInsights, VideoScript, top_videos,
};
use crate::constants::{
    DEFAULT_KPI_WINDOW_DAYS, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PROMPT_FEEDBACK_ENTRIES,
    PROMPT_TOP_VIDEOS,
};
use crate::domain::{account_context, feedback, followers, insights};
use crate::metrics::ScoredVideo;
use crate::metrics::kpis::{KpiSummary, compute_kpis};
use crate::models::{
    AccountContext, GrowthInsightRecord, IdeaFeedback, NewIdeaFeedback,
};
use crate::services::error::LogErr;
use crate::services::rate_limit::AI_RATE_LIMITER;

const MAX_SCRIPT_SECONDS: u32 = 180;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ai/ideas", post(generate_ideas))
        .route("/ai/ideas/feedback", post(record_feedback))
        .route("/ai/scripts", post(generate_script))
        .route("/ai/insights", post(generate_insights).get(list_insights))
}

/// Owned creator data that a `CreatorSnapshot` borrows from
struct CreatorData {
    top_videos: Vec<ScoredVideo>,
    kpis: Option<KpiSummary>,
    context: Option<AccountContext>,
    feedback: Vec<IdeaFeedback>,
}

impl CreatorData {
    fn snapshot(&self) -> CreatorSnapshot<'_> {
        CreatorSnapshot {
            top_videos: &self.top_videos,
            kpis: self.kpis.as_ref(),
            context: self.context.as_ref(),
            feedback: &self.feedback,
        }
    }
}

async fn load_creator_data(state: &AppState, user_id: Uuid) -> Result<CreatorData, StatusCode> {
    let scored = load_scored(state, user_id).await?;
    let history = followers::list(&state.db, user_id)
        .await
        .log_500("List followers error")?;
    let context = account_context::get(&state.db, user_id)
        .await
        .log_500("Get account context error")?;
    let feedback = feedback::list_recent(&state.db, user_id, PROMPT_FEEDBACK_ENTRIES)
        .await
        .log_500("List idea feedback error")?;

    let kpis = (!scored.is_empty()).then(|| {
        compute_kpis(
            &scored,
            &history,
            DEFAULT_KPI_WINDOW_DAYS,
            Utc::now().date_naive(),
        )
    });

    Ok(CreatorData {
        top_videos: top_videos(scored, PROMPT_TOP_VIDEOS),
        kpis,
        context,
        feedback,
    })
}

/// Consume one generation token for the user or reject with 429
fn check_rate_limit(user_id: Uuid) -> Result<(), StatusCode> {
    if AI_RATE_LIMITER.check(user_id) {
        Ok(())
    } else {
        tracing::warn!(%user_id, "AI generation rate limited");
        Err(StatusCode::TOO_MANY_REQUESTS)
    }
}

#[derive(Debug, Deserialize)]
struct IdeasRequest {
    count: Option<usize>,
    focus: Option<String>,
}

/// POST /ai/ideas - Video ideas grounded in the creator's best videos
async fn generate_ideas(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<IdeasRequest>,
) -> Result<Json<Generated<Vec<ContentIdea>>>, StatusCode> {
    check_rate_limit(user_id)?;
    let data = load_creator_data(&state, user_id).await?;

    let ideas = ai::generate_ideas(
        state.llm.as_ref(),
        &data.snapshot(),
        ai::idea_count(body.count),
        body.focus.as_deref(),
    )
    .await;
    Ok(Json(ideas))
}

#[derive(Debug, Deserialize)]
struct ScriptRequest {
    topic: String,
    notes: Option<String>,
    duration_seconds: Option<u32>,
}

/// POST /ai/scripts - Script for one topic
async fn generate_script(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ScriptRequest>,
) -> Result<Json<Generated<VideoScript>>, StatusCode> {
    let topic = body.topic.trim();
    if topic.is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    check_rate_limit(user_id)?;
    let data = load_creator_data(&state, user_id).await?;

    let script = ai::generate_script(
        state.llm.as_ref(),
        &data.snapshot(),
        topic,
        body.notes.as_deref(),
        body.duration_seconds.map(|d| d.clamp(5, MAX_SCRIPT_SECONDS)),
    )
    .await;
    Ok(Json(script))
}

/// POST /ai/insights - Generate and store growth insights
async fn generate_insights(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Generated<GrowthInsights>>, StatusCode> {
    check_rate_limit(user_id)?;
    let data = load_creator_data(&state, user_id).await?;

    let generated = ai::generate_insights(state.llm.as_ref(), &data.snapshot()).await;

    let value = serde_json::to_value(&generated.data).log_500("Serialize insights error")?;
    insights::insert(&state.db, user_id, &value, generated.fallback)
        .await
        .log_500("Store insights error")?;

    Ok(Json(generated))
}

#[derive(Debug, Deserialize)]
struct ListInsightsQuery {
    limit: Option<i64>,
}

/// GET /ai/insights - Stored insights, newest first
async fn list_insights(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListInsightsQuery>,
) -> Result<Json<Vec<GrowthInsightRecord>>, StatusCode> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    insights::list_latest(&state.db, user_id, limit)
        .await
        .log_500("List insights error")
        .map(Json)
}

/// POST /ai/ideas/feedback - Thumbs up/down on an idea, fed into later prompts
async fn record_feedback(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<NewIdeaFeedback>,
) -> Result<(StatusCode, Json<IdeaFeedback>), StatusCode> {
    if body.idea_title.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let saved = feedback::insert(&state.db, user_id, &body)
        .await
        .log_500("Insert idea feedback error")?;
    Ok((StatusCode::CREATED, Json(saved)))
}
