//! Growth insights domain - DB queries for `growth_insights`

use sqlx::types::Json;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::GrowthInsightRecord;

pub async fn insert<'e, E>(
    executor: E,
    user_id: Uuid,
    insights: &serde_json::Value,
    fallback: bool,
) -> Result<GrowthInsightRecord, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO growth_insights (user_id, insights, fallback)
        VALUES ($1, $2, $3)
        RETURNING id, insights, fallback, created_at
        "#,
    )
    .bind(user_id)
    .bind(Json(insights))
    .bind(fallback)
    .fetch_one(executor)
    .await
}

/// Most recent insights first
pub async fn list_latest<'e, E>(
    executor: E,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<GrowthInsightRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, insights, fallback, created_at FROM growth_insights
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(executor)
    .await
}
