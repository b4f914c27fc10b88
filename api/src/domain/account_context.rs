//! Account context domain - DB queries for `tiktok_account_contexts`

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::AccountContext;

pub async fn get<'e, E>(executor: E, user_id: Uuid) -> Result<Option<AccountContext>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT niche, target_audience, goals, tone, updated_at
        FROM tiktok_account_contexts
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Create or replace the user's account context
pub async fn upsert<'e, E>(
    executor: E,
    user_id: Uuid,
    context: &AccountContext,
) -> Result<AccountContext, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO tiktok_account_contexts (user_id, niche, target_audience, goals, tone, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        ON CONFLICT (user_id) DO UPDATE SET
            niche = EXCLUDED.niche,
            target_audience = EXCLUDED.target_audience,
            goals = EXCLUDED.goals,
            tone = EXCLUDED.tone,
            updated_at = NOW()
        RETURNING niche, target_audience, goals, tone, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&context.niche)
    .bind(&context.target_audience)
    .bind(&context.goals)
    .bind(&context.tone)
    .fetch_one(executor)
    .await
}
