//! Followers domain - DB queries for `followers_history`

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::FollowersSnapshot;

/// Follower history in date order
pub async fn list<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<FollowersSnapshot>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT recorded_on, follower_count FROM followers_history
        WHERE user_id = $1
        ORDER BY recorded_on ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// Record the follower count for a day, replacing any earlier value for that day
pub async fn upsert<'e, E>(
    executor: E,
    user_id: Uuid,
    recorded_on: NaiveDate,
    follower_count: i64,
) -> Result<FollowersSnapshot, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO followers_history (user_id, recorded_on, follower_count)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, recorded_on) DO UPDATE SET follower_count = EXCLUDED.follower_count
        RETURNING recorded_on, follower_count
        "#,
    )
    .bind(user_id)
    .bind(recorded_on)
    .bind(follower_count)
    .fetch_one(executor)
    .await
}
