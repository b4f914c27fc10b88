//! Idea feedback domain - DB queries for `content_ideas_feedback`

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{IdeaFeedback, NewIdeaFeedback};

pub async fn insert<'e, E>(
    executor: E,
    user_id: Uuid,
    feedback: &NewIdeaFeedback,
) -> Result<IdeaFeedback, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO content_ideas_feedback (user_id, idea_title, idea_summary, liked)
        VALUES ($1, $2, $3, $4)
        RETURNING id, idea_title, idea_summary, liked, created_at
        "#,
    )
    .bind(user_id)
    .bind(&feedback.idea_title)
    .bind(&feedback.idea_summary)
    .bind(feedback.liked)
    .fetch_one(executor)
    .await
}

pub async fn list_recent<'e, E>(
    executor: E,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<IdeaFeedback>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, idea_title, idea_summary, liked, created_at FROM content_ideas_feedback
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
