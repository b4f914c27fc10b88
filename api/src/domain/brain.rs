//! Brain vector domain - DB queries for `tiktok_brain_vectors`
//!
//! Embeddings are stored as `real[]`; similarity is ranked in Rust.

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::BrainVector;

/// Store the embedding of a video, replacing any previous one
pub async fn upsert<'e, E>(
    executor: E,
    user_id: Uuid,
    video_id: Uuid,
    content: &str,
    embedding: &[f32],
    model: &str,
) -> Result<BrainVector, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO tiktok_brain_vectors (user_id, video_id, content, embedding, model)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (video_id) DO UPDATE SET
            content = EXCLUDED.content,
            embedding = EXCLUDED.embedding,
            model = EXCLUDED.model
        RETURNING video_id, content, embedding, model
        "#,
    )
    .bind(user_id)
    .bind(video_id)
    .bind(content)
    .bind(embedding)
    .bind(model)
    .fetch_one(executor)
    .await
}

pub async fn list_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<BrainVector>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        "SELECT video_id, content, embedding, model FROM tiktok_brain_vectors WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
