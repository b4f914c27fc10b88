//! Video embeddings and similarity search over `tiktok_brain_vectors`

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain;
use crate::models::{BrainVector, Video};
use crate::services::llm::{LlmError, OpenAiClient};

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("video has no text to embed")]
    EmptyContent,
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarVideo {
    pub video_id: Uuid,
    pub content: String,
    pub similarity: f64,
}

/// Text that represents a video in the vector store
pub fn embedding_text(video: &Video) -> String {
    let mut parts = vec![video.title.trim()];
    for field in [&video.hook, &video.script, &video.theme] {
        if let Some(text) = field.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            parts.push(text);
        }
    }
    parts.retain(|p| !p.is_empty());
    parts.join("\n")
}

/// Cosine similarity; 0 for empty, zero-norm or mismatched vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    let similarity = dot / denom;
    if similarity.is_finite() { similarity } else { 0.0 }
}

/// Rank `candidates` by similarity to `target`, excluding the target video itself
pub fn rank_similar(
    target: &BrainVector,
    candidates: Vec<BrainVector>,
    limit: usize,
) -> Vec<SimilarVideo> {
    let mut ranked: Vec<SimilarVideo> = candidates
        .into_iter()
        .filter(|c| c.video_id != target.video_id)
        .map(|c| SimilarVideo {
            similarity: cosine_similarity(&target.embedding, &c.embedding),
            video_id: c.video_id,
            content: c.content,
        })
        .collect();
    ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    ranked.truncate(limit);
    ranked
}

/// Embed a video and store the vector
pub async fn index_video(
    pool: &PgPool,
    embedder: &OpenAiClient,
    video: &Video,
) -> Result<BrainVector, IndexError> {
    let content = embedding_text(video);
    if content.is_empty() {
        return Err(IndexError::EmptyContent);
    }

    let embedding = embedder.embed(&content).await?;
    let stored = domain::brain::upsert(
        pool,
        video.user_id,
        video.id,
        &content,
        &embedding,
        embedder.embedding_model(),
    )
    .await?;

    tracing::info!(
        video_id = %video.id,
        dimensions = embedding.len(),
        "video indexed"
    );
    Ok(stored)
}

/// Videos most similar to `video_id`, or `None` if it was never indexed
pub async fn similar_videos(
    pool: &PgPool,
    user_id: Uuid,
    video_id: Uuid,
    limit: usize,
) -> Result<Option<Vec<SimilarVideo>>, sqlx::Error> {
    let vectors = domain::brain::list_for_user(pool, user_id).await?;
    let Some(target) = vectors.iter().find(|v| v.video_id == video_id).cloned() else {
        return Ok(None);
    };
    Ok(Some(rank_similar(&target, vectors, limit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn vector(embedding: Vec<f32>) -> BrainVector {
        BrainVector {
            video_id: Uuid::new_v4(),
            content: String::new(),
            embedding,
            model: "test".to_string(),
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_rank_similar_excludes_target() {
        let target = vector(vec![1.0, 0.0]);
        let close = vector(vec![0.9, 0.1]);
        let far = vector(vec![0.0, 1.0]);
        let candidates = vec![far.clone(), target.clone(), close.clone()];

        let ranked = rank_similar(&target, candidates, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].video_id, close.video_id);
        assert_eq!(ranked[1].video_id, far.video_id);

        let top = rank_similar(&target, vec![far, close.clone()], 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].video_id, close.video_id);
    }

    #[test]
    fn test_embedding_text() {
        let mut video = Video::fixture("Pasta", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        video.hook = Some("  You're doing it wrong ".to_string());
        video.script = Some("".to_string());
        video.theme = Some("cooking".to_string());
        assert_eq!(embedding_text(&video), "Pasta\nYou're doing it wrong\ncooking");

        let blank = Video::fixture("  ", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(embedding_text(&blank), "");
    }
}
