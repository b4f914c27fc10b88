//! Single-video breakdown against the rest of the catalogue

use serde::Serialize;
use uuid::Uuid;

use super::followers;
use super::normalize::{Metric, MetricNormalizer};
use super::scoring::ScoredVideo;
use crate::models::FollowersSnapshot;

/// Metrics shown side by side with the catalogue average
const COMPARED_METRICS: [Metric; 6] = [
    Metric::Views,
    Metric::EngagementRate,
    Metric::RetentionRate,
    Metric::SavesPer1k,
    Metric::FPer1k,
    Metric::ForYouPercentage,
];

#[derive(Debug, Clone, Serialize)]
pub struct MetricComparison {
    pub metric: Metric,
    pub value: f64,
    pub average: f64,
    /// Percent above (positive) or below the average; 0 without an average
    pub diff_pct: f64,
    pub z_score: f64,
    pub percentile: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoDetail {
    #[serde(flatten)]
    pub scored: ScoredVideo,
    pub comparisons: Vec<MetricComparison>,
    /// 1-based position by views within the catalogue
    pub rank_by_views: usize,
    pub catalogue_size: usize,
    pub followers_at_post: Option<i64>,
    /// Followers gained from the post-time snapshot up to the latest one
    pub followers_since_post: Option<i64>,
}

/// Build the detail view for `video_id`, or `None` if it is not in `scored`
pub fn video_detail(
    scored: Vec<ScoredVideo>,
    video_id: Uuid,
    history: &[FollowersSnapshot],
) -> Option<VideoDetail> {
    let position = scored.iter().position(|s| s.video.id == video_id)?;

    let comparisons = COMPARED_METRICS
        .into_iter()
        .map(|metric| {
            let normalizer = MetricNormalizer::new(scored.iter().map(|s| s.metric(metric)));
            let value = scored[position].metric(metric);
            let average = normalizer.mean();
            let diff_pct = if average != 0.0 {
                (value - average) / average.abs() * 100.0
            } else {
                0.0
            };
            let normalized = normalizer.score(value);

            MetricComparison {
                metric,
                value,
                average,
                diff_pct,
                z_score: normalized.z_score,
                percentile: normalized.percentile,
            }
        })
        .collect();

    let views = scored[position].video.views;
    let rank_by_views = 1 + scored.iter().filter(|s| s.video.views > views).count();
    let catalogue_size = scored.len();

    let published_at = scored[position].video.published_at;
    let followers_at_post = followers::followers_at(history, published_at);
    let followers_since_post = followers_at_post
        .zip(followers::latest(history))
        .map(|(at_post, now)| now - at_post);

    let scored = scored.into_iter().nth(position)?;

    Some(VideoDetail {
        scored,
        comparisons,
        rank_by_views,
        catalogue_size,
        followers_at_post,
        followers_since_post,
    })
}
