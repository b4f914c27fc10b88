//! Population normalizers for scoreable metrics

use serde::{Deserialize, Serialize};

use super::derived::DerivedMetrics;
use super::stats::{self, rank_from_count, z_from};
use crate::models::Video;

/// Metrics that can be ranked, normalized, sorted on and compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Views,
    Likes,
    Comments,
    Shares,
    Saves,
    EngagementRate,
    RetentionRate,
    #[serde(rename = "saves_per_1k")]
    SavesPer1k,
    ForYouPercentage,
    #[serde(rename = "f_per_1k")]
    FPer1k,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::Views,
        Metric::Likes,
        Metric::Comments,
        Metric::Shares,
        Metric::Saves,
        Metric::EngagementRate,
        Metric::RetentionRate,
        Metric::SavesPer1k,
        Metric::ForYouPercentage,
        Metric::FPer1k,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Views => "views",
            Metric::Likes => "likes",
            Metric::Comments => "comments",
            Metric::Shares => "shares",
            Metric::Saves => "saves",
            Metric::EngagementRate => "engagement_rate",
            Metric::RetentionRate => "retention_rate",
            Metric::SavesPer1k => "saves_per_1k",
            Metric::ForYouPercentage => "for_you_percentage",
            Metric::FPer1k => "f_per_1k",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Metric::ALL.into_iter().find(|m| m.as_str() == s)
    }

    /// Read this metric from a video and its derived rates
    pub fn value(&self, video: &Video, derived: &DerivedMetrics) -> f64 {
        match self {
            Metric::Views => video.views as f64,
            Metric::Likes => video.likes as f64,
            Metric::Comments => video.comments as f64,
            Metric::Shares => video.shares as f64,
            Metric::Saves => video.saves as f64,
            Metric::EngagementRate => derived.engagement_rate,
            Metric::RetentionRate => derived.retention_rate,
            Metric::SavesPer1k => derived.saves_per_1k,
            Metric::ForYouPercentage => derived.for_you_percentage,
            Metric::FPer1k => derived.f_per_1k,
        }
    }
}

/// A value placed within its population
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedScore {
    pub value: f64,
    pub z_score: f64,
    pub percentile: u8,
}

/// Precomputed mean, spread and sorted values of one population.
///
/// Ranking many values against the same population costs one sort plus a
/// binary search per value, and agrees exactly with [`stats::percentile`].
#[derive(Debug, Clone)]
pub struct MetricNormalizer {
    sorted: Vec<f64>,
    mean: f64,
    stddev: f64,
}

impl MetricNormalizer {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values
            .into_iter()
            .map(|v| if v.is_finite() { v } else { 0.0 })
            .collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = stats::mean(&sorted);
        let stddev = stats::stddev(&sorted);

        Self {
            sorted,
            mean,
            stddev,
        }
    }

    /// Normalizer for one metric across a scored population
    pub fn for_metric(metric: Metric, videos: &[Video], derived: &[DerivedMetrics]) -> Self {
        Self::new(
            videos
                .iter()
                .zip(derived)
                .map(|(video, d)| metric.value(video, d)),
        )
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn stddev(&self) -> f64 {
        self.stddev
    }

    pub fn percentile(&self, value: f64) -> u8 {
        let at_or_below = self.sorted.partition_point(|p| *p <= value);
        rank_from_count(at_or_below, self.sorted.len())
    }

    pub fn z_score(&self, value: f64) -> f64 {
        z_from(value, self.mean, self.stddev)
    }

    pub fn score(&self, value: f64) -> NormalizedScore {
        NormalizedScore {
            value,
            z_score: self.z_score(value),
            percentile: self.percentile(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_linear_percentile() {
        let population = vec![12.0, 3.0, 7.0, 7.0, 0.0, 25.0, 7.0, 18.0, 3.0];
        let normalizer = MetricNormalizer::new(population.clone());

        for value in [-1.0, 0.0, 3.0, 5.0, 7.0, 7.5, 18.0, 25.0, 30.0] {
            assert_eq!(
                normalizer.percentile(value),
                stats::percentile(value, &population),
                "value {}",
                value
            );
            assert!((normalizer.z_score(value) - stats::z_score(value, &population)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_non_finite_values_are_zeroed() {
        let normalizer = MetricNormalizer::new([f64::NAN, 1.0, f64::INFINITY]);
        assert_eq!(normalizer.len(), 3);
        assert_eq!(normalizer.percentile(0.0), 67);
        assert!(normalizer.mean().is_finite());
    }

    #[test]
    fn test_metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_str(metric.as_str()), Some(metric));
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.as_str()));
        }
        assert_eq!(Metric::from_str("viral_index"), None);
    }
}
