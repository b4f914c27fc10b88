//! Population scoring: every video enriched relative to its own catalogue

use serde::Serialize;

use super::derived::DerivedMetrics;
use super::normalize::{Metric, MetricNormalizer};
use super::viral::{ViralModel, ViralScore};
use crate::models::Video;

/// Percentile ranks of the headline metrics within the catalogue
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricPercentiles {
    pub views: u8,
    pub engagement_rate: u8,
    pub retention_rate: u8,
    pub saves_per_1k: u8,
    pub f_per_1k: u8,
    pub for_you_percentage: u8,
}

/// A video with everything derived from it and its population
#[derive(Debug, Clone, Serialize)]
pub struct ScoredVideo {
    #[serde(flatten)]
    pub video: Video,
    pub metrics: DerivedMetrics,
    pub percentiles: MetricPercentiles,
    pub viral: ViralScore,
}

impl ScoredVideo {
    pub fn metric(&self, metric: Metric) -> f64 {
        metric.value(&self.video, &self.metrics)
    }
}

/// Normalizers for every metric of one population, built once per request
#[derive(Debug, Clone)]
pub struct PopulationModel {
    /// Indexed by `Metric as usize`; `Metric::ALL` is in declaration order
    normalizers: Vec<MetricNormalizer>,
    viral: ViralModel,
}

impl PopulationModel {
    pub fn new(videos: &[Video], derived: &[DerivedMetrics]) -> Self {
        let normalizers = Metric::ALL
            .into_iter()
            .map(|m| MetricNormalizer::for_metric(m, videos, derived))
            .collect();

        Self {
            normalizers,
            viral: ViralModel::new(videos, derived),
        }
    }

    pub fn normalizer(&self, metric: Metric) -> &MetricNormalizer {
        &self.normalizers[metric as usize]
    }

    fn percentile(&self, metric: Metric, video: &Video, derived: &DerivedMetrics) -> u8 {
        self.normalizer(metric)
            .percentile(metric.value(video, derived))
    }

    pub fn score(&self, video: Video, derived: DerivedMetrics) -> ScoredVideo {
        let percentiles = MetricPercentiles {
            views: self.percentile(Metric::Views, &video, &derived),
            engagement_rate: self.percentile(Metric::EngagementRate, &video, &derived),
            retention_rate: self.percentile(Metric::RetentionRate, &video, &derived),
            saves_per_1k: self.percentile(Metric::SavesPer1k, &video, &derived),
            f_per_1k: self.percentile(Metric::FPer1k, &video, &derived),
            for_you_percentage: self.percentile(Metric::ForYouPercentage, &video, &derived),
        };
        let viral = self.viral.score(&video, &derived);

        ScoredVideo {
            video,
            metrics: derived,
            percentiles,
            viral,
        }
    }
}

/// Enrich every video against the whole population, preserving input order
pub fn score_videos(videos: Vec<Video>) -> Vec<ScoredVideo> {
    if videos.is_empty() {
        return Vec::new();
    }

    let derived: Vec<DerivedMetrics> = videos.iter().map(DerivedMetrics::from_video).collect();
    let model = PopulationModel::new(&videos, &derived);

    videos
        .into_iter()
        .zip(derived)
        .map(|(video, d)| model.score(video, d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn video(title: &str, views: i64, likes: i64) -> Video {
        let mut v = Video::fixture(title, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        v.views = views;
        v.likes = likes;
        v
    }

    #[test]
    fn test_empty_population() {
        assert!(score_videos(Vec::new()).is_empty());
    }

    #[test]
    fn test_preserves_order_and_ranks() {
        let scored = score_videos(vec![
            video("mid", 500, 10),
            video("low", 100, 1),
            video("high", 900, 90),
            video("zero", 0, 0),
        ]);

        let titles: Vec<&str> = scored.iter().map(|s| s.video.title.as_str()).collect();
        assert_eq!(titles, ["mid", "low", "high", "zero"]);

        assert_eq!(scored[2].percentiles.views, 100);
        assert_eq!(scored[0].percentiles.views, 75);
        assert_eq!(scored[1].percentiles.views, 50);
        assert_eq!(scored[3].percentiles.views, 25);

        // High has 10% engagement, the best of the four
        assert_eq!(scored[2].percentiles.engagement_rate, 100);
        assert_eq!(scored[3].metrics.engagement_rate, 0.0);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let scored = score_videos(vec![
            video("a", 0, 0),
            video("b", i64::MAX / 4, 3),
            video("c", 1, 1),
        ]);
        for s in &scored {
            assert!((0.0..=10.0).contains(&s.viral.index));
            assert!(s.percentiles.views <= 100);
            assert!(s.metrics.engagement_rate.is_finite());
        }
    }
}
