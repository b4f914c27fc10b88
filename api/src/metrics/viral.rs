//! Viral index: a weighted composite of z-scores on a 0-10 scale

use serde::Serialize;

use super::derived::DerivedMetrics;
use super::normalize::MetricNormalizer;
use crate::constants::{
    VIRAL_INDEX_CENTER, VIRAL_INDEX_MAX, VIRAL_INDEX_THRESHOLD, VIRAL_MIN_VIEWS,
    VIRAL_WEIGHT_FOLLOWS, VIRAL_WEIGHT_FOR_YOU, VIRAL_WEIGHT_RETENTION, VIRAL_WEIGHT_SAVES,
    VIRAL_WEIGHT_VIEWS,
};
use crate::models::Video;

/// Z-scores feeding the index
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ViralComponents {
    /// z-score of ln(1 + views)
    pub views: f64,
    pub retention: f64,
    pub saves: f64,
    pub follows: f64,
    pub for_you: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViralScore {
    pub index: f64,
    pub is_viral: bool,
    pub components: ViralComponents,
}

impl ViralComponents {
    pub fn weighted_sum(&self) -> f64 {
        [
            (self.views, VIRAL_WEIGHT_VIEWS),
            (self.retention, VIRAL_WEIGHT_RETENTION),
            (self.saves, VIRAL_WEIGHT_SAVES),
            (self.follows, VIRAL_WEIGHT_FOLLOWS),
            (self.for_you, VIRAL_WEIGHT_FOR_YOU),
        ]
        .iter()
        .map(|(z, w)| if z.is_finite() { z * w } else { 0.0 })
        .sum()
    }
}

/// Recenter the weighted sum onto the scale and clamp it to [0, 10]
pub fn viral_index(components: &ViralComponents) -> f64 {
    let index = components.weighted_sum() + VIRAL_INDEX_CENTER;
    if index.is_finite() {
        index.clamp(0.0, VIRAL_INDEX_MAX)
    } else {
        VIRAL_INDEX_CENTER
    }
}

/// Both thresholds must hold: the index cutoff and the absolute view floor
pub fn is_viral(index: f64, views: i64) -> bool {
    index >= VIRAL_INDEX_THRESHOLD && views >= VIRAL_MIN_VIEWS
}

fn log_views(views: i64) -> f64 {
    (views.max(0) as f64).ln_1p()
}

/// Population statistics needed to score any video of the same catalogue
#[derive(Debug, Clone)]
pub struct ViralModel {
    log_views: MetricNormalizer,
    retention: MetricNormalizer,
    saves: MetricNormalizer,
    follows: MetricNormalizer,
    for_you: MetricNormalizer,
}

impl ViralModel {
    /// `derived[i]` must belong to `videos[i]`
    pub fn new(videos: &[Video], derived: &[DerivedMetrics]) -> Self {
        Self {
            log_views: MetricNormalizer::new(videos.iter().map(|v| log_views(v.views))),
            retention: MetricNormalizer::new(derived.iter().map(|d| d.retention_rate)),
            saves: MetricNormalizer::new(derived.iter().map(|d| d.saves_per_1k)),
            follows: MetricNormalizer::new(derived.iter().map(|d| d.f_per_1k)),
            for_you: MetricNormalizer::new(derived.iter().map(|d| d.for_you_percentage)),
        }
    }

    pub fn score(&self, video: &Video, derived: &DerivedMetrics) -> ViralScore {
        let components = ViralComponents {
            views: self.log_views.z_score(log_views(video.views)),
            retention: self.retention.z_score(derived.retention_rate),
            saves: self.saves.z_score(derived.saves_per_1k),
            follows: self.follows.z_score(derived.f_per_1k),
            for_you: self.for_you.z_score(derived.for_you_percentage),
        };
        let index = viral_index(&components);

        ViralScore {
            index,
            is_viral: is_viral(index, video.views),
            components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn components(z: f64) -> ViralComponents {
        ViralComponents {
            views: z,
            retention: z,
            saves: z,
            follows: z,
            for_you: z,
        }
    }

    #[test]
    fn test_index_is_centered() {
        assert_eq!(viral_index(&ViralComponents::default()), 5.0);
        // Weights sum to 1, so a uniform z of 1 lands at 6
        assert!((viral_index(&components(1.0)) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_index_is_clamped() {
        assert_eq!(viral_index(&components(1e9)), 10.0);
        assert_eq!(viral_index(&components(-1e9)), 0.0);
        assert_eq!(viral_index(&components(f64::INFINITY)), 5.0);
        assert_eq!(viral_index(&components(f64::NAN)), 5.0);
    }

    #[test]
    fn test_viral_needs_both_thresholds() {
        assert!(is_viral(6.5, 10_000));
        assert!(!is_viral(6.49, 1_000_000));
        assert!(!is_viral(9.9, 9_999));
    }

    #[test]
    fn test_model_flags_outlier() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut videos: Vec<Video> = (0..9)
            .map(|i| {
                let mut v = Video::fixture(&format!("baseline {}", i), date);
                v.views = 1_000 + i * 50;
                v.saves = 5;
                v.new_followers = 1;
                v.traffic_for_you = 500;
                v.duration_seconds = 30.0;
                v.avg_watch_time = 9.0;
                v
            })
            .collect();

        let mut hit = Video::fixture("hit", date);
        hit.views = 900_000;
        hit.saves = 40_000;
        hit.new_followers = 9_000;
        hit.traffic_for_you = 880_000;
        hit.duration_seconds = 30.0;
        hit.avg_watch_time = 27.0;
        videos.push(hit);

        let derived: Vec<DerivedMetrics> = videos.iter().map(DerivedMetrics::from_video).collect();
        let model = ViralModel::new(&videos, &derived);

        let hit_score = model.score(&videos[9], &derived[9]);
        assert!(hit_score.is_viral);
        assert!(hit_score.index > 6.5 && hit_score.index <= 10.0);

        let baseline = model.score(&videos[0], &derived[0]);
        assert!(!baseline.is_viral);
        assert!(baseline.index < 5.0);
    }

    #[test]
    fn test_single_video_population_is_neutral() {
        let mut v = Video::fixture("solo", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        v.views = 50_000;
        let derived = [DerivedMetrics::from_video(&v)];
        let score = ViralModel::new(std::slice::from_ref(&v), &derived).score(&v, &derived[0]);
        assert_eq!(score.index, 5.0);
        assert!(!score.is_viral);
    }
}
