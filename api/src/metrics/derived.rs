//! Per-video rates computed from raw counters

use serde::Serialize;

use crate::models::Video;

/// `numerator / denominator * scale`, or 0 when the denominator is not positive
pub fn ratio(numerator: f64, denominator: f64, scale: f64) -> f64 {
    if denominator > 0.0 {
        let value = numerator / denominator * scale;
        if value.is_finite() { value } else { 0.0 }
    } else {
        0.0
    }
}

/// Rates derived from a single video's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// (likes + comments + shares) / views * 100
    pub engagement_rate: f64,
    /// avg watch time / duration * 100
    pub retention_rate: f64,
    pub saves_per_1k: f64,
    /// Share of views coming from the For You feed, in percent
    pub for_you_percentage: f64,
    /// New followers per 1,000 views
    pub f_per_1k: f64,
    pub like_rate: f64,
    pub comment_rate: f64,
    pub share_rate: f64,
    pub traffic: TrafficBreakdown,
}

/// Traffic sources as a percentage of views
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrafficBreakdown {
    pub for_you: f64,
    pub profile: f64,
    pub hashtag: f64,
    pub sound: f64,
    pub search: f64,
    /// Views not attributed to any known source
    pub other: f64,
}

impl DerivedMetrics {
    pub fn from_video(video: &Video) -> Self {
        let views = video.views as f64;
        let interactions = video.likes as f64 + video.comments as f64 + video.shares as f64;

        DerivedMetrics {
            engagement_rate: ratio(interactions, views, 100.0),
            retention_rate: ratio(video.avg_watch_time, video.duration_seconds, 100.0),
            saves_per_1k: ratio(video.saves as f64, views, 1000.0),
            for_you_percentage: ratio(video.traffic_for_you as f64, views, 100.0),
            f_per_1k: ratio(video.new_followers as f64, views, 1000.0),
            like_rate: ratio(video.likes as f64, views, 100.0),
            comment_rate: ratio(video.comments as f64, views, 100.0),
            share_rate: ratio(video.shares as f64, views, 100.0),
            traffic: TrafficBreakdown::from_video(video),
        }
    }
}

impl TrafficBreakdown {
    pub fn from_video(video: &Video) -> Self {
        let views = video.views as f64;
        let for_you = ratio(video.traffic_for_you as f64, views, 100.0);
        let profile = ratio(video.traffic_profile as f64, views, 100.0);
        let hashtag = ratio(video.traffic_hashtag as f64, views, 100.0);
        let sound = ratio(video.traffic_sound as f64, views, 100.0);
        let search = ratio(video.traffic_search as f64, views, 100.0);

        let other = if views > 0.0 {
            (100.0 - (for_you + profile + hashtag + sound + search)).max(0.0)
        } else {
            0.0
        };

        TrafficBreakdown {
            for_you,
            profile,
            hashtag,
            sound,
            search,
            other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn video() -> Video {
        Video::fixture("clip", NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
    }

    #[test]
    fn test_engagement_rate_example() {
        let mut v = video();
        v.views = 10_000;
        v.likes = 200;
        v.comments = 50;
        v.shares = 20;

        let m = DerivedMetrics::from_video(&v);
        assert!((m.engagement_rate - 2.7).abs() < 1e-9);
        assert!((m.like_rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_views_yields_zero_rates() {
        let mut v = video();
        v.likes = 50;
        v.comments = 3;
        v.shares = 8;
        v.saves = 12;
        v.new_followers = 4;
        v.traffic_for_you = 30;
        v.traffic_search = 9;

        let m = DerivedMetrics::from_video(&v);
        assert_eq!(m.engagement_rate, 0.0);
        assert_eq!(m.saves_per_1k, 0.0);
        assert_eq!(m.for_you_percentage, 0.0);
        assert_eq!(m.f_per_1k, 0.0);
        assert_eq!(m.like_rate, 0.0);
        assert_eq!(m.comment_rate, 0.0);
        assert_eq!(m.share_rate, 0.0);
        assert_eq!(m.traffic, TrafficBreakdown::default());
    }

    #[test]
    fn test_retention_requires_duration() {
        let mut v = video();
        v.views = 100;
        v.avg_watch_time = 12.0;
        assert_eq!(DerivedMetrics::from_video(&v).retention_rate, 0.0);

        v.duration_seconds = 30.0;
        assert!((DerivedMetrics::from_video(&v).retention_rate - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_per_thousand_rates() {
        let mut v = video();
        v.views = 4_000;
        v.saves = 10;
        v.new_followers = 6;
        v.traffic_for_you = 3_000;

        let m = DerivedMetrics::from_video(&v);
        assert!((m.saves_per_1k - 2.5).abs() < 1e-9);
        assert!((m.f_per_1k - 1.5).abs() < 1e-9);
        assert!((m.for_you_percentage - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_huge_counters_do_not_overflow() {
        let mut v = video();
        v.views = 1_000;
        v.likes = crate::import::parse_integer("99999999999999999999");
        v.comments = 5;
        v.shares = i64::MAX;

        let m = DerivedMetrics::from_video(&v);
        assert_eq!(v.likes, i64::MAX);
        assert!(m.engagement_rate.is_finite());
        assert!(m.engagement_rate > 0.0);
    }

    #[test]
    fn test_traffic_other_is_remainder() {
        let mut v = video();
        v.views = 1_000;
        v.traffic_for_you = 600;
        v.traffic_profile = 200;
        v.traffic_search = 100;

        let t = TrafficBreakdown::from_video(&v);
        assert!((t.other - 10.0).abs() < 1e-9);

        // Over-attributed sources never produce a negative remainder
        v.traffic_hashtag = 500;
        assert_eq!(TrafficBreakdown::from_video(&v).other, 0.0);
    }
}
