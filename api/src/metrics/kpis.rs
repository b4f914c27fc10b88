//! Dashboard KPIs for a trailing window and the window before it

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::derived::ratio;
use super::followers;
use super::scoring::ScoredVideo;
use super::stats;
use crate::models::FollowersSnapshot;

/// Aggregates over the videos published in one date range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodKpis {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub video_count: usize,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
    pub total_saves: i64,
    pub total_new_followers: i64,
    pub avg_views: f64,
    /// Interactions over views across the whole period, in percent
    pub engagement_rate: f64,
    /// Mean retention of the videos that have a duration
    pub avg_retention_rate: f64,
    pub saves_per_1k: f64,
    pub f_per_1k: f64,
    pub followers_gained: i64,
    pub viral_videos: usize,
}

/// Percent change of each headline KPI versus the previous period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiChanges {
    pub video_count: f64,
    pub total_views: f64,
    pub avg_views: f64,
    pub engagement_rate: f64,
    pub avg_retention_rate: f64,
    pub saves_per_1k: f64,
    pub f_per_1k: f64,
    pub followers_gained: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub window_days: i64,
    pub current: PeriodKpis,
    pub previous: PeriodKpis,
    pub changes: KpiChanges,
    pub current_followers: Option<i64>,
}

/// `(current - previous) / |previous| * 100`; 0 when there is no baseline
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    let change = (current - previous) / previous.abs() * 100.0;
    if change.is_finite() { change } else { 0.0 }
}

fn period(
    videos: &[ScoredVideo],
    history: &[FollowersSnapshot],
    start: NaiveDate,
    end: NaiveDate,
) -> PeriodKpis {
    let in_range: Vec<&ScoredVideo> = videos
        .iter()
        .filter(|s| s.video.published_at >= start && s.video.published_at <= end)
        .collect();

    // Counters are user-supplied; totals saturate instead of overflowing
    let sum = |f: fn(&ScoredVideo) -> i64| {
        in_range
            .iter()
            .fold(0i64, |acc, s| acc.saturating_add(f(s)))
    };
    let total_views = sum(|s| s.video.views);
    let total_likes = sum(|s| s.video.likes);
    let total_comments = sum(|s| s.video.comments);
    let total_shares = sum(|s| s.video.shares);
    let total_saves = sum(|s| s.video.saves);
    let total_new_followers = sum(|s| s.video.new_followers);

    let retention: Vec<f64> = in_range
        .iter()
        .filter(|s| s.video.duration_seconds > 0.0)
        .map(|s| s.metrics.retention_rate)
        .collect();

    let views = total_views as f64;

    PeriodKpis {
        start,
        end,
        video_count: in_range.len(),
        total_views,
        total_likes,
        total_comments,
        total_shares,
        total_saves,
        total_new_followers,
        avg_views: ratio(views, in_range.len() as f64, 1.0),
        engagement_rate: ratio(
            total_likes as f64 + total_comments as f64 + total_shares as f64,
            views,
            100.0,
        ),
        avg_retention_rate: stats::mean(&retention),
        saves_per_1k: ratio(total_saves as f64, views, 1000.0),
        f_per_1k: ratio(total_new_followers as f64, views, 1000.0),
        followers_gained: followers::gained_between(history, start, end),
        viral_videos: in_range.iter().filter(|s| s.viral.is_viral).count(),
    }
}

/// KPIs for the `days` ending at `today` (inclusive) and the equally long
/// window immediately before. `days` below 1 is treated as 1.
pub fn compute_kpis(
    videos: &[ScoredVideo],
    history: &[FollowersSnapshot],
    days: i64,
    today: NaiveDate,
) -> KpiSummary {
    let days = days.max(1);
    let current_start = today - Duration::days(days - 1);
    let previous_end = current_start - Duration::days(1);
    let previous_start = previous_end - Duration::days(days - 1);

    let current = period(videos, history, current_start, today);
    let previous = period(videos, history, previous_start, previous_end);

    let changes = KpiChanges {
        video_count: percent_change(previous.video_count as f64, current.video_count as f64),
        total_views: percent_change(previous.total_views as f64, current.total_views as f64),
        avg_views: percent_change(previous.avg_views, current.avg_views),
        engagement_rate: percent_change(previous.engagement_rate, current.engagement_rate),
        avg_retention_rate: percent_change(
            previous.avg_retention_rate,
            current.avg_retention_rate,
        ),
        saves_per_1k: percent_change(previous.saves_per_1k, current.saves_per_1k),
        f_per_1k: percent_change(previous.f_per_1k, current.f_per_1k),
        followers_gained: percent_change(
            previous.followers_gained as f64,
            current.followers_gained as f64,
        ),
    };

    KpiSummary {
        window_days: days,
        current,
        previous,
        changes,
        current_followers: followers::latest(history),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::score_videos;
    use crate::models::Video;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn video(published: NaiveDate, views: i64, likes: i64, saves: i64) -> Video {
        let mut v = Video::fixture("kpi", published);
        v.views = views;
        v.likes = likes;
        v.saves = saves;
        v.duration_seconds = 20.0;
        v.avg_watch_time = 10.0;
        v
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(100.0, 150.0), 50.0);
        assert_eq!(percent_change(200.0, 100.0), -50.0);
        assert_eq!(percent_change(-10.0, 10.0), 200.0);
        assert_eq!(percent_change(0.0, 500.0), 0.0);
    }

    #[test]
    fn test_windows_split_videos() {
        let today = date(6, 30);
        let scored = score_videos(vec![
            video(date(6, 30), 1_000, 100, 10),
            video(date(6, 24), 3_000, 60, 5),
            // previous 7-day window is 6/17..=6/23
            video(date(6, 23), 2_000, 40, 0),
            video(date(6, 17), 2_000, 40, 0),
            // outside both windows
            video(date(6, 16), 50_000, 5_000, 500),
        ]);

        let kpis = compute_kpis(&scored, &[], 7, today);
        assert_eq!(kpis.current.start, date(6, 24));
        assert_eq!(kpis.previous.start, date(6, 17));
        assert_eq!(kpis.previous.end, date(6, 23));

        assert_eq!(kpis.current.video_count, 2);
        assert_eq!(kpis.current.total_views, 4_000);
        assert_eq!(kpis.current.avg_views, 2_000.0);
        assert!((kpis.current.engagement_rate - 4.0).abs() < 1e-9);
        assert!((kpis.current.saves_per_1k - 3.75).abs() < 1e-9);
        assert!((kpis.current.avg_retention_rate - 50.0).abs() < 1e-9);

        assert_eq!(kpis.previous.video_count, 2);
        assert_eq!(kpis.changes.total_views, 0.0);
        assert!((kpis.changes.engagement_rate - 100.0).abs() < 1e-9);
        // No saves before: no baseline, so no change reported
        assert_eq!(kpis.changes.saves_per_1k, 0.0);
    }

    #[test]
    fn test_empty_catalogue_is_all_zero() {
        let kpis = compute_kpis(&[], &[], 30, date(6, 30));
        assert_eq!(kpis.current.video_count, 0);
        assert_eq!(kpis.current.avg_views, 0.0);
        assert_eq!(kpis.current.engagement_rate, 0.0);
        assert_eq!(kpis.current.avg_retention_rate, 0.0);
        assert_eq!(kpis.current_followers, None);
    }

    #[test]
    fn test_follower_growth() {
        let history = vec![
            FollowersSnapshot {
                recorded_on: date(6, 1),
                follower_count: 900,
            },
            FollowersSnapshot {
                recorded_on: date(6, 15),
                follower_count: 1_000,
            },
            FollowersSnapshot {
                recorded_on: date(6, 30),
                follower_count: 1_200,
            },
        ];
        let kpis = compute_kpis(&[], &history, 15, date(6, 30));
        // current 6/16..=6/30, baseline is the 6/15 snapshot
        assert_eq!(kpis.current.followers_gained, 200);
        // previous 6/1..=6/15
        assert_eq!(kpis.previous.followers_gained, 100);
        assert_eq!(kpis.changes.followers_gained, 100.0);
        assert_eq!(kpis.current_followers, Some(1_200));
    }

    #[test]
    fn test_non_positive_window() {
        let kpis = compute_kpis(&[], &[], 0, date(6, 30));
        assert_eq!(kpis.window_days, 1);
        assert_eq!(kpis.current.start, date(6, 30));
        assert_eq!(kpis.previous.end, date(6, 29));
    }

    #[test]
    fn test_huge_totals_saturate() {
        let today = date(6, 30);
        let scored = score_videos(vec![
            video(date(6, 29), i64::MAX, i64::MAX, i64::MAX),
            video(date(6, 30), i64::MAX, 1, 1),
        ]);

        let kpis = compute_kpis(&scored, &[], 7, today);
        assert_eq!(kpis.current.total_views, i64::MAX);
        assert_eq!(kpis.current.total_likes, i64::MAX);
        assert!(kpis.current.engagement_rate.is_finite());
        assert!(kpis.current.saves_per_1k.is_finite());
    }
}
