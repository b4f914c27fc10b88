//! Follower history: deltas and point-in-time lookups

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::FollowersSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FollowerDelta {
    pub recorded_on: NaiveDate,
    pub follower_count: i64,
    /// Change since the previous snapshot (0 for the first one)
    pub delta: i64,
}

fn sorted(history: &[FollowersSnapshot]) -> Vec<FollowersSnapshot> {
    let mut snapshots = history.to_vec();
    snapshots.sort_by_key(|s| s.recorded_on);
    snapshots
}

/// Snapshots in date order, each with its change from the one before
pub fn deltas(history: &[FollowersSnapshot]) -> Vec<FollowerDelta> {
    let mut previous: Option<i64> = None;
    sorted(history)
        .into_iter()
        .map(|s| {
            let delta = previous.map_or(0, |p| s.follower_count - p);
            previous = Some(s.follower_count);
            FollowerDelta {
                recorded_on: s.recorded_on,
                follower_count: s.follower_count,
                delta,
            }
        })
        .collect()
}

/// Follower count of the latest snapshot on or before `date`
pub fn followers_at(history: &[FollowersSnapshot], date: NaiveDate) -> Option<i64> {
    history
        .iter()
        .filter(|s| s.recorded_on <= date)
        .max_by_key(|s| s.recorded_on)
        .map(|s| s.follower_count)
}

/// Followers gained over `[start, end]`.
///
/// When nothing precedes `start`, the earliest snapshot inside the range is
/// the baseline. Missing data on either side yields 0.
pub fn gained_between(history: &[FollowersSnapshot], start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }

    let baseline = followers_at(history, start).or_else(|| {
        history
            .iter()
            .filter(|s| s.recorded_on >= start && s.recorded_on <= end)
            .min_by_key(|s| s.recorded_on)
            .map(|s| s.follower_count)
    });

    match (baseline, followers_at(history, end)) {
        (Some(from), Some(to)) => to.saturating_sub(from),
        _ => 0,
    }
}

/// Most recent follower count
pub fn latest(history: &[FollowersSnapshot]) -> Option<i64> {
    history
        .iter()
        .max_by_key(|s| s.recorded_on)
        .map(|s| s.follower_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn snap(d: u32, count: i64) -> FollowersSnapshot {
        FollowersSnapshot {
            recorded_on: day(d),
            follower_count: count,
        }
    }

    fn history() -> Vec<FollowersSnapshot> {
        // Deliberately out of order
        vec![snap(10, 1_300), snap(1, 1_000), snap(5, 1_120), snap(20, 1_250)]
    }

    #[test]
    fn test_deltas_sorted_by_date() {
        let d = deltas(&history());
        let days: Vec<u32> = d.iter().map(|x| x.recorded_on.day()).collect();
        assert_eq!(days, [1, 5, 10, 20]);
        let changes: Vec<i64> = d.iter().map(|x| x.delta).collect();
        assert_eq!(changes, [0, 120, 180, -50]);
    }

    #[test]
    fn test_followers_at_picks_latest_prior_snapshot() {
        let h = history();
        assert_eq!(followers_at(&h, day(5)), Some(1_120));
        assert_eq!(followers_at(&h, day(7)), Some(1_120));
        assert_eq!(followers_at(&h, day(31)), Some(1_250));
        assert_eq!(
            followers_at(&h, NaiveDate::from_ymd_opt(2025, 4, 30).unwrap()),
            None
        );
    }

    #[test]
    fn test_gained_between() {
        let h = history();
        assert_eq!(gained_between(&h, day(1), day(10)), 300);
        assert_eq!(gained_between(&h, day(6), day(25)), 130);
        // Nothing before the start: the first snapshot in range is the baseline
        let early = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(gained_between(&h, early, day(10)), 300);
        assert_eq!(gained_between(&h, day(10), day(1)), 0);
        assert_eq!(gained_between(&[], day(1), day(10)), 0);
    }

    #[test]
    fn test_latest() {
        assert_eq!(latest(&history()), Some(1_250));
        assert_eq!(latest(&[]), None);
    }
}
