//! Video explorer: filter, sort and page a scored catalogue

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::normalize::Metric;
use super::scoring::ScoredVideo;
use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    PublishedAt,
    ViralIndex,
    Metric(Metric),
}

impl SortKey {
    /// Unknown keys fall back to publish date
    pub fn from_str(s: Option<&str>) -> Self {
        match s {
            Some("published_at") | None => SortKey::PublishedAt,
            Some("viral_index") => SortKey::ViralIndex,
            Some(other) => Metric::from_str(other)
                .map(SortKey::Metric)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query string of `GET /videos`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExplorerQuery {
    pub search: Option<String>,
    pub theme: Option<String>,
    pub cta_type: Option<String>,
    pub editing_style: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub viral_only: bool,
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ExplorerPage {
    pub videos: Vec<ScoredVideo>,
    pub total: i64,
    pub has_more: bool,
}

fn tag_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted.map(str::trim).filter(|w| !w.is_empty()) {
        None => true,
        Some(w) => actual.is_some_and(|a| a.trim().eq_ignore_ascii_case(w)),
    }
}

impl ExplorerQuery {
    fn matches(&self, scored: &ScoredVideo) -> bool {
        let video = &scored.video;

        if let Some(needle) = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
        {
            let in_title = video.title.to_lowercase().contains(&needle);
            let in_hook = video
                .hook
                .as_deref()
                .is_some_and(|h| h.to_lowercase().contains(&needle));
            if !in_title && !in_hook {
                return false;
            }
        }

        if self.from.is_some_and(|from| video.published_at < from)
            || self.to.is_some_and(|to| video.published_at > to)
        {
            return false;
        }

        if self.viral_only && !scored.viral.is_viral {
            return false;
        }

        tag_matches(self.theme.as_deref(), video.theme.as_deref())
            && tag_matches(self.cta_type.as_deref(), video.cta_type.as_deref())
            && tag_matches(self.editing_style.as_deref(), video.editing_style.as_deref())
    }

    fn compare(key: SortKey, a: &ScoredVideo, b: &ScoredVideo) -> Ordering {
        match key {
            SortKey::PublishedAt => a
                .video
                .published_at
                .cmp(&b.video.published_at)
                .then(a.video.created_at.cmp(&b.video.created_at)),
            SortKey::ViralIndex => a.viral.index.total_cmp(&b.viral.index),
            SortKey::Metric(m) => a.metric(m).total_cmp(&b.metric(m)),
        }
    }

    /// Filter and sort the already-scored catalogue, then page the result.
    ///
    /// Percentiles stay relative to the full catalogue, not the filtered set.
    pub fn apply(&self, scored: Vec<ScoredVideo>) -> ExplorerPage {
        let key = SortKey::from_str(self.sort.as_deref());
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let mut matching: Vec<ScoredVideo> =
            scored.into_iter().filter(|s| self.matches(s)).collect();

        matching.sort_by(|a, b| {
            let ordering = Self::compare(key, a, b);
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as i64;
        // Offset comes from the query string; anything past the end is an empty page
        let offset = self.offset.unwrap_or(0).clamp(0, total);
        let videos: Vec<ScoredVideo> = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        ExplorerPage {
            videos,
            total,
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::score_videos;
    use crate::models::Video;

    fn catalogue() -> Vec<ScoredVideo> {
        let mk = |title: &str, day: u32, views: i64, theme: Option<&str>| {
            let mut v = Video::fixture(title, NaiveDate::from_ymd_opt(2025, 4, day).unwrap());
            v.views = views;
            v.likes = views / 20;
            v.theme = theme.map(str::to_string);
            v
        };
        score_videos(vec![
            mk("Morning routine", 1, 1_200, Some("Lifestyle")),
            mk("Budget hacks", 3, 48_000, Some("Finance")),
            mk("Routine part 2", 7, 5_300, Some("lifestyle")),
            mk("Q&A", 9, 800, None),
        ])
    }

    fn titles(page: &ExplorerPage) -> Vec<&str> {
        page.videos.iter().map(|s| s.video.title.as_str()).collect()
    }

    #[test]
    fn test_default_sort_newest_first() {
        let page = ExplorerQuery::default().apply(catalogue());
        assert_eq!(
            titles(&page),
            ["Q&A", "Routine part 2", "Budget hacks", "Morning routine"]
        );
        assert_eq!(page.total, 4);
        assert!(!page.has_more);
    }

    #[test]
    fn test_search_and_tag_filters() {
        let query = ExplorerQuery {
            search: Some("ROUTINE".into()),
            theme: Some("lifestyle".into()),
            ..Default::default()
        };
        let page = query.apply(catalogue());
        assert_eq!(titles(&page), ["Routine part 2", "Morning routine"]);
        // Percentiles are still relative to all four videos
        assert_eq!(page.videos[0].percentiles.views, 75);
    }

    #[test]
    fn test_sort_by_metric_and_paginate() {
        let query = ExplorerQuery {
            sort: Some("views".into()),
            order: SortOrder::Asc,
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        };
        let page = query.apply(catalogue());
        assert_eq!(titles(&page), ["Morning routine", "Routine part 2"]);
        assert_eq!(page.total, 4);
        assert!(page.has_more);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let query = ExplorerQuery {
            from: NaiveDate::from_ymd_opt(2025, 4, 3),
            to: NaiveDate::from_ymd_opt(2025, 4, 7),
            ..Default::default()
        };
        assert_eq!(
            titles(&query.apply(catalogue())),
            ["Routine part 2", "Budget hacks"]
        );
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!(SortKey::from_str(None), SortKey::PublishedAt);
        assert_eq!(SortKey::from_str(Some("viral_index")), SortKey::ViralIndex);
        assert_eq!(
            SortKey::from_str(Some("saves_per_1k")),
            SortKey::Metric(Metric::SavesPer1k)
        );
        assert_eq!(SortKey::from_str(Some("bogus")), SortKey::PublishedAt);
    }

    fn catalogue_of(n: u32) -> Vec<ScoredVideo> {
        score_videos(
            (1..=n)
                .map(|i| {
                    let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
                        + chrono::Duration::days(i as i64);
                    Video::fixture(&format!("clip {}", i), day)
                })
                .collect(),
        )
    }

    #[test]
    fn test_limit_defaults_and_bounds() {
        let page = ExplorerQuery::default().apply(catalogue_of(120));
        assert_eq!(page.videos.len(), 50);
        assert_eq!(page.total, 120);
        assert!(page.has_more);

        let capped = ExplorerQuery {
            limit: Some(1000),
            ..Default::default()
        };
        let page = capped.apply(catalogue_of(120));
        assert_eq!(page.videos.len(), 100);
        assert!(page.has_more);

        let minimum = ExplorerQuery {
            limit: Some(0),
            ..Default::default()
        };
        let page = minimum.apply(catalogue_of(3));
        assert_eq!(page.videos.len(), 1);
        assert!(page.has_more);
    }

    #[test]
    fn test_offset_bounds() {
        let negative = ExplorerQuery {
            offset: Some(-5),
            limit: Some(2),
            ..Default::default()
        };
        let page = negative.apply(catalogue());
        assert_eq!(titles(&page), ["Q&A", "Routine part 2"]);
        assert!(page.has_more);

        let past_end = ExplorerQuery {
            offset: Some(10),
            ..Default::default()
        };
        let page = past_end.apply(catalogue());
        assert!(page.videos.is_empty());
        assert_eq!(page.total, 4);
        assert!(!page.has_more);

        let huge = ExplorerQuery {
            offset: Some(i64::MAX),
            limit: Some(i64::MAX),
            ..Default::default()
        };
        let page = huge.apply(catalogue());
        assert!(page.videos.is_empty());
        assert!(!page.has_more);
    }
}
