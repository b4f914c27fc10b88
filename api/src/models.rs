//! Shared data models used across modules

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A video row from the `videos` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub title: String,
    pub published_at: NaiveDate,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub saves: i64,
    pub new_followers: i64,
    pub traffic_for_you: i64,
    pub traffic_profile: i64,
    pub traffic_hashtag: i64,
    pub traffic_sound: i64,
    pub traffic_search: i64,
    pub duration_seconds: f64,
    pub avg_watch_time: f64,
    pub hook: Option<String>,
    pub script: Option<String>,
    pub theme: Option<String>,
    pub cta_type: Option<String>,
    pub editing_style: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a video (manual entry or CSV import)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewVideo {
    pub title: String,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub shares: i64,
    #[serde(default)]
    pub saves: i64,
    #[serde(default)]
    pub new_followers: i64,
    #[serde(default)]
    pub traffic_for_you: i64,
    #[serde(default)]
    pub traffic_profile: i64,
    #[serde(default)]
    pub traffic_hashtag: i64,
    #[serde(default)]
    pub traffic_sound: i64,
    #[serde(default)]
    pub traffic_search: i64,
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub avg_watch_time: f64,
    pub hook: Option<String>,
    pub script: Option<String>,
    pub theme: Option<String>,
    pub cta_type: Option<String>,
    pub editing_style: Option<String>,
}

/// Partial update of a video; `None` fields are left untouched
///
/// The free-text tags are nullable, so they distinguish a missing key
/// (`None`) from an explicit `null` (`Some(None)`, clears the column).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub published_at: Option<NaiveDate>,
    pub views: Option<i64>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub shares: Option<i64>,
    pub saves: Option<i64>,
    pub new_followers: Option<i64>,
    pub traffic_for_you: Option<i64>,
    pub traffic_profile: Option<i64>,
    pub traffic_hashtag: Option<i64>,
    pub traffic_sound: Option<i64>,
    pub traffic_search: Option<i64>,
    pub duration_seconds: Option<f64>,
    pub avg_watch_time: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub hook: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub script: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub theme: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub cta_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub editing_style: Option<Option<String>>,
}

/// Any value for a key that is present, `null` included
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A date-stamped follower count from `followers_history`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowersSnapshot {
    pub recorded_on: NaiveDate,
    pub follower_count: i64,
}

/// A row from `profiles`; `id` is the auth user id
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

/// Creator-supplied account context fed into AI prompts
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccountContext {
    pub niche: Option<String>,
    pub target_audience: Option<String>,
    pub goals: Option<String>,
    pub tone: Option<String>,
    #[serde(default, skip_deserializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Stored output of a growth insights generation
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GrowthInsightRecord {
    pub id: Uuid,
    pub insights: sqlx::types::Json<serde_json::Value>,
    pub fallback: bool,
    pub created_at: DateTime<Utc>,
}

/// Thumbs up/down on a generated idea
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct IdeaFeedback {
    pub id: Uuid,
    pub idea_title: String,
    pub idea_summary: Option<String>,
    pub liked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewIdeaFeedback {
    pub idea_title: String,
    pub idea_summary: Option<String>,
    pub liked: bool,
}

/// An embedded video in `tiktok_brain_vectors`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrainVector {
    pub video_id: Uuid,
    pub content: String,
    pub embedding: Vec<f32>,
    pub model: String,
}

#[cfg(test)]
impl Video {
    /// Zeroed video for tests; callers override the counters they need
    pub fn fixture(title: &str, published_at: NaiveDate) -> Self {
        Video {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: title.to_string(),
            published_at,
            views: 0,
            likes: 0,
            comments: 0,
            shares: 0,
            saves: 0,
            new_followers: 0,
            traffic_for_you: 0,
            traffic_profile: 0,
            traffic_hashtag: 0,
            traffic_sound: 0,
            traffic_search: 0,
            duration_seconds: 0.0,
            avg_watch_time: 0.0,
            hook: None,
            script: None,
            theme: None,
            cta_type: None,
            editing_style: None,
            created_at: Utc::now(),
        }
    }
}
