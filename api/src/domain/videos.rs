//! Video domain - DB queries for the `videos` table

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{NewVideo, Video, VideoPatch};

// Column list shared by every query returning a `Video`
macro_rules! video_columns {
    () => {
        "id, user_id, title, published_at, views, likes, comments, shares, saves, \
         new_followers, traffic_for_you, traffic_profile, traffic_hashtag, traffic_sound, \
         traffic_search, duration_seconds, avg_watch_time, hook, script, theme, cta_type, \
         editing_style, created_at"
    };
}

/// All videos of a user, newest first
///
/// Scoring needs the whole catalogue, so this is not paginated.
pub async fn list_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(concat!(
        "SELECT ",
        video_columns!(),
        " FROM videos WHERE user_id = $1 ORDER BY published_at DESC, created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn get<'e, E>(executor: E, user_id: Uuid, id: Uuid) -> Result<Option<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(concat!(
        "SELECT ",
        video_columns!(),
        " FROM videos WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Insert a video
pub async fn insert<'e, E>(executor: E, user_id: Uuid, video: &NewVideo) -> Result<Video, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(concat!(
        r#"
        INSERT INTO videos (
            user_id, title, published_at, views, likes, comments, shares, saves,
            new_followers, traffic_for_you, traffic_profile, traffic_hashtag, traffic_sound,
            traffic_search, duration_seconds, avg_watch_time, hook, script, theme, cta_type,
            editing_style
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
        RETURNING "#,
        video_columns!()
    ))
    .bind(user_id)
    .bind(&video.title)
    .bind(video.published_at)
    .bind(video.views)
    .bind(video.likes)
    .bind(video.comments)
    .bind(video.shares)
    .bind(video.saves)
    .bind(video.new_followers)
    .bind(video.traffic_for_you)
    .bind(video.traffic_profile)
    .bind(video.traffic_hashtag)
    .bind(video.traffic_sound)
    .bind(video.traffic_search)
    .bind(video.duration_seconds)
    .bind(video.avg_watch_time)
    .bind(&video.hook)
    .bind(&video.script)
    .bind(&video.theme)
    .bind(&video.cta_type)
    .bind(&video.editing_style)
    .fetch_one(executor)
    .await
}

/// Partial update; absent fields keep their stored value, `null` clears a text tag
pub async fn update<'e, E>(
    executor: E,
    user_id: Uuid,
    id: Uuid,
    patch: &VideoPatch,
) -> Result<Option<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(concat!(
        r#"
        UPDATE videos SET
            title = COALESCE($3, title),
            published_at = COALESCE($4, published_at),
            views = COALESCE($5, views),
            likes = COALESCE($6, likes),
            comments = COALESCE($7, comments),
            shares = COALESCE($8, shares),
            saves = COALESCE($9, saves),
            new_followers = COALESCE($10, new_followers),
            traffic_for_you = COALESCE($11, traffic_for_you),
            traffic_profile = COALESCE($12, traffic_profile),
            traffic_hashtag = COALESCE($13, traffic_hashtag),
            traffic_sound = COALESCE($14, traffic_sound),
            traffic_search = COALESCE($15, traffic_search),
            duration_seconds = COALESCE($16, duration_seconds),
            avg_watch_time = COALESCE($17, avg_watch_time),
            hook = CASE WHEN $23 THEN $18 ELSE hook END,
            script = CASE WHEN $24 THEN $19 ELSE script END,
            theme = CASE WHEN $25 THEN $20 ELSE theme END,
            cta_type = CASE WHEN $26 THEN $21 ELSE cta_type END,
            editing_style = CASE WHEN $27 THEN $22 ELSE editing_style END
        WHERE id = $1 AND user_id = $2
        RETURNING "#,
        video_columns!()
    ))
    .bind(id)
    .bind(user_id)
    .bind(&patch.title)
    .bind(patch.published_at)
    .bind(patch.views)
    .bind(patch.likes)
    .bind(patch.comments)
    .bind(patch.shares)
    .bind(patch.saves)
    .bind(patch.new_followers)
    .bind(patch.traffic_for_you)
    .bind(patch.traffic_profile)
    .bind(patch.traffic_hashtag)
    .bind(patch.traffic_sound)
    .bind(patch.traffic_search)
    .bind(patch.duration_seconds)
    .bind(patch.avg_watch_time)
    .bind(cleared_or_set(&patch.hook))
    .bind(cleared_or_set(&patch.script))
    .bind(cleared_or_set(&patch.theme))
    .bind(cleared_or_set(&patch.cta_type))
    .bind(cleared_or_set(&patch.editing_style))
    .bind(patch.hook.is_some())
    .bind(patch.script.is_some())
    .bind(patch.theme.is_some())
    .bind(patch.cta_type.is_some())
    .bind(patch.editing_style.is_some())
    .fetch_optional(executor)
    .await
}

/// New value for a nullable text column; only written when the key was present
fn cleared_or_set(field: &Option<Option<String>>) -> Option<&str> {
    field.as_ref().and_then(|v| v.as_deref())
}

/// Delete a video; returns whether a row was removed
pub async fn delete<'e, E>(executor: E, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM videos WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleared_or_set() {
        let patch: VideoPatch =
            serde_json::from_str(r#"{"hook": null, "theme": "cooking"}"#).unwrap();
        assert_eq!(cleared_or_set(&patch.hook), None);
        assert!(patch.hook.is_some());
        assert_eq!(cleared_or_set(&patch.theme), Some("cooking"));
        assert_eq!(cleared_or_set(&patch.script), None);
        assert!(patch.script.is_none());
    }
}
