//! Profile domain - DB queries for `profiles`

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::Profile;

/// Get a profile by auth user id
pub async fn get<'e, E>(executor: E, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as("SELECT id, username, display_name FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}
