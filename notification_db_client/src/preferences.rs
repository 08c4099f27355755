//! Per-space notification preference reads.

use anyhow::Context;
use model_notifications::NotificationToggles;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// The space's toggle map.
///
/// Spaces that never touched their settings carry a NULL column, and a space
/// missing entirely behaves the same way; both come back as the default
/// toggles with nothing switched off.
#[tracing::instrument(skip(db))]
pub async fn get_notification_toggles(
    db: &Pool<Postgres>,
    space_id: Uuid,
) -> anyhow::Result<NotificationToggles> {
    let raw: Option<Option<serde_json::Value>> = sqlx::query_scalar(
        r#"
        SELECT "notificationToggles"
        FROM "Space"
        WHERE "id" = $1
        "#,
    )
    .bind(space_id)
    .fetch_optional(db)
    .await
    .context("unable to load space notification toggles")?;

    match raw.flatten() {
        Some(value) => {
            serde_json::from_value(value).context("notification toggles are not a flag map")
        }
        None => Ok(NotificationToggles::new()),
    }
}
