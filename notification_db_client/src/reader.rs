//! The inbox projection served by the notification list endpoint.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// One entry of a user's notification inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListItem {
    /// The notification.
    pub id: Uuid,
    /// Family group key, e.g. `proposal`.
    pub group: String,
    /// Dotted type key within the family.
    #[serde(rename = "type")]
    pub notification_type: String,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// The user whose action caused it.
    pub created_by: Uuid,
    /// Whether the recipient has opened it.
    pub seen: bool,
}

/// A user's notifications in one space, newest first. Archived entries are
/// never listed; `unread_only` additionally hides seen ones.
#[tracing::instrument(skip(db))]
pub async fn list_for_user(
    db: &Pool<Postgres>,
    space_id: Uuid,
    user_id: Uuid,
    unread_only: bool,
) -> anyhow::Result<Vec<NotificationListItem>> {
    sqlx::query_as(
        r#"
        SELECT
            metadata."id" AS id,
            notification."group" AS "group",
            notification."type" AS notification_type,
            metadata."createdAt" AS created_at,
            metadata."createdBy" AS created_by,
            metadata."seenAt" IS NOT NULL AS seen
        FROM "NotificationMetadata" metadata
        JOIN "Notification" notification ON notification."id" = metadata."id"
        WHERE metadata."spaceId" = $1
          AND metadata."userId" = $2
          AND metadata."archivedAt" IS NULL
          AND (NOT $3 OR metadata."seenAt" IS NULL)
        ORDER BY metadata."createdAt" DESC
        "#,
    )
    .bind(space_id)
    .bind(user_id)
    .bind(unread_only)
    .fetch_all(db)
    .await
    .context("unable to list notifications")
}
