//! The single write path: one notification, persisted atomically.

use model_notifications::{NotificationMetadata, NotificationRecord};
use notification_fanout::store::NotificationStoreError;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_error) if db_error.is_unique_violation())
}

fn write_error(error: sqlx::Error) -> NotificationStoreError {
    NotificationStoreError::Write(error.into())
}

/// Persist a notification's metadata and typed record in one transaction.
///
/// A duplicate-key violation on the dedup index means an identical
/// notification already exists; that rolls the transaction back and returns
/// `Ok(None)` so redelivered webhook events stay no-ops.
#[tracing::instrument(
    skip(db, metadata, record),
    fields(
        notification_id = %metadata.id,
        user_id = %metadata.user_id,
        notification_type = %record.type_key(),
    )
)]
pub async fn create_notification(
    db: &Pool<Postgres>,
    metadata: &NotificationMetadata,
    record: &NotificationRecord,
) -> Result<Option<Uuid>, NotificationStoreError> {
    let payload = serde_json::to_value(record)
        .map_err(|error| NotificationStoreError::Write(error.into()))?;
    let (primary_reference_id, secondary_reference_id) = record.reference_ids();

    let mut transaction = db.begin().await.map_err(write_error)?;

    sqlx::query(
        r#"
        INSERT INTO "NotificationMetadata"
            ("id", "spaceId", "userId", "createdBy", "createdAt", "seenAt", "archivedAt")
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(metadata.id)
    .bind(metadata.space_id)
    .bind(metadata.user_id)
    .bind(metadata.created_by)
    .bind(metadata.created_at)
    .bind(metadata.seen_at)
    .bind(metadata.archived_at)
    .execute(&mut *transaction)
    .await
    .map_err(write_error)?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO "Notification"
            ("id", "userId", "spaceId", "group", "type", "payload",
             "primaryReferenceId", "secondaryReferenceId")
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(metadata.id)
    .bind(metadata.user_id)
    .bind(metadata.space_id)
    .bind(record.group().to_string())
    .bind(record.type_key())
    .bind(payload)
    .bind(primary_reference_id)
    .bind(secondary_reference_id)
    .execute(&mut *transaction)
    .await;

    if let Err(error) = inserted {
        if is_unique_violation(&error) {
            tracing::debug!("notification already recorded, dropping duplicate");
            return Ok(None);
        }
        return Err(write_error(error));
    }

    transaction.commit().await.map_err(write_error)?;
    Ok(Some(metadata.id))
}
