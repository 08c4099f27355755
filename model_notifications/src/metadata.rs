use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Recipient, actor and lifecycle state of a stored notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMetadata {
    /// Identifier of the notification itself.
    pub id: Uuid,
    /// Space the triggering event happened in.
    pub space_id: Uuid,
    /// User the notification is addressed to.
    pub user_id: Uuid,
    /// User whose action caused the notification.
    pub created_by: Uuid,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the recipient first saw it, if they have.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen_at: Option<DateTime<Utc>>,
    /// When the recipient archived it, if they have.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl NotificationMetadata {
    /// Fresh metadata for a notification being created right now.
    pub fn new(space_id: Uuid, user_id: Uuid, created_by: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            space_id,
            user_id,
            created_by,
            created_at,
            seen_at: None,
            archived_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_metadata_omits_lifecycle_timestamps() {
        let metadata = NotificationMetadata::new(Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7(), Utc::now());

        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json.get("seenAt").is_none());
        assert!(json.get("archivedAt").is_none());
        assert!(json.get("userId").is_some());
    }
}
