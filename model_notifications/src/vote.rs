use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A notification that a poll opened for voting.
///
/// Polls only ever produce one notification type, so the family is a
/// struct with a fixed type key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteNotification {
    /// The poll that opened.
    pub vote_id: Uuid,
}

impl VoteNotification {
    /// Type key shared by every vote notification.
    pub const TYPE_KEY: &'static str = "new_vote";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_just_the_vote_reference() {
        let vote_id = Uuid::now_v7();
        let record = VoteNotification { vote_id };

        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json, serde_json::json!({ "voteId": vote_id }));
    }
}
