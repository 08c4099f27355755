use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;
use utoipa::ToSchema;
use uuid::Uuid;

/// A notification about a database card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants, ToSchema)]
#[strum_discriminants(name(CardNotificationType))]
#[strum_discriminants(derive(strum::Display, Hash))]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum CardNotification {
    /// The recipient was assigned through a person property on the card.
    #[serde(rename = "person_assigned")]
    #[strum_discriminants(strum(serialize = "person_assigned"))]
    PersonAssigned {
        /// The card the property belongs to.
        card_id: Uuid,
        /// The person property that now holds the recipient.
        person_property_id: Uuid,
    },
    /// A block comment was left on the recipient's card.
    #[serde(rename = "block_comment.created")]
    #[strum_discriminants(strum(serialize = "block_comment.created"))]
    BlockCommentCreated {
        /// Card the comment was left on.
        card_id: Uuid,
        /// The new block comment.
        block_comment_id: Uuid,
    },
    /// Someone replied to the recipient's block comment.
    #[serde(rename = "block_comment.replied")]
    #[strum_discriminants(strum(serialize = "block_comment.replied"))]
    BlockCommentReplied {
        /// Card the comment was left on.
        card_id: Uuid,
        /// The reply.
        block_comment_id: Uuid,
    },
    /// The recipient was mentioned inside a block comment.
    #[serde(rename = "block_comment.mention.created")]
    #[strum_discriminants(strum(serialize = "block_comment.mention.created"))]
    BlockCommentMentionCreated {
        /// Card the comment was left on.
        card_id: Uuid,
        /// The block comment holding the mention.
        block_comment_id: Uuid,
        /// Identifier of the mention node.
        mention_id: Uuid,
    },
}

impl CardNotification {
    /// The dotted type discriminant.
    pub fn notification_type(&self) -> CardNotificationType {
        self.into()
    }

    pub(crate) fn reference_ids(&self) -> (Uuid, Option<Uuid>) {
        match self {
            Self::PersonAssigned {
                card_id,
                person_property_id,
            } => (*card_id, Some(*person_property_id)),
            Self::BlockCommentCreated {
                card_id,
                block_comment_id,
            }
            | Self::BlockCommentReplied {
                card_id,
                block_comment_id,
            } => (*card_id, Some(*block_comment_id)),
            Self::BlockCommentMentionCreated { card_id, mention_id, .. } => (*card_id, Some(*mention_id)),
        }
    }
}
