use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;
use utoipa::ToSchema;
use uuid::Uuid;

/// A notification about a forum post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants, ToSchema)]
#[strum_discriminants(name(PostNotificationType))]
#[strum_discriminants(derive(strum::Display, Hash))]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum PostNotification {
    /// A post was published in a category the recipient subscribes to.
    #[serde(rename = "created")]
    #[strum_discriminants(strum(serialize = "created"))]
    Created {
        /// The new post.
        post_id: Uuid,
    },
    /// A comment was left on the recipient's post.
    #[serde(rename = "comment.created")]
    #[strum_discriminants(strum(serialize = "comment.created"))]
    CommentCreated {
        /// Post the comment was left on.
        post_id: Uuid,
        /// The new comment.
        comment_id: Uuid,
    },
    /// Someone replied to the recipient's comment on a post.
    #[serde(rename = "comment.replied")]
    #[strum_discriminants(strum(serialize = "comment.replied"))]
    CommentReplied {
        /// Post the comment was left on.
        post_id: Uuid,
        /// The reply.
        comment_id: Uuid,
    },
    /// The recipient was mentioned in a post body.
    #[serde(rename = "mention.created")]
    #[strum_discriminants(strum(serialize = "mention.created"))]
    MentionCreated {
        /// Post holding the mention.
        post_id: Uuid,
        /// Identifier of the mention node.
        mention_id: Uuid,
    },
    /// The recipient was mentioned in a comment on a post.
    #[serde(rename = "comment.mention.created")]
    #[strum_discriminants(strum(serialize = "comment.mention.created"))]
    CommentMentionCreated {
        /// Post the comment was left on.
        post_id: Uuid,
        /// The comment holding the mention.
        comment_id: Uuid,
        /// Identifier of the mention node.
        mention_id: Uuid,
    },
}

impl PostNotification {
    /// The dotted type discriminant.
    pub fn notification_type(&self) -> PostNotificationType {
        self.into()
    }

    pub(crate) fn reference_ids(&self) -> (Uuid, Option<Uuid>) {
        match self {
            Self::Created { post_id } => (*post_id, None),
            Self::CommentCreated { post_id, comment_id } | Self::CommentReplied { post_id, comment_id } => {
                (*post_id, Some(*comment_id))
            }
            Self::MentionCreated { post_id, mention_id } => (*post_id, Some(*mention_id)),
            Self::CommentMentionCreated { post_id, mention_id, .. } => (*post_id, Some(*mention_id)),
        }
    }
}
