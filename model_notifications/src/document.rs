use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;
use utoipa::ToSchema;
use uuid::Uuid;

/// The surface a document notification points at.
///
/// Document bodies exist both on pages and on forum posts, so every
/// document notification carries exactly one of the two identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DocumentTarget {
    /// The document is a page.
    Page {
        /// Identifier of the page.
        #[serde(rename = "pageId")]
        page_id: Uuid,
    },
    /// The document is a forum post.
    Post {
        /// Identifier of the post.
        #[serde(rename = "postId")]
        post_id: Uuid,
    },
}

impl DocumentTarget {
    /// Target a page.
    pub fn page(page_id: Uuid) -> Self {
        Self::Page { page_id }
    }

    /// Target a forum post.
    pub fn post(post_id: Uuid) -> Self {
        Self::Post { post_id }
    }

    /// Identifier of the page or post.
    pub fn id(&self) -> Uuid {
        match self {
            Self::Page { page_id } => *page_id,
            Self::Post { post_id } => *post_id,
        }
    }

    /// Whether the target is a forum post.
    pub fn is_post(&self) -> bool {
        matches!(self, Self::Post { .. })
    }
}

/// A notification caused by activity in a document body or its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants, ToSchema)]
#[strum_discriminants(name(DocumentNotificationType))]
#[strum_discriminants(derive(strum::Display, Hash))]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum DocumentNotification {
    /// The recipient was mentioned in the document body.
    #[serde(rename = "mention.created")]
    #[strum_discriminants(strum(serialize = "mention.created"))]
    MentionCreated {
        /// Page or post holding the mention.
        #[serde(flatten)]
        target: DocumentTarget,
        /// Identifier of the mention node.
        mention_id: Uuid,
    },
    /// A new inline comment thread was started on a document the
    /// recipient authored.
    #[serde(rename = "inline_comment.created")]
    #[strum_discriminants(strum(serialize = "inline_comment.created"))]
    InlineCommentCreated {
        /// Page holding the thread.
        page_id: Uuid,
        /// The new inline comment.
        inline_comment_id: Uuid,
    },
    /// Someone replied to the recipient's inline comment.
    #[serde(rename = "inline_comment.replied")]
    #[strum_discriminants(strum(serialize = "inline_comment.replied"))]
    InlineCommentReplied {
        /// Page holding the thread.
        page_id: Uuid,
        /// The reply.
        inline_comment_id: Uuid,
    },
    /// The recipient was mentioned inside an inline comment.
    #[serde(rename = "inline_comment.mention.created")]
    #[strum_discriminants(strum(serialize = "inline_comment.mention.created"))]
    InlineCommentMentionCreated {
        /// Page holding the thread.
        page_id: Uuid,
        /// The inline comment holding the mention.
        inline_comment_id: Uuid,
        /// Identifier of the mention node.
        mention_id: Uuid,
    },
    /// A new top-level comment was left on a document the recipient
    /// authored.
    #[serde(rename = "comment.created")]
    #[strum_discriminants(strum(serialize = "comment.created"))]
    CommentCreated {
        /// Page or post the comment was left on.
        #[serde(flatten)]
        target: DocumentTarget,
        /// The new comment.
        comment_id: Uuid,
    },
    /// Someone replied to the recipient's comment.
    #[serde(rename = "comment.replied")]
    #[strum_discriminants(strum(serialize = "comment.replied"))]
    CommentReplied {
        /// Page or post the comment was left on.
        #[serde(flatten)]
        target: DocumentTarget,
        /// The reply.
        comment_id: Uuid,
    },
    /// The recipient was mentioned inside a comment.
    #[serde(rename = "comment.mention.created")]
    #[strum_discriminants(strum(serialize = "comment.mention.created"))]
    CommentMentionCreated {
        /// Page or post the comment was left on.
        #[serde(flatten)]
        target: DocumentTarget,
        /// The comment holding the mention.
        comment_id: Uuid,
        /// Identifier of the mention node.
        mention_id: Uuid,
    },
}

impl DocumentNotification {
    /// The dotted type discriminant.
    pub fn notification_type(&self) -> DocumentNotificationType {
        self.into()
    }

    /// Whether the notification lives on a forum post rather than a page.
    ///
    /// Inline comment threads only exist on pages.
    pub fn targets_post(&self) -> bool {
        match self {
            Self::MentionCreated { target, .. }
            | Self::CommentCreated { target, .. }
            | Self::CommentReplied { target, .. }
            | Self::CommentMentionCreated { target, .. } => target.is_post(),
            Self::InlineCommentCreated { .. }
            | Self::InlineCommentReplied { .. }
            | Self::InlineCommentMentionCreated { .. } => false,
        }
    }

    pub(crate) fn reference_ids(&self) -> (Uuid, Option<Uuid>) {
        match self {
            Self::MentionCreated { target, mention_id } => (target.id(), Some(*mention_id)),
            Self::InlineCommentCreated {
                page_id,
                inline_comment_id,
            }
            | Self::InlineCommentReplied {
                page_id,
                inline_comment_id,
            } => (*page_id, Some(*inline_comment_id)),
            Self::InlineCommentMentionCreated {
                page_id, mention_id, ..
            } => (*page_id, Some(*mention_id)),
            Self::CommentCreated { target, comment_id } | Self::CommentReplied { target, comment_id } => {
                (target.id(), Some(*comment_id))
            }
            Self::CommentMentionCreated { target, mention_id, .. } => (target.id(), Some(*mention_id)),
        }
    }
}
