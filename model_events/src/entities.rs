//! Denormalized entity summaries carried inside event payloads.

use mention_utils::ContentNode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The acting or referenced user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    pub id: Uuid,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// The space the event belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpaceEntity {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A page-backed document (also used for database cards)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntity {
    pub id: Uuid,
    pub title: String,
    pub author: UserEntity,
}

/// A forum post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostEntity {
    pub id: Uuid,
    pub title: String,
    pub category_id: Uuid,
    pub author: UserEntity,
}

/// A page or post comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentEntity {
    pub id: Uuid,
    pub author: UserEntity,
    /// Set when the comment is a reply to another comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

/// An inline (highlight-anchored) comment inside a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InlineCommentEntity {
    pub id: Uuid,
    pub author: UserEntity,
    /// The highlight thread the comment belongs to
    pub thread_id: Uuid,
}

/// A comment on a database card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockCommentEntity {
    pub id: Uuid,
    pub author: UserEntity,
    /// Comment body; mentions are extracted from it
    #[serde(default)]
    pub content: ContentNode,
}

/// A proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalEntity {
    pub id: Uuid,
    pub title: String,
    /// All listed authors, acting author included
    pub author_ids: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_evaluation_id: Option<Uuid>,
}

/// A reward (bounty)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BountyEntity {
    pub id: Uuid,
    pub title: String,
    pub created_by: Uuid,
}

/// An application to work on a reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEntity {
    pub id: Uuid,
    pub created_by: Uuid,
    pub bounty_id: Uuid,
}

/// A poll on a page or forum post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteEntity {
    pub id: Uuid,
    pub title: String,
    pub created_by: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<Uuid>,
}

/// The document-or-post a document event happened in.
///
/// Exactly one of the two keys is present on the wire; an envelope carrying
/// neither fails deserialization, which is the malformed-payload path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged, rename_all = "camelCase")]
pub enum DocumentEventSource {
    Document { document: DocumentEntity },
    Post { post: PostEntity },
}

impl DocumentEventSource {
    /// Id of the underlying page or post
    pub fn id(&self) -> Uuid {
        match self {
            DocumentEventSource::Document { document } => document.id,
            DocumentEventSource::Post { post } => post.id,
        }
    }

    /// The author of the underlying page or post
    pub fn author_id(&self) -> Uuid {
        match self {
            DocumentEventSource::Document { document } => document.author.id,
            DocumentEventSource::Post { post } => post.author.id,
        }
    }

    /// Display title of the underlying page or post
    pub fn title(&self) -> &str {
        match self {
            DocumentEventSource::Document { document } => &document.title,
            DocumentEventSource::Post { post } => &post.title,
        }
    }
}
