//! Rich-content tree walking and `@user` mention extraction.
//!
//! Documents, comments and block comments store their bodies as a
//! prosemirror-style node tree. The only structural knowledge this crate has
//! is the `mention` leaf node and its attributes; everything else is walked
//! blindly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A single node in a rich-content document tree.
///
/// Unknown node types are preserved as-is; only `mention` nodes are
/// interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentNode {
    /// The prosemirror node type, e.g. `doc`, `paragraph`, `text`, `mention`
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub node_type: String,
    /// Node attributes; shape depends on the node type
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub attrs: Option<serde_json::Value>,
    /// Child nodes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentNode>,
    /// Raw text, present on `text` nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentNode {
    /// A `doc` root around the given children
    pub fn doc(content: Vec<ContentNode>) -> Self {
        Self {
            node_type: "doc".to_string(),
            content,
            ..Default::default()
        }
    }

    /// A paragraph around the given children
    pub fn paragraph(content: Vec<ContentNode>) -> Self {
        Self {
            node_type: "paragraph".to_string(),
            content,
            ..Default::default()
        }
    }

    /// A plain text leaf
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            node_type: "text".to_string(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// A mention leaf carrying the given attributes
    pub fn mention(meta: &MentionMetadata) -> Self {
        Self {
            node_type: "mention".to_string(),
            attrs: serde_json::to_value(meta).ok(),
            ..Default::default()
        }
    }

    /// True for trees with no children and no text
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.text.as_deref().map_or(true, str::is_empty)
    }
}

/// What a mention points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MentionKind {
    /// A specific user
    User,
    /// A role within the space
    Role,
}

/// The attributes of a `mention` node, also carried on mention webhook events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentionMetadata {
    /// Identity of this mention annotation
    pub id: Uuid,
    /// Mentioned user id (or role id for role mentions)
    pub value: String,
    /// Mention kind; role mentions are not fanned out here
    #[serde(rename = "type")]
    pub kind: MentionKind,
    /// The user who wrote the mention
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    /// When the mention was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Display text surrounding the mention, when the producer includes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl MentionMetadata {
    /// A user mention with just the required attributes
    pub fn user(id: Uuid, mentioned_user_id: Uuid) -> Self {
        Self {
            id,
            value: mentioned_user_id.to_string(),
            kind: MentionKind::User,
            created_by: None,
            created_at: None,
            text: None,
        }
    }

    /// The mentioned user id, when this is a user mention with a well-formed value
    pub fn mentioned_user(&self) -> Option<Uuid> {
        match self.kind {
            MentionKind::User => self.value.parse().ok(),
            MentionKind::Role => None,
        }
    }
}

/// Collects every user mention in the tree, depth first.
///
/// Role mentions and mention nodes with malformed attributes are skipped.
/// Pure; does not allocate beyond the output vector.
pub fn extract_mentions(node: &ContentNode) -> Vec<MentionMetadata> {
    let mut mentions = Vec::new();
    collect_mentions(node, &mut mentions);
    mentions
}

fn collect_mentions(node: &ContentNode, out: &mut Vec<MentionMetadata>) {
    if node.node_type == "mention" {
        if let Some(attrs) = &node.attrs {
            match serde_json::from_value::<MentionMetadata>(attrs.clone()) {
                Ok(meta) if meta.mentioned_user().is_some() => out.push(meta),
                Ok(_) | Err(_) => {}
            }
        }
    }
    for child in &node.content {
        collect_mentions(child, out);
    }
}
