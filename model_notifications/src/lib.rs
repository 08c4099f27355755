#![deny(missing_docs)]
//! Notification records produced by the fan-out engine.
//!
//! A stored notification is two parts: [`NotificationMetadata`] (who it is
//! for, who caused it, lifecycle timestamps) and a [`NotificationRecord`]
//! (which family it belongs to and the entity references that family
//! requires). The record enum is the single source of truth for the
//! notification type vocabulary; the string forms used on the wire and in
//! per-space toggles are derived from it, never hand-written elsewhere.

mod bounty;
mod card;
mod document;
mod metadata;
mod post;
mod proposal;
mod toggles;
mod vote;

pub use bounty::{BountyNotification, BountyNotificationType};
pub use card::{CardNotification, CardNotificationType};
pub use document::{DocumentNotification, DocumentNotificationType, DocumentTarget};
pub use metadata::NotificationMetadata;
pub use post::{PostNotification, PostNotificationType};
pub use proposal::{ProposalNotification, ProposalNotificationType};
pub use toggles::NotificationToggles;
pub use vote::VoteNotification;

use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;
use utoipa::ToSchema;
use uuid::Uuid;

/// A notification payload, grouped by the product surface it belongs to.
///
/// Serializes adjacently tagged so the group travels next to the payload:
/// `{"group": "document", "payload": {"type": "comment.created", ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants, ToSchema)]
#[strum_discriminants(name(NotificationGroup))]
#[strum_discriminants(derive(Serialize, Deserialize, ToSchema, strum::Display, strum::EnumString, Hash))]
#[strum_discriminants(serde(rename_all = "snake_case"))]
#[strum_discriminants(strum(serialize_all = "snake_case"))]
#[serde(tag = "group", content = "payload", rename_all = "snake_case")]
pub enum NotificationRecord {
    /// Activity inside a document body or its comment threads.
    Document(DocumentNotification),
    /// Activity on a forum post.
    Post(PostNotification),
    /// Activity on a database card.
    Card(CardNotification),
    /// A proposal moved through its lifecycle.
    Proposal(ProposalNotification),
    /// Activity on a reward and its applications.
    Bounty(BountyNotification),
    /// A poll opened for voting.
    Vote(VoteNotification),
}

impl NotificationRecord {
    /// The family this record belongs to.
    pub fn group(&self) -> NotificationGroup {
        self.into()
    }

    /// The dotted type key within the family, e.g. `inline_comment.replied`.
    pub fn type_key(&self) -> String {
        match self {
            Self::Document(record) => record.notification_type().to_string(),
            Self::Post(record) => record.notification_type().to_string(),
            Self::Card(record) => record.notification_type().to_string(),
            Self::Proposal(record) => record.notification_type().to_string(),
            Self::Bounty(record) => record.notification_type().to_string(),
            Self::Vote(_) => VoteNotification::TYPE_KEY.to_string(),
        }
    }

    /// The per-space toggle group this record is governed by.
    ///
    /// Document activity normally falls under `pages`, but when the target
    /// is a forum post it is governed by the `forum` switches instead.
    pub fn toggle_group(&self) -> &'static str {
        match self {
            Self::Document(record) if record.targets_post() => "forum",
            Self::Document(_) | Self::Card(_) => "pages",
            Self::Post(_) => "forum",
            Self::Proposal(_) => "proposals",
            Self::Bounty(_) => "rewards",
            Self::Vote(_) => "polls",
        }
    }

    /// The entity references that identify this notification's cause.
    ///
    /// The primary reference is the containing entity (page, post, card,
    /// proposal, reward or vote). The secondary reference, where present,
    /// is the specific comment, mention, application or property involved.
    /// Together with the recipient and type key these pin down the
    /// uniqueness of a stored notification.
    pub fn reference_ids(&self) -> (Uuid, Option<Uuid>) {
        match self {
            Self::Document(record) => record.reference_ids(),
            Self::Post(record) => record.reference_ids(),
            Self::Card(record) => record.reference_ids(),
            Self::Proposal(record) => record.reference_ids(),
            Self::Bounty(record) => record.reference_ids(),
            Self::Vote(record) => (record.vote_id, None),
        }
    }
}

/// A persisted notification: metadata plus the family record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SavedNotification {
    /// Recipient, actor and lifecycle timestamps.
    #[serde(flatten)]
    pub metadata: NotificationMetadata,
    /// The family payload.
    #[serde(flatten)]
    pub record: NotificationRecord,
}
