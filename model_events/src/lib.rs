//! The webhook event envelope consumed by the notification fan-out engine.
//!
//! Events arrive as a tagged union keyed by `scope`. Payloads carry
//! denormalized entity summaries (ids plus the display fields handlers read),
//! never live references into another service's state.

use chrono::{DateTime, Utc};
use mention_utils::MentionMetadata;
use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;
use utoipa::ToSchema;
use uuid::Uuid;

mod entities;
pub use entities::*;

/// The wire envelope around one domain event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEnvelope {
    /// The space the event happened in; authoritative for notification metadata
    pub space_id: Uuid,
    /// When the producer emitted the event
    pub created_at: DateTime<Utc>,
    /// The event itself
    pub event: WebhookEvent,
}

/// One domain event, keyed by its `scope` tag.
///
/// Producers may emit scopes this engine does not know; those deserialize into
/// [`WebhookEvent::Other`] and are dropped without error.
#[derive(Debug, Clone, Serialize, Deserialize, EnumDiscriminants, ToSchema)]
#[strum_discriminants(name(EventScope))]
#[strum_discriminants(derive(strum::Display, Hash))]
#[serde(tag = "scope", rename_all_fields = "camelCase")]
pub enum WebhookEvent {
    /// A user was mentioned in a document or forum post body
    #[serde(rename = "document.mention.created")]
    #[strum_discriminants(strum(serialize = "document.mention.created"))]
    DocumentMentionCreated {
        #[serde(flatten)]
        source: DocumentEventSource,
        space: SpaceEntity,
        user: UserEntity,
        mention: MentionMetadata,
    },
    /// An inline comment was added to a document thread
    #[serde(rename = "document.inline_comment.created")]
    #[strum_discriminants(strum(serialize = "document.inline_comment.created"))]
    DocumentInlineCommentCreated {
        document: DocumentEntity,
        space: SpaceEntity,
        inline_comment: InlineCommentEntity,
    },
    /// A top-level or threaded comment was added to a document or forum post
    #[serde(rename = "document.comment.created")]
    #[strum_discriminants(strum(serialize = "document.comment.created"))]
    DocumentCommentCreated {
        #[serde(flatten)]
        source: DocumentEventSource,
        space: SpaceEntity,
        comment: CommentEntity,
    },
    /// A comment was added to a database card
    #[serde(rename = "card.block_comment.created")]
    #[strum_discriminants(strum(serialize = "card.block_comment.created"))]
    CardBlockCommentCreated {
        card: DocumentEntity,
        space: SpaceEntity,
        block_comment: BlockCommentEntity,
    },
    /// A person property on a card was set to a user
    #[serde(rename = "card.person_property.assigned")]
    #[strum_discriminants(strum(serialize = "card.person_property.assigned"))]
    CardPersonPropertyAssigned {
        card: DocumentEntity,
        space: SpaceEntity,
        assigned_user: UserEntity,
        person_property_id: Uuid,
        user: UserEntity,
    },
    /// A forum post was published
    #[serde(rename = "forum.post.created")]
    #[strum_discriminants(strum(serialize = "forum.post.created"))]
    ForumPostCreated {
        post: PostEntity,
        space: SpaceEntity,
        user: UserEntity,
    },
    /// A poll was opened on a page or forum post
    #[serde(rename = "vote.created")]
    #[strum_discriminants(strum(serialize = "vote.created"))]
    VoteCreated {
        vote: VoteEntity,
        space: SpaceEntity,
        user: UserEntity,
    },
    /// A proposal moved to a new workflow status
    #[serde(rename = "proposal.status_changed")]
    #[strum_discriminants(strum(serialize = "proposal.status_changed"))]
    ProposalStatusChanged {
        proposal: ProposalEntity,
        space: SpaceEntity,
        user: UserEntity,
        new_status: ProposalStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old_status: Option<ProposalStatus>,
    },
    /// A draft proposal was published
    #[serde(rename = "proposal.published")]
    #[strum_discriminants(strum(serialize = "proposal.published"))]
    ProposalPublished {
        proposal: ProposalEntity,
        space: SpaceEntity,
        user: UserEntity,
    },
    /// An evaluation outcome was appealed
    #[serde(rename = "proposal.appealed")]
    #[strum_discriminants(strum(serialize = "proposal.appealed"))]
    ProposalAppealed {
        proposal: ProposalEntity,
        space: SpaceEntity,
        user: UserEntity,
    },
    /// A credential was issued for a proposal
    #[serde(rename = "proposal.credential_created")]
    #[strum_discriminants(strum(serialize = "proposal.credential_created"))]
    ProposalCredentialCreated {
        proposal: ProposalEntity,
        space: SpaceEntity,
        user: UserEntity,
    },
    /// Someone applied to work on a reward
    #[serde(rename = "reward.application.created")]
    #[strum_discriminants(strum(serialize = "reward.application.created"))]
    RewardApplicationCreated {
        bounty: BountyEntity,
        space: SpaceEntity,
        application: ApplicationEntity,
    },
    /// A reviewer accepted an application
    #[serde(rename = "reward.application.approved")]
    #[strum_discriminants(strum(serialize = "reward.application.approved"))]
    RewardApplicationApproved {
        bounty: BountyEntity,
        space: SpaceEntity,
        application: ApplicationEntity,
        user: UserEntity,
    },
    /// A reviewer rejected an application
    #[serde(rename = "reward.application.rejected")]
    #[strum_discriminants(strum(serialize = "reward.application.rejected"))]
    RewardApplicationRejected {
        bounty: BountyEntity,
        space: SpaceEntity,
        application: ApplicationEntity,
        user: UserEntity,
    },
    /// An applicant submitted their work
    #[serde(rename = "reward.submission.created")]
    #[strum_discriminants(strum(serialize = "reward.submission.created"))]
    RewardSubmissionCreated {
        bounty: BountyEntity,
        space: SpaceEntity,
        application: ApplicationEntity,
    },
    /// A reviewer approved submitted work
    #[serde(rename = "reward.submission.approved")]
    #[strum_discriminants(strum(serialize = "reward.submission.approved"))]
    RewardSubmissionApproved {
        bounty: BountyEntity,
        space: SpaceEntity,
        application: ApplicationEntity,
        user: UserEntity,
    },
    /// A reward payout finished
    #[serde(rename = "reward.application.payment_completed")]
    #[strum_discriminants(strum(serialize = "reward.application.payment_completed"))]
    RewardApplicationPaymentCompleted {
        bounty: BountyEntity,
        space: SpaceEntity,
        application: ApplicationEntity,
        user: UserEntity,
    },
    /// A member suggested a new reward for admins to triage
    #[serde(rename = "reward.suggestion.created")]
    #[strum_discriminants(strum(serialize = "reward.suggestion.created"))]
    RewardSuggestionCreated {
        bounty: BountyEntity,
        space: SpaceEntity,
        user: UserEntity,
    },
    /// Any scope this engine does not handle
    #[serde(other, rename = "unknown")]
    #[strum_discriminants(strum(serialize = "unknown"))]
    Other,
}

impl WebhookEvent {
    /// The scope tag of this event
    pub fn scope(&self) -> EventScope {
        EventScope::from(self)
    }

    /// The user whose action produced this event, where the scope has one
    pub fn actor_id(&self) -> Option<Uuid> {
        match self {
            WebhookEvent::DocumentMentionCreated { user, .. }
            | WebhookEvent::CardPersonPropertyAssigned { user, .. }
            | WebhookEvent::ForumPostCreated { user, .. }
            | WebhookEvent::VoteCreated { user, .. }
            | WebhookEvent::ProposalStatusChanged { user, .. }
            | WebhookEvent::ProposalPublished { user, .. }
            | WebhookEvent::ProposalAppealed { user, .. }
            | WebhookEvent::ProposalCredentialCreated { user, .. }
            | WebhookEvent::RewardApplicationApproved { user, .. }
            | WebhookEvent::RewardApplicationRejected { user, .. }
            | WebhookEvent::RewardSubmissionApproved { user, .. }
            | WebhookEvent::RewardApplicationPaymentCompleted { user, .. }
            | WebhookEvent::RewardSuggestionCreated { user, .. } => Some(user.id),
            WebhookEvent::DocumentInlineCommentCreated { inline_comment, .. } => {
                Some(inline_comment.author.id)
            }
            WebhookEvent::DocumentCommentCreated { comment, .. } => Some(comment.author.id),
            WebhookEvent::CardBlockCommentCreated { block_comment, .. } => {
                Some(block_comment.author.id)
            }
            WebhookEvent::RewardApplicationCreated { application, .. }
            | WebhookEvent::RewardSubmissionCreated { application, .. } => {
                Some(application.created_by)
            }
            WebhookEvent::Other => None,
        }
    }
}

/// Where a proposal sits in its review workflow
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProposalStatus {
    /// Not yet visible to the space; produces no notifications
    Draft,
    /// Open for feedback from anyone who can comment
    Discussion,
    /// Waiting on its reviewers
    Review,
    /// Reviewers signed off
    Reviewed,
    /// A vote step is open
    VoteActive,
    /// Final evaluation passed
    Passed,
    /// Final evaluation failed
    Failed,
}
