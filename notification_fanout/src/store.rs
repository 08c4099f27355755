//! Collaborator interfaces the engine reads from and writes to.
//!
//! Handlers never touch a database or HTTP client directly; they see only
//! these traits. Each method is deliberately narrow and returns exactly the
//! fields some handler consumes, so the whole engine can run against the
//! in-memory fakes in [`crate::memory`].

use async_trait::async_trait;
use mention_utils::ContentNode;
use model_notifications::{NotificationMetadata, NotificationRecord, NotificationToggles};
use model_permissions::AvailablePermissions;
use uuid::Uuid;

/// One membership row of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceMember {
    /// The member.
    pub user_id: Uuid,
    /// Whether the member administers the space.
    pub is_admin: bool,
}

/// A comment body plus its position in a reply tree.
#[derive(Debug, Clone, Default)]
pub struct CommentDetails {
    /// Rich content of the comment, scanned for mentions.
    pub content: ContentNode,
    /// The comment this one answers, when it is not top-level.
    pub parent: Option<CommentRef>,
}

/// Just enough of a comment to decide who replied to whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentRef {
    /// The comment.
    pub id: Uuid,
    /// Who wrote it.
    pub author_id: Uuid,
}

/// Where to look for the siblings of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentScope {
    /// Inline comments sharing one document thread.
    Thread(Uuid),
    /// Block comments attached to one card.
    CardBlock(Uuid),
}

/// The fields of a forum post the fan-out reads.
#[derive(Debug, Clone)]
pub struct PostDetails {
    /// Category the post was published in.
    pub category_id: Uuid,
    /// The post's author.
    pub author_id: Uuid,
    /// Rich content of the post body, scanned for mentions.
    pub content: ContentNode,
}

/// The fields of a proposal the fan-out reads.
#[derive(Debug, Clone, Default)]
pub struct ProposalDetails {
    /// All co-authors of the proposal.
    pub author_ids: Vec<Uuid>,
    /// Whether the proposal's page has been soft-deleted.
    pub page_deleted: bool,
    /// The evaluation step the proposal currently sits in, if any.
    pub current_evaluation: Option<EvaluationDetails>,
    /// Rewards that will go live when the proposal passes.
    pub reward_ids: Vec<Uuid>,
}

/// The visibility of a proposal's current evaluation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationDetails {
    /// The evaluation step.
    pub id: Uuid,
    /// When true, only the step's reviewers may see its progress.
    pub private: bool,
}

/// Lifecycle state of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum VoteStatus {
    /// Open for ballots.
    InProgress,
    /// Closed with a passing outcome.
    Passed,
    /// Closed with a failing outcome.
    Rejected,
    /// Withdrawn before completion.
    Cancelled,
}

/// The fields of a poll the fan-out reads.
#[derive(Debug, Clone, Copy)]
pub struct VoteDetails {
    /// Who opened the poll.
    pub created_by: Uuid,
    /// Current lifecycle state; only open polls notify.
    pub status: VoteStatus,
    /// Page hosting the poll, for page polls.
    pub page_id: Option<Uuid>,
    /// Category of the post hosting the poll, for forum polls.
    pub post_category_id: Option<Uuid>,
}

/// Read access to the application entities handlers resolve against.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Every member of a space.
    async fn space_members(&self, space_id: Uuid) -> anyhow::Result<Vec<SpaceMember>>;

    /// A comment body and parent, in whichever surface the comment lives.
    async fn comment(&self, id: Uuid) -> anyhow::Result<Option<CommentDetails>>;

    /// The most recently created sibling in a scope, excluding the given
    /// comment. Decides "created" versus "replied" semantics.
    async fn find_previous_comment(
        &self,
        scope: CommentScope,
        excluding: Uuid,
    ) -> anyhow::Result<Option<CommentRef>>;

    /// A forum post.
    async fn post(&self, id: Uuid) -> anyhow::Result<Option<PostDetails>>;

    /// Users subscribed to a post category's activity.
    async fn post_category_subscribers(&self, category_id: Uuid) -> anyhow::Result<Vec<Uuid>>;

    /// A proposal.
    async fn proposal(&self, id: Uuid) -> anyhow::Result<Option<ProposalDetails>>;

    /// Users configured as reviewers of a reward.
    async fn bounty_reviewers(&self, bounty_id: Uuid) -> anyhow::Result<Vec<Uuid>>;

    /// A poll.
    async fn vote(&self, id: Uuid) -> anyhow::Result<Option<VoteDetails>>;
}

/// Failure writing a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotificationStoreError {
    /// The write failed; an already-existing notification is not an error
    /// and is reported as `Ok(None)` instead.
    #[error("notification write failed")]
    Write(#[source] anyhow::Error),
}

/// Durable storage for notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist metadata and record as one atomic write.
    ///
    /// Returns the new notification id, or `None` when an identical
    /// notification (same recipient, type and references) already exists,
    /// which is how redelivered events collapse into no-ops.
    async fn create_notification(
        &self,
        metadata: NotificationMetadata,
        record: NotificationRecord,
    ) -> Result<Option<Uuid>, NotificationStoreError>;
}

/// Per-space notification preference reads.
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// The space's toggle map. Spaces with nothing configured return the
    /// default-allow toggles.
    async fn notification_toggles(&self, space_id: Uuid) -> anyhow::Result<NotificationToggles>;
}

/// The external permission computation service.
#[async_trait]
pub trait PermissionClient: Send + Sync {
    /// Flags the user holds on a resource (page, post category or proposal).
    async fn compute_permissions(
        &self,
        resource_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<AvailablePermissions>;
}
