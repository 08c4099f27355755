//! In-memory collaborators for tests and local experiments.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::anyhow;
use async_trait::async_trait;
use model_notifications::{
    NotificationMetadata, NotificationRecord, NotificationToggles, SavedNotification,
};
use model_permissions::AvailablePermissions;
use uuid::Uuid;

use crate::store::{
    CommentDetails, CommentRef, CommentScope, EntityStore, NotificationStore,
    NotificationStoreError, PermissionClient, PostDetails, PreferencesStore, ProposalDetails,
    SpaceMember, VoteDetails,
};

/// Every collaborator trait implemented over plain maps.
///
/// Mutation goes through `&self`, so one handle can seed state while clones
/// of the same `Arc` serve as the engine's stores. Permission computation
/// defaults to "no flags" for pairs that were never granted, and toggles
/// default to allow-everything for spaces that never configured any.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    members: HashMap<Uuid, Vec<SpaceMember>>,
    comments: HashMap<Uuid, CommentDetails>,
    siblings: HashMap<CommentScope, Vec<CommentRef>>,
    posts: HashMap<Uuid, PostDetails>,
    subscribers: HashMap<Uuid, Vec<Uuid>>,
    proposals: HashMap<Uuid, ProposalDetails>,
    reviewers: HashMap<Uuid, Vec<Uuid>>,
    votes: HashMap<Uuid, VoteDetails>,
    permissions: HashMap<(Uuid, Uuid), AvailablePermissions>,
    broken_permissions: HashSet<(Uuid, Uuid)>,
    toggles: HashMap<Uuid, NotificationToggles>,
    saved: Vec<SavedNotification>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a member to a space.
    pub fn add_member(&self, space_id: Uuid, user_id: Uuid, is_admin: bool) {
        self.lock()
            .members
            .entry(space_id)
            .or_default()
            .push(SpaceMember { user_id, is_admin });
    }

    /// Store a comment body and its parent link.
    pub fn put_comment(&self, id: Uuid, details: CommentDetails) {
        self.lock().comments.insert(id, details);
    }

    /// Append a comment to a scope's creation-ordered sibling list.
    pub fn push_sibling(&self, scope: CommentScope, comment: CommentRef) {
        self.lock().siblings.entry(scope).or_default().push(comment);
    }

    /// Store a forum post.
    pub fn put_post(&self, id: Uuid, details: PostDetails) {
        self.lock().posts.insert(id, details);
    }

    /// Subscribe a user to a post category.
    pub fn subscribe(&self, category_id: Uuid, user_id: Uuid) {
        self.lock().subscribers.entry(category_id).or_default().push(user_id);
    }

    /// Store a proposal.
    pub fn put_proposal(&self, id: Uuid, details: ProposalDetails) {
        self.lock().proposals.insert(id, details);
    }

    /// Configure the reviewers of a reward.
    pub fn put_reviewers(&self, bounty_id: Uuid, reviewer_ids: Vec<Uuid>) {
        self.lock().reviewers.insert(bounty_id, reviewer_ids);
    }

    /// Store a poll.
    pub fn put_vote(&self, id: Uuid, details: VoteDetails) {
        self.lock().votes.insert(id, details);
    }

    /// Fix the permission flags one user holds on one resource.
    pub fn grant(&self, resource_id: Uuid, user_id: Uuid, permissions: AvailablePermissions) {
        self.lock().permissions.insert((resource_id, user_id), permissions);
    }

    /// Make permission computation fail for one (resource, user) pair.
    pub fn break_permissions(&self, resource_id: Uuid, user_id: Uuid) {
        self.lock().broken_permissions.insert((resource_id, user_id));
    }

    /// Replace a space's notification toggles.
    pub fn put_toggles(&self, space_id: Uuid, toggles: NotificationToggles) {
        self.lock().toggles.insert(space_id, toggles);
    }

    /// Snapshot of every notification written so far.
    pub fn saved(&self) -> Vec<SavedNotification> {
        self.lock().saved.clone()
    }

    /// Every notification written for one recipient.
    pub fn saved_for(&self, user_id: Uuid) -> Vec<SavedNotification> {
        self.lock()
            .saved
            .iter()
            .filter(|saved| saved.metadata.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn space_members(&self, space_id: Uuid) -> anyhow::Result<Vec<SpaceMember>> {
        Ok(self.lock().members.get(&space_id).cloned().unwrap_or_default())
    }

    async fn comment(&self, id: Uuid) -> anyhow::Result<Option<CommentDetails>> {
        Ok(self.lock().comments.get(&id).cloned())
    }

    async fn find_previous_comment(
        &self,
        scope: CommentScope,
        excluding: Uuid,
    ) -> anyhow::Result<Option<CommentRef>> {
        Ok(self
            .lock()
            .siblings
            .get(&scope)
            .and_then(|comments| comments.iter().rev().find(|comment| comment.id != excluding).copied()))
    }

    async fn post(&self, id: Uuid) -> anyhow::Result<Option<PostDetails>> {
        Ok(self.lock().posts.get(&id).cloned())
    }

    async fn post_category_subscribers(&self, category_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        Ok(self.lock().subscribers.get(&category_id).cloned().unwrap_or_default())
    }

    async fn proposal(&self, id: Uuid) -> anyhow::Result<Option<ProposalDetails>> {
        Ok(self.lock().proposals.get(&id).cloned())
    }

    async fn bounty_reviewers(&self, bounty_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        Ok(self.lock().reviewers.get(&bounty_id).cloned().unwrap_or_default())
    }

    async fn vote(&self, id: Uuid) -> anyhow::Result<Option<VoteDetails>> {
        Ok(self.lock().votes.get(&id).copied())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create_notification(
        &self,
        metadata: NotificationMetadata,
        record: NotificationRecord,
    ) -> Result<Option<Uuid>, NotificationStoreError> {
        let mut inner = self.lock();
        let exists = inner.saved.iter().any(|saved| {
            saved.metadata.user_id == metadata.user_id
                && saved.metadata.space_id == metadata.space_id
                && saved.record.group() == record.group()
                && saved.record.type_key() == record.type_key()
                && saved.record.reference_ids() == record.reference_ids()
        });
        if exists {
            return Ok(None);
        }
        let id = metadata.id;
        inner.saved.push(SavedNotification { metadata, record });
        Ok(Some(id))
    }
}

#[async_trait]
impl PreferencesStore for MemoryStore {
    async fn notification_toggles(&self, space_id: Uuid) -> anyhow::Result<NotificationToggles> {
        Ok(self.lock().toggles.get(&space_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PermissionClient for MemoryStore {
    async fn compute_permissions(
        &self,
        resource_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<AvailablePermissions> {
        let inner = self.lock();
        if inner.broken_permissions.contains(&(resource_id, user_id)) {
            return Err(anyhow!("permission service unavailable"));
        }
        Ok(inner
            .permissions
            .get(&(resource_id, user_id))
            .copied()
            .unwrap_or_default())
    }
}
