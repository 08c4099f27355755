use std::future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use model_events::{WebhookEnvelope, WebhookEvent};
use model_notifications::{NotificationMetadata, NotificationRecord, NotificationToggles};
use model_permissions::AvailablePermissions;
use uuid::Uuid;

use crate::error::FanoutError;
use crate::store::{EntityStore, NotificationStore, PermissionClient, PreferencesStore};

/// How many permission computations run at once during a space-wide fan-out.
pub const DEFAULT_PERMISSION_CONCURRENCY: usize = 8;

/// The notification fan-out engine.
///
/// Stateless between events; every dispatch reads what it needs through the
/// collaborator traits and writes through the notification store.
pub struct NotificationFanout {
    pub(crate) entities: Arc<dyn EntityStore>,
    notifications: Arc<dyn NotificationStore>,
    permissions: Arc<dyn PermissionClient>,
    preferences: Arc<dyn PreferencesStore>,
    permission_concurrency: usize,
}

/// Per-event state shared by every emit in one dispatch.
pub(crate) struct EventContext {
    pub(crate) space_id: Uuid,
    pub(crate) created_at: DateTime<Utc>,
    toggles: NotificationToggles,
}

impl NotificationFanout {
    /// Build an engine over the given collaborators.
    pub fn new(
        entities: Arc<dyn EntityStore>,
        notifications: Arc<dyn NotificationStore>,
        permissions: Arc<dyn PermissionClient>,
        preferences: Arc<dyn PreferencesStore>,
    ) -> Self {
        Self {
            entities,
            notifications,
            permissions,
            preferences,
            permission_concurrency: DEFAULT_PERMISSION_CONCURRENCY,
        }
    }

    /// Override the permission fan-out concurrency.
    #[must_use]
    pub fn with_permission_concurrency(mut self, permission_concurrency: usize) -> Self {
        self.permission_concurrency = permission_concurrency.max(1);
        self
    }

    /// Process one webhook envelope and return the ids of the notifications
    /// it created.
    ///
    /// Unknown scopes and events whose recipient set resolves empty return
    /// an empty list. Redelivering an envelope that was already processed
    /// also returns an empty list, because every write collapses against
    /// the store's uniqueness guarantee.
    #[tracing::instrument(
        skip_all,
        fields(scope = %envelope.event.scope(), space_id = %envelope.space_id)
    )]
    pub async fn dispatch(&self, envelope: &WebhookEnvelope) -> Result<Vec<Uuid>, FanoutError> {
        let toggles = self
            .preferences
            .notification_toggles(envelope.space_id)
            .await?;
        let ctx = EventContext {
            space_id: envelope.space_id,
            created_at: envelope.created_at,
            toggles,
        };

        let created = match &envelope.event {
            WebhookEvent::DocumentMentionCreated {
                source,
                user,
                mention,
                ..
            } => self.on_document_mention_created(&ctx, source, user, mention).await?,
            WebhookEvent::DocumentInlineCommentCreated {
                document,
                inline_comment,
                ..
            } => {
                self.on_document_inline_comment_created(&ctx, document, inline_comment)
                    .await?
            }
            WebhookEvent::DocumentCommentCreated { source, comment, .. } => {
                self.on_document_comment_created(&ctx, source, comment).await?
            }
            WebhookEvent::CardBlockCommentCreated {
                card, block_comment, ..
            } => self.on_card_block_comment_created(&ctx, card, block_comment).await?,
            WebhookEvent::CardPersonPropertyAssigned {
                card,
                assigned_user,
                person_property_id,
                user,
                ..
            } => {
                self.on_card_person_property_assigned(&ctx, card, assigned_user, *person_property_id, user)
                    .await?
            }
            WebhookEvent::ForumPostCreated { post, user, .. } => {
                self.on_forum_post_created(&ctx, post, user).await?
            }
            WebhookEvent::VoteCreated { vote, .. } => self.on_vote_created(&ctx, vote).await?,
            WebhookEvent::ProposalStatusChanged {
                proposal,
                user,
                new_status,
                ..
            } => {
                self.on_proposal_status_changed(&ctx, proposal, user, *new_status)
                    .await?
            }
            WebhookEvent::ProposalPublished { proposal, user, .. } => {
                self.on_proposal_published(&ctx, proposal, user).await?
            }
            WebhookEvent::ProposalAppealed { proposal, user, .. } => {
                self.on_proposal_appealed(&ctx, proposal, user).await?
            }
            WebhookEvent::ProposalCredentialCreated { proposal, user, .. } => {
                self.on_proposal_credential_created(&ctx, proposal, user).await?
            }
            WebhookEvent::RewardApplicationCreated {
                bounty, application, ..
            } => self.on_reward_application_created(&ctx, bounty, application).await?,
            WebhookEvent::RewardApplicationApproved {
                bounty,
                application,
                user,
                ..
            } => {
                self.on_reward_application_approved(&ctx, bounty, application, user)
                    .await?
            }
            WebhookEvent::RewardApplicationRejected {
                bounty,
                application,
                user,
                ..
            } => {
                self.on_reward_application_rejected(&ctx, bounty, application, user)
                    .await?
            }
            WebhookEvent::RewardSubmissionCreated {
                bounty, application, ..
            } => self.on_reward_submission_created(&ctx, bounty, application).await?,
            WebhookEvent::RewardSubmissionApproved {
                bounty,
                application,
                user,
                ..
            } => {
                self.on_reward_submission_approved(&ctx, bounty, application, user)
                    .await?
            }
            WebhookEvent::RewardApplicationPaymentCompleted {
                bounty,
                application,
                user,
                ..
            } => {
                self.on_reward_payment_completed(&ctx, bounty, application, user)
                    .await?
            }
            WebhookEvent::RewardSuggestionCreated { bounty, user, .. } => {
                self.on_reward_suggestion_created(&ctx, bounty, user).await?
            }
            WebhookEvent::Other => {
                tracing::debug!("ignoring event with unhandled scope");
                Vec::new()
            }
        };

        if !created.is_empty() {
            tracing::info!(count = created.len(), "created notifications");
        }
        Ok(created)
    }

    /// Write one notification unless the recipient is the actor, the
    /// space's toggles silence it, or it already exists.
    pub(crate) async fn emit(
        &self,
        ctx: &EventContext,
        recipient: Uuid,
        created_by: Uuid,
        record: NotificationRecord,
    ) -> Result<Option<Uuid>, FanoutError> {
        if recipient == created_by {
            return Ok(None);
        }
        if !ctx
            .toggles
            .is_enabled(record.toggle_group(), Some(&record.type_key()))
        {
            tracing::debug!(
                user_id = %recipient,
                group = record.toggle_group(),
                kind = %record.type_key(),
                "notification suppressed by space toggles"
            );
            return Ok(None);
        }

        let metadata = NotificationMetadata::new(ctx.space_id, recipient, created_by, ctx.created_at);
        let created = self.notifications.create_notification(metadata, record).await?;
        match created {
            Some(id) => tracing::debug!(%id, user_id = %recipient, "notification created"),
            None => tracing::debug!(user_id = %recipient, "notification already exists, skipping"),
        }
        Ok(created)
    }

    /// Compute permissions for many users against one resource, a bounded
    /// number at a time.
    ///
    /// A user whose computation fails is dropped from the result so the
    /// rest of the fan-out still happens; the failure is only logged.
    pub(crate) async fn permissions_for(
        &self,
        resource_id: Uuid,
        user_ids: Vec<Uuid>,
    ) -> Vec<(Uuid, AvailablePermissions)> {
        stream::iter(user_ids)
            .map(|user_id| {
                let permissions = Arc::clone(&self.permissions);
                async move {
                    match permissions.compute_permissions(resource_id, user_id).await {
                        Ok(computed) => Some((user_id, computed)),
                        Err(error) => {
                            tracing::warn!(
                                %resource_id,
                                %user_id,
                                %error,
                                "dropping recipient after permission compute failure"
                            );
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.permission_concurrency)
            .filter_map(future::ready)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use model_events::WebhookEnvelope;

    use crate::memory::MemoryStore;
    use crate::NotificationFanout;

    fn engine(store: &Arc<MemoryStore>) -> NotificationFanout {
        NotificationFanout::new(
            Arc::clone(store) as _,
            Arc::clone(store) as _,
            Arc::clone(store) as _,
            Arc::clone(store) as _,
        )
    }

    #[tokio::test]
    async fn unknown_scope_is_a_silent_noop() {
        let store = Arc::new(MemoryStore::default());
        let envelope: WebhookEnvelope = serde_json::from_value(serde_json::json!({
            "spaceId": uuid::Uuid::now_v7(),
            "createdAt": Utc::now(),
            "event": { "scope": "space.member.left", "whatever": true }
        }))
        .unwrap();

        let created = engine(&store).dispatch(&envelope).await.unwrap();

        assert!(created.is_empty());
        assert!(store.saved().is_empty());
    }
}
