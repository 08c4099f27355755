use model_events::{ProposalEntity, ProposalStatus, UserEntity};
use model_notifications::{NotificationRecord, ProposalNotification, ProposalNotificationType};
use uuid::Uuid;

use crate::engine::{EventContext, NotificationFanout};
use crate::error::{FanoutError, ResourceKind};
use crate::store::ProposalDetails;

/// Which notification, if any, one member receives when a proposal enters a
/// status.
///
/// Authorship wins over the other roles: an author who also reviews gets the
/// author-facing type for statuses that have one.
pub fn proposal_status_action(
    status: ProposalStatus,
    is_author: bool,
    is_reviewer: bool,
    is_voter: bool,
    can_comment: bool,
) -> Option<ProposalNotificationType> {
    match status {
        ProposalStatus::Draft => None,
        ProposalStatus::Discussion => {
            if is_author {
                Some(ProposalNotificationType::ReviewRequired)
            } else if can_comment {
                Some(ProposalNotificationType::StartDiscussion)
            } else {
                None
            }
        }
        ProposalStatus::Review => is_reviewer.then_some(ProposalNotificationType::NeedsReview),
        ProposalStatus::Reviewed => is_author.then_some(ProposalNotificationType::Reviewed),
        ProposalStatus::VoteActive => is_voter.then_some(ProposalNotificationType::Vote),
        ProposalStatus::Passed => is_author.then_some(ProposalNotificationType::ProposalPassed),
        ProposalStatus::Failed => is_author.then_some(ProposalNotificationType::ProposalFailed),
    }
}

fn outcome_is_always_visible(action: ProposalNotificationType) -> bool {
    matches!(
        action,
        ProposalNotificationType::ProposalPassed
            | ProposalNotificationType::ProposalFailed
            | ProposalNotificationType::RewardPublished
    )
}

impl NotificationFanout {
    /// Resolve a proposal whose page is still live. Proposals the store no
    /// longer knows are an error; soft-deleted ones end the fan-out quietly.
    async fn live_proposal(&self, proposal_id: Uuid) -> Result<Option<ProposalDetails>, FanoutError> {
        let details = self
            .entities
            .proposal(proposal_id)
            .await?
            .ok_or_else(|| FanoutError::not_found(ResourceKind::Proposal, proposal_id))?;
        if details.page_deleted {
            tracing::debug!(%proposal_id, "proposal page is deleted, skipping");
            return Ok(None);
        }
        Ok(Some(details))
    }

    /// A status transition notifies each member according to the roles they
    /// hold on the proposal, one notification per member at most.
    ///
    /// While the current evaluation step is private, step notifications only
    /// reach its reviewers; final outcomes still reach everyone entitled to
    /// them.
    pub(crate) async fn on_proposal_status_changed(
        &self,
        ctx: &EventContext,
        proposal: &ProposalEntity,
        user: &UserEntity,
        new_status: ProposalStatus,
    ) -> Result<Vec<Uuid>, FanoutError> {
        if new_status == ProposalStatus::Draft {
            tracing::debug!(proposal_id = %proposal.id, "proposal went back to draft, skipping");
            return Ok(Vec::new());
        }
        let Some(details) = self.live_proposal(proposal.id).await? else {
            return Ok(Vec::new());
        };
        let evaluation_id = proposal
            .current_evaluation_id
            .or(details.current_evaluation.map(|evaluation| evaluation.id));
        let private_evaluation = details.current_evaluation.is_some_and(|evaluation| evaluation.private);
        let candidates: Vec<Uuid> = self
            .entities
            .space_members(ctx.space_id)
            .await?
            .into_iter()
            .map(|member| member.user_id)
            .filter(|member| *member != user.id)
            .collect();

        let mut created = Vec::new();
        for (member, permissions) in self.permissions_for(proposal.id, candidates).await {
            if !permissions.view {
                continue;
            }
            let is_author = details.author_ids.contains(&member);
            // Reviewer and voter rights both come from the evaluate flag.
            let Some(mut action) = proposal_status_action(
                new_status,
                is_author,
                permissions.evaluate,
                permissions.evaluate,
                permissions.comment,
            ) else {
                continue;
            };
            if action == ProposalNotificationType::ProposalPassed && !details.reward_ids.is_empty() {
                action = ProposalNotificationType::RewardPublished;
            }
            if private_evaluation && !permissions.evaluate && !outcome_is_always_visible(action) {
                continue;
            }
            let record = NotificationRecord::Proposal(ProposalNotification {
                kind: action,
                proposal_id: proposal.id,
                evaluation_id,
            });
            created.extend(self.emit(ctx, member, user.id, record).await?);
        }
        Ok(created)
    }

    /// Publishing a proposal notifies the members who will evaluate it.
    pub(crate) async fn on_proposal_published(
        &self,
        ctx: &EventContext,
        proposal: &ProposalEntity,
        user: &UserEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let Some(details) = self.live_proposal(proposal.id).await? else {
            return Ok(Vec::new());
        };
        let evaluation_id = proposal
            .current_evaluation_id
            .or(details.current_evaluation.map(|evaluation| evaluation.id));
        let candidates: Vec<Uuid> = self
            .entities
            .space_members(ctx.space_id)
            .await?
            .into_iter()
            .map(|member| member.user_id)
            .filter(|member| *member != user.id)
            .collect();

        let mut created = Vec::new();
        for (member, permissions) in self.permissions_for(proposal.id, candidates).await {
            if !(permissions.view && permissions.evaluate) {
                continue;
            }
            let record = NotificationRecord::Proposal(ProposalNotification {
                kind: ProposalNotificationType::ProposalPublished,
                proposal_id: proposal.id,
                evaluation_id,
            });
            created.extend(self.emit(ctx, member, user.id, record).await?);
        }
        Ok(created)
    }

    /// An appeal notifies the members who review appeals.
    pub(crate) async fn on_proposal_appealed(
        &self,
        ctx: &EventContext,
        proposal: &ProposalEntity,
        user: &UserEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let Some(details) = self.live_proposal(proposal.id).await? else {
            return Ok(Vec::new());
        };
        let evaluation_id = proposal
            .current_evaluation_id
            .or(details.current_evaluation.map(|evaluation| evaluation.id));
        let candidates: Vec<Uuid> = self
            .entities
            .space_members(ctx.space_id)
            .await?
            .into_iter()
            .map(|member| member.user_id)
            .filter(|member| *member != user.id)
            .collect();

        let mut created = Vec::new();
        for (member, permissions) in self.permissions_for(proposal.id, candidates).await {
            if !(permissions.view && permissions.evaluate_appeal) {
                continue;
            }
            let record = NotificationRecord::Proposal(ProposalNotification {
                kind: ProposalNotificationType::ProposalAppealed,
                proposal_id: proposal.id,
                evaluation_id,
            });
            created.extend(self.emit(ctx, member, user.id, record).await?);
        }
        Ok(created)
    }

    /// An issued credential notifies the proposal's authors. The event
    /// payload already names them, so no store read happens here.
    pub(crate) async fn on_proposal_credential_created(
        &self,
        ctx: &EventContext,
        proposal: &ProposalEntity,
        user: &UserEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let record = NotificationRecord::Proposal(ProposalNotification::new(
            ProposalNotificationType::CredentialCreated,
            proposal.id,
        ));
        let mut created = Vec::new();
        for author in &proposal.author_ids {
            created.extend(self.emit(ctx, *author, user.id, record.clone()).await?);
        }
        Ok(created)
    }
}
