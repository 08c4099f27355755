use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// What happened to the proposal, from the recipient's point of view.
///
/// Lifecycle types are phrased as the action the recipient is expected to
/// take where one exists (`vote`, `needs_review`) and as the outcome
/// otherwise (`proposal_passed`, `proposal_failed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProposalNotificationType {
    /// The proposal reached its public discussion step.
    StartDiscussion,
    /// The recipient's own proposal is under discussion.
    ReviewRequired,
    /// The proposal reached a review step the recipient is a reviewer of.
    NeedsReview,
    /// The recipient's own proposal finished its review step.
    Reviewed,
    /// The proposal reached a vote step the recipient may vote in.
    Vote,
    /// The recipient's own proposal passed its final step.
    ProposalPassed,
    /// The recipient's own proposal failed.
    ProposalFailed,
    /// The recipient's proposal passed and its linked rewards went live.
    RewardPublished,
    /// The proposal was published and awaits the recipient's evaluation.
    ProposalPublished,
    /// The proposal's outcome was appealed.
    ProposalAppealed,
    /// A credential was issued for the recipient's proposal.
    CredentialCreated,
}

/// A notification about a proposal moving through its lifecycle.
///
/// Every proposal notification carries the same references, so the family
/// is a plain struct over its type discriminant rather than a sum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalNotification {
    /// What happened.
    #[serde(rename = "type")]
    pub kind: ProposalNotificationType,
    /// The proposal concerned.
    pub proposal_id: Uuid,
    /// The evaluation step the notification refers to, when it refers
    /// to a specific one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_id: Option<Uuid>,
}

impl ProposalNotification {
    /// A notification about the proposal as a whole.
    pub fn new(kind: ProposalNotificationType, proposal_id: Uuid) -> Self {
        Self {
            kind,
            proposal_id,
            evaluation_id: None,
        }
    }

    /// A notification tied to one evaluation step.
    pub fn for_evaluation(kind: ProposalNotificationType, proposal_id: Uuid, evaluation_id: Uuid) -> Self {
        Self {
            kind,
            proposal_id,
            evaluation_id: Some(evaluation_id),
        }
    }

    /// The type discriminant.
    pub fn notification_type(&self) -> ProposalNotificationType {
        self.kind
    }

    pub(crate) fn reference_ids(&self) -> (Uuid, Option<Uuid>) {
        (self.proposal_id, self.evaluation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_types_use_snake_case_keys() {
        assert_eq!(ProposalNotificationType::StartDiscussion.to_string(), "start_discussion");
        assert_eq!(ProposalNotificationType::RewardPublished.to_string(), "reward_published");

        let record = ProposalNotification::new(ProposalNotificationType::Vote, Uuid::now_v7());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "vote");
        assert!(json.get("evaluationId").is_none());
    }

    #[test]
    fn evaluation_reference_is_the_secondary_id() {
        let proposal_id = Uuid::now_v7();
        let evaluation_id = Uuid::now_v7();
        let record =
            ProposalNotification::for_evaluation(ProposalNotificationType::NeedsReview, proposal_id, evaluation_id);

        assert_eq!(record.reference_ids(), (proposal_id, Some(evaluation_id)));
    }
}
