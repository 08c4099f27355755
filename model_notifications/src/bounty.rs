use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;
use utoipa::ToSchema;
use uuid::Uuid;

/// A notification about a reward and the applications made against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants, ToSchema)]
#[strum_discriminants(name(BountyNotificationType))]
#[strum_discriminants(derive(strum::Display, Hash))]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum BountyNotification {
    /// Someone applied to a reward the recipient reviews.
    #[serde(rename = "application.created")]
    #[strum_discriminants(strum(serialize = "application.created"))]
    ApplicationCreated {
        /// The reward applied to.
        bounty_id: Uuid,
        /// The new application.
        application_id: Uuid,
    },
    /// The recipient's application was accepted.
    #[serde(rename = "application.approved")]
    #[strum_discriminants(strum(serialize = "application.approved"))]
    ApplicationApproved {
        /// The reward applied to.
        bounty_id: Uuid,
        /// The recipient's application.
        application_id: Uuid,
    },
    /// The recipient's application was rejected.
    #[serde(rename = "application.rejected")]
    #[strum_discriminants(strum(serialize = "application.rejected"))]
    ApplicationRejected {
        /// The reward applied to.
        bounty_id: Uuid,
        /// The recipient's application.
        application_id: Uuid,
    },
    /// An approved submission is waiting for the recipient to pay out.
    #[serde(rename = "application.payment_pending")]
    #[strum_discriminants(strum(serialize = "application.payment_pending"))]
    ApplicationPaymentPending {
        /// The reward concerned.
        bounty_id: Uuid,
        /// The application awaiting payment.
        application_id: Uuid,
    },
    /// The recipient's reward was paid out.
    #[serde(rename = "application.payment_completed")]
    #[strum_discriminants(strum(serialize = "application.payment_completed"))]
    ApplicationPaymentCompleted {
        /// The reward concerned.
        bounty_id: Uuid,
        /// The recipient's application.
        application_id: Uuid,
    },
    /// Work was submitted against a reward the recipient reviews.
    #[serde(rename = "submission.created")]
    #[strum_discriminants(strum(serialize = "submission.created"))]
    SubmissionCreated {
        /// The reward concerned.
        bounty_id: Uuid,
        /// The application the work was submitted under.
        application_id: Uuid,
    },
    /// The recipient's submitted work was approved.
    #[serde(rename = "submission.approved")]
    #[strum_discriminants(strum(serialize = "submission.approved"))]
    SubmissionApproved {
        /// The reward concerned.
        bounty_id: Uuid,
        /// The recipient's application.
        application_id: Uuid,
    },
    /// A member suggested a new reward for the recipient to triage.
    #[serde(rename = "suggestion.created")]
    #[strum_discriminants(strum(serialize = "suggestion.created"))]
    SuggestionCreated {
        /// The suggested reward.
        bounty_id: Uuid,
    },
}

impl BountyNotification {
    /// The dotted type discriminant.
    pub fn notification_type(&self) -> BountyNotificationType {
        self.into()
    }

    pub(crate) fn reference_ids(&self) -> (Uuid, Option<Uuid>) {
        match self {
            Self::ApplicationCreated {
                bounty_id,
                application_id,
            }
            | Self::ApplicationApproved {
                bounty_id,
                application_id,
            }
            | Self::ApplicationRejected {
                bounty_id,
                application_id,
            }
            | Self::ApplicationPaymentPending {
                bounty_id,
                application_id,
            }
            | Self::ApplicationPaymentCompleted {
                bounty_id,
                application_id,
            }
            | Self::SubmissionCreated {
                bounty_id,
                application_id,
            }
            | Self::SubmissionApproved {
                bounty_id,
                application_id,
            } => (*bounty_id, Some(*application_id)),
            Self::SuggestionCreated { bounty_id } => (*bounty_id, None),
        }
    }
}
