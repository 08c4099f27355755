use std::collections::HashSet;

use model_events::{ApplicationEntity, BountyEntity, UserEntity};
use model_notifications::{BountyNotification, NotificationRecord};
use uuid::Uuid;

use crate::engine::{EventContext, NotificationFanout};
use crate::error::FanoutError;

impl NotificationFanout {
    /// A new application notifies the reward's reviewers.
    pub(crate) async fn on_reward_application_created(
        &self,
        ctx: &EventContext,
        bounty: &BountyEntity,
        application: &ApplicationEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let reviewers = self.entities.bounty_reviewers(bounty.id).await?;

        let mut created = Vec::new();
        for reviewer in reviewers {
            let record = NotificationRecord::Bounty(BountyNotification::ApplicationCreated {
                bounty_id: bounty.id,
                application_id: application.id,
            });
            created.extend(self.emit(ctx, reviewer, application.created_by, record).await?);
        }
        Ok(created)
    }

    /// An accepted application notifies the applicant.
    pub(crate) async fn on_reward_application_approved(
        &self,
        ctx: &EventContext,
        bounty: &BountyEntity,
        application: &ApplicationEntity,
        user: &UserEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let record = NotificationRecord::Bounty(BountyNotification::ApplicationApproved {
            bounty_id: bounty.id,
            application_id: application.id,
        });
        Ok(self
            .emit(ctx, application.created_by, user.id, record)
            .await?
            .into_iter()
            .collect())
    }

    /// A rejected application notifies the applicant.
    pub(crate) async fn on_reward_application_rejected(
        &self,
        ctx: &EventContext,
        bounty: &BountyEntity,
        application: &ApplicationEntity,
        user: &UserEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let record = NotificationRecord::Bounty(BountyNotification::ApplicationRejected {
            bounty_id: bounty.id,
            application_id: application.id,
        });
        Ok(self
            .emit(ctx, application.created_by, user.id, record)
            .await?
            .into_iter()
            .collect())
    }

    /// Submitted work notifies the reward's reviewers.
    pub(crate) async fn on_reward_submission_created(
        &self,
        ctx: &EventContext,
        bounty: &BountyEntity,
        application: &ApplicationEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let reviewers = self.entities.bounty_reviewers(bounty.id).await?;

        let mut created = Vec::new();
        for reviewer in reviewers {
            let record = NotificationRecord::Bounty(BountyNotification::SubmissionCreated {
                bounty_id: bounty.id,
                application_id: application.id,
            });
            created.extend(self.emit(ctx, reviewer, application.created_by, record).await?);
        }
        Ok(created)
    }

    /// Approving a submission tells the applicant their work went through
    /// and tells the reviewers a payout is now due. A reviewer who is also
    /// the applicant only gets the applicant-facing record.
    pub(crate) async fn on_reward_submission_approved(
        &self,
        ctx: &EventContext,
        bounty: &BountyEntity,
        application: &ApplicationEntity,
        user: &UserEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let mut created = Vec::new();
        let mut claimed = HashSet::from([user.id]);

        if claimed.insert(application.created_by) {
            let record = NotificationRecord::Bounty(BountyNotification::SubmissionApproved {
                bounty_id: bounty.id,
                application_id: application.id,
            });
            created.extend(self.emit(ctx, application.created_by, user.id, record).await?);
        }

        for reviewer in self.entities.bounty_reviewers(bounty.id).await? {
            if claimed.insert(reviewer) {
                let record = NotificationRecord::Bounty(BountyNotification::ApplicationPaymentPending {
                    bounty_id: bounty.id,
                    application_id: application.id,
                });
                created.extend(self.emit(ctx, reviewer, user.id, record).await?);
            }
        }
        Ok(created)
    }

    /// A finished payout notifies the applicant.
    pub(crate) async fn on_reward_payment_completed(
        &self,
        ctx: &EventContext,
        bounty: &BountyEntity,
        application: &ApplicationEntity,
        user: &UserEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let record = NotificationRecord::Bounty(BountyNotification::ApplicationPaymentCompleted {
            bounty_id: bounty.id,
            application_id: application.id,
        });
        Ok(self
            .emit(ctx, application.created_by, user.id, record)
            .await?
            .into_iter()
            .collect())
    }

    /// A suggested reward notifies the space's admins for triage.
    pub(crate) async fn on_reward_suggestion_created(
        &self,
        ctx: &EventContext,
        bounty: &BountyEntity,
        user: &UserEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let admins: Vec<Uuid> = self
            .entities
            .space_members(ctx.space_id)
            .await?
            .into_iter()
            .filter(|member| member.is_admin)
            .map(|member| member.user_id)
            .collect();

        let mut created = Vec::new();
        for admin in admins {
            let record = NotificationRecord::Bounty(BountyNotification::SuggestionCreated { bounty_id: bounty.id });
            created.extend(self.emit(ctx, admin, user.id, record).await?);
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use model_events::{ApplicationEntity, BountyEntity, WebhookEvent};
    use model_notifications::{BountyNotificationType, NotificationRecord};
    use uuid::Uuid;

    use crate::handlers::support::{engine, envelope, space, user};
    use crate::memory::MemoryStore;

    fn bounty(id: Uuid, created_by: Uuid) -> BountyEntity {
        BountyEntity {
            id,
            title: "Translate the docs".to_owned(),
            created_by,
        }
    }

    fn application(id: Uuid, created_by: Uuid, bounty_id: Uuid) -> ApplicationEntity {
        ApplicationEntity {
            id,
            created_by,
            bounty_id,
        }
    }

    fn bounty_type(record: &NotificationRecord) -> BountyNotificationType {
        match record {
            NotificationRecord::Bounty(inner) => inner.notification_type(),
            other => panic!("expected a bounty notification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn application_created_notifies_the_reviewers() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let bounty_id = Uuid::now_v7();
        let application_id = Uuid::now_v7();
        let applicant = Uuid::now_v7();
        let first_reviewer = Uuid::now_v7();
        let second_reviewer = Uuid::now_v7();
        store.put_reviewers(bounty_id, vec![first_reviewer, second_reviewer]);

        let event = WebhookEvent::RewardApplicationCreated {
            bounty: bounty(bounty_id, Uuid::now_v7()),
            space: space(space_id),
            application: application(application_id, applicant, bounty_id),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 2);
        for reviewer in [first_reviewer, second_reviewer] {
            let saved = store.saved_for(reviewer);
            assert_eq!(saved.len(), 1);
            assert_eq!(bounty_type(&saved[0].record), BountyNotificationType::ApplicationCreated);
            assert_eq!(saved[0].metadata.created_by, applicant);
            assert_eq!(saved[0].record.toggle_group(), "rewards");
            assert_eq!(saved[0].record.reference_ids(), (bounty_id, Some(application_id)));
        }
    }

    #[tokio::test]
    async fn approving_an_application_notifies_the_applicant() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let bounty_id = Uuid::now_v7();
        let applicant = Uuid::now_v7();
        let reviewer = Uuid::now_v7();

        let event = WebhookEvent::RewardApplicationApproved {
            bounty: bounty(bounty_id, Uuid::now_v7()),
            space: space(space_id),
            application: application(Uuid::now_v7(), applicant, bounty_id),
            user: user(reviewer),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 1);
        let saved = store.saved_for(applicant);
        assert_eq!(bounty_type(&saved[0].record), BountyNotificationType::ApplicationApproved);
        assert_eq!(saved[0].metadata.created_by, reviewer);
    }

    #[tokio::test]
    async fn rejecting_an_application_notifies_the_applicant() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let applicant = Uuid::now_v7();

        let event = WebhookEvent::RewardApplicationRejected {
            bounty: bounty(Uuid::now_v7(), Uuid::now_v7()),
            space: space(space_id),
            application: application(Uuid::now_v7(), applicant, Uuid::now_v7()),
            user: user(Uuid::now_v7()),
        };
        engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(
            bounty_type(&store.saved_for(applicant)[0].record),
            BountyNotificationType::ApplicationRejected
        );
    }

    #[tokio::test]
    async fn submission_created_skips_a_reviewer_who_is_the_applicant() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let bounty_id = Uuid::now_v7();
        let applicant_reviewer = Uuid::now_v7();
        let other_reviewer = Uuid::now_v7();
        store.put_reviewers(bounty_id, vec![applicant_reviewer, other_reviewer]);

        let event = WebhookEvent::RewardSubmissionCreated {
            bounty: bounty(bounty_id, Uuid::now_v7()),
            space: space(space_id),
            application: application(Uuid::now_v7(), applicant_reviewer, bounty_id),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(
            bounty_type(&store.saved_for(other_reviewer)[0].record),
            BountyNotificationType::SubmissionCreated
        );
        assert!(store.saved_for(applicant_reviewer).is_empty());
    }

    #[tokio::test]
    async fn submission_approval_splits_applicant_and_reviewer_records() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let bounty_id = Uuid::now_v7();
        let application_id = Uuid::now_v7();
        let applicant = Uuid::now_v7();
        let approver = Uuid::now_v7();
        let other_reviewer = Uuid::now_v7();
        store.put_reviewers(bounty_id, vec![approver, other_reviewer]);

        let event = WebhookEvent::RewardSubmissionApproved {
            bounty: bounty(bounty_id, Uuid::now_v7()),
            space: space(space_id),
            application: application(application_id, applicant, bounty_id),
            user: user(approver),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(
            bounty_type(&store.saved_for(applicant)[0].record),
            BountyNotificationType::SubmissionApproved
        );
        assert_eq!(
            bounty_type(&store.saved_for(other_reviewer)[0].record),
            BountyNotificationType::ApplicationPaymentPending
        );
        assert!(store.saved_for(approver).is_empty());
    }

    #[tokio::test]
    async fn an_applicant_reviewer_gets_only_the_applicant_record_on_approval() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let bounty_id = Uuid::now_v7();
        let applicant_reviewer = Uuid::now_v7();
        let approver = Uuid::now_v7();
        store.put_reviewers(bounty_id, vec![applicant_reviewer, approver]);

        let event = WebhookEvent::RewardSubmissionApproved {
            bounty: bounty(bounty_id, Uuid::now_v7()),
            space: space(space_id),
            application: application(Uuid::now_v7(), applicant_reviewer, bounty_id),
            user: user(approver),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 1);
        let saved = store.saved_for(applicant_reviewer);
        assert_eq!(saved.len(), 1);
        assert_eq!(bounty_type(&saved[0].record), BountyNotificationType::SubmissionApproved);
    }

    #[tokio::test]
    async fn payment_completion_notifies_the_applicant() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let applicant = Uuid::now_v7();

        let event = WebhookEvent::RewardApplicationPaymentCompleted {
            bounty: bounty(Uuid::now_v7(), Uuid::now_v7()),
            space: space(space_id),
            application: application(Uuid::now_v7(), applicant, Uuid::now_v7()),
            user: user(Uuid::now_v7()),
        };
        engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(
            bounty_type(&store.saved_for(applicant)[0].record),
            BountyNotificationType::ApplicationPaymentCompleted
        );
    }

    #[tokio::test]
    async fn suggestions_reach_only_the_space_admins() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let bounty_id = Uuid::now_v7();
        let suggester = Uuid::now_v7();
        let admin = Uuid::now_v7();
        let member = Uuid::now_v7();
        store.add_member(space_id, admin, true);
        store.add_member(space_id, member, false);
        store.add_member(space_id, suggester, false);

        let event = WebhookEvent::RewardSuggestionCreated {
            bounty: bounty(bounty_id, suggester),
            space: space(space_id),
            user: user(suggester),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 1);
        let saved = store.saved_for(admin);
        assert_eq!(bounty_type(&saved[0].record), BountyNotificationType::SuggestionCreated);
        assert_eq!(saved[0].record.reference_ids(), (bounty_id, None));
        assert!(store.saved_for(member).is_empty());
    }
}
