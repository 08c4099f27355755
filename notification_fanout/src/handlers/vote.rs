use model_events::VoteEntity;
use model_notifications::{NotificationRecord, VoteNotification};
use uuid::Uuid;

use crate::engine::{EventContext, NotificationFanout};
use crate::error::FanoutError;
use crate::store::VoteStatus;

impl NotificationFanout {
    /// An open poll notifies every member allowed to comment on the surface
    /// hosting it. The store is authoritative here; polls that are gone or
    /// already closed by the time the event lands are dropped quietly.
    pub(crate) async fn on_vote_created(
        &self,
        ctx: &EventContext,
        vote: &VoteEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let Some(details) = self.entities.vote(vote.id).await? else {
            tracing::warn!(vote_id = %vote.id, "poll not found, skipping");
            return Ok(Vec::new());
        };
        if details.status != VoteStatus::InProgress {
            tracing::debug!(vote_id = %vote.id, status = %details.status, "poll is not open, skipping");
            return Ok(Vec::new());
        }
        let Some(resource_id) = details.page_id.or(details.post_category_id) else {
            tracing::warn!(vote_id = %vote.id, "poll is attached to neither a page nor a post, skipping");
            return Ok(Vec::new());
        };

        let candidates: Vec<Uuid> = self
            .entities
            .space_members(ctx.space_id)
            .await?
            .into_iter()
            .map(|member| member.user_id)
            .filter(|member| *member != details.created_by)
            .collect();

        let mut created = Vec::new();
        for (member, permissions) in self.permissions_for(resource_id, candidates).await {
            if !permissions.comment {
                continue;
            }
            let record = NotificationRecord::Vote(VoteNotification { vote_id: vote.id });
            created.extend(self.emit(ctx, member, details.created_by, record).await?);
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use model_events::{VoteEntity, WebhookEvent};
    use model_permissions::AvailablePermissions;
    use uuid::Uuid;

    use crate::handlers::support::{engine, envelope, space, user};
    use crate::memory::MemoryStore;
    use crate::store::{VoteDetails, VoteStatus};

    fn page_vote(id: Uuid, created_by: Uuid, page_id: Uuid) -> VoteEntity {
        VoteEntity {
            id,
            title: "Ship it?".to_owned(),
            created_by,
            page_id: Some(page_id),
            post_id: None,
        }
    }

    #[tokio::test]
    async fn page_poll_notifies_members_who_can_comment() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let page_id = Uuid::now_v7();
        let vote_id = Uuid::now_v7();
        let creator = Uuid::now_v7();
        let commenter = Uuid::now_v7();
        let viewer = Uuid::now_v7();

        store.put_vote(
            vote_id,
            VoteDetails {
                created_by: creator,
                status: VoteStatus::InProgress,
                page_id: Some(page_id),
                post_category_id: None,
            },
        );
        for member in [creator, commenter, viewer] {
            store.add_member(space_id, member, false);
        }
        store.grant(page_id, commenter, AvailablePermissions::commenter());
        store.grant(page_id, viewer, AvailablePermissions::viewer());
        store.grant(page_id, creator, AvailablePermissions::commenter());

        let event = WebhookEvent::VoteCreated {
            vote: page_vote(vote_id, creator, page_id),
            space: space(space_id),
            user: user(creator),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 1);
        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].metadata.user_id, commenter);
        assert_eq!(saved[0].metadata.created_by, creator);
        assert_eq!(saved[0].record.type_key(), "new_vote");
        assert_eq!(saved[0].record.toggle_group(), "polls");
        assert_eq!(saved[0].record.reference_ids(), (vote_id, None));
    }

    #[tokio::test]
    async fn closed_poll_is_a_silent_noop() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let vote_id = Uuid::now_v7();
        let creator = Uuid::now_v7();
        let member = Uuid::now_v7();
        let page_id = Uuid::now_v7();

        store.put_vote(
            vote_id,
            VoteDetails {
                created_by: creator,
                status: VoteStatus::Passed,
                page_id: Some(page_id),
                post_category_id: None,
            },
        );
        store.add_member(space_id, member, false);
        store.grant(page_id, member, AvailablePermissions::commenter());

        let event = WebhookEvent::VoteCreated {
            vote: page_vote(vote_id, creator, page_id),
            space: space(space_id),
            user: user(creator),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert!(created.is_empty());
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn unknown_poll_is_a_silent_noop() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let creator = Uuid::now_v7();

        let event = WebhookEvent::VoteCreated {
            vote: page_vote(Uuid::now_v7(), creator, Uuid::now_v7()),
            space: space(space_id),
            user: user(creator),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn forum_poll_resolves_permissions_through_the_post_category() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let category_id = Uuid::now_v7();
        let vote_id = Uuid::now_v7();
        let creator = Uuid::now_v7();
        let member = Uuid::now_v7();
        let post_id = Uuid::now_v7();

        store.put_vote(
            vote_id,
            VoteDetails {
                created_by: creator,
                status: VoteStatus::InProgress,
                page_id: None,
                post_category_id: Some(category_id),
            },
        );
        store.add_member(space_id, member, false);
        store.grant(category_id, member, AvailablePermissions::commenter());

        let event = WebhookEvent::VoteCreated {
            vote: VoteEntity {
                id: vote_id,
                title: "Next meetup".to_owned(),
                created_by: creator,
                page_id: None,
                post_id: Some(post_id),
            },
            space: space(space_id),
            user: user(creator),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(store.saved()[0].metadata.user_id, member);
    }
}
