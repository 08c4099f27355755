use std::collections::HashSet;

use mention_utils::extract_mentions;
use model_events::{PostEntity, UserEntity};
use model_notifications::{NotificationRecord, PostNotification};
use uuid::Uuid;

use crate::engine::{EventContext, NotificationFanout};
use crate::error::{FanoutError, ResourceKind};

impl NotificationFanout {
    /// A published post notifies every member who subscribes to its category
    /// and can view it. A member mentioned in the body gets the mention
    /// record instead of the plain created one, never both.
    pub(crate) async fn on_forum_post_created(
        &self,
        ctx: &EventContext,
        post: &PostEntity,
        user: &UserEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let details = self
            .entities
            .post(post.id)
            .await?
            .ok_or_else(|| FanoutError::not_found(ResourceKind::Post, post.id))?;
        let subscribers: HashSet<Uuid> = self
            .entities
            .post_category_subscribers(details.category_id)
            .await?
            .into_iter()
            .collect();
        let candidates: Vec<Uuid> = self
            .entities
            .space_members(ctx.space_id)
            .await?
            .into_iter()
            .map(|member| member.user_id)
            .filter(|member| *member != user.id && subscribers.contains(member))
            .collect();
        let mentions = extract_mentions(&details.content);

        let mut created = Vec::new();
        for (member, permissions) in self.permissions_for(details.category_id, candidates).await {
            if !permissions.view {
                continue;
            }
            let mention = mentions.iter().find(|mention| mention.mentioned_user() == Some(member));
            let record = match mention {
                Some(mention) => NotificationRecord::Post(PostNotification::MentionCreated {
                    post_id: post.id,
                    mention_id: mention.id,
                }),
                None => NotificationRecord::Post(PostNotification::Created { post_id: post.id }),
            };
            created.extend(self.emit(ctx, member, user.id, record).await?);
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mention_utils::{ContentNode, MentionMetadata};
    use model_events::WebhookEvent;
    use model_notifications::{NotificationRecord, PostNotificationType};
    use model_permissions::AvailablePermissions;
    use uuid::Uuid;

    use crate::handlers::support::{engine, envelope, post, space, user};
    use crate::memory::MemoryStore;
    use crate::store::PostDetails;

    fn post_type(record: &NotificationRecord) -> PostNotificationType {
        match record {
            NotificationRecord::Post(inner) => inner.notification_type(),
            other => panic!("expected a post notification, got {other:?}"),
        }
    }

    fn seed_post(store: &MemoryStore, post_id: Uuid, category_id: Uuid, author_id: Uuid) {
        store.put_post(
            post_id,
            PostDetails {
                category_id,
                author_id,
                content: ContentNode::default(),
            },
        );
    }

    #[tokio::test]
    async fn only_subscribers_who_can_view_are_notified() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let category_id = Uuid::now_v7();
        let post_id = Uuid::now_v7();
        let author = Uuid::now_v7();
        let allowed = Uuid::now_v7();
        let blocked = Uuid::now_v7();
        let unsubscribed = Uuid::now_v7();

        seed_post(&store, post_id, category_id, author);
        for member in [author, allowed, blocked, unsubscribed] {
            store.add_member(space_id, member, false);
        }
        for subscriber in [author, allowed, blocked] {
            store.subscribe(category_id, subscriber);
        }
        store.grant(category_id, allowed, AvailablePermissions::viewer());
        store.grant(category_id, unsubscribed, AvailablePermissions::viewer());

        let event = WebhookEvent::ForumPostCreated {
            post: post(post_id, category_id, author),
            space: space(space_id),
            user: user(author),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 1);
        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].metadata.user_id, allowed);
        assert_eq!(post_type(&saved[0].record), PostNotificationType::Created);
        assert_eq!(saved[0].record.toggle_group(), "forum");
        assert_eq!(saved[0].record.reference_ids(), (post_id, None));
    }

    #[tokio::test]
    async fn mentioned_subscriber_gets_the_mention_instead_of_created() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let category_id = Uuid::now_v7();
        let post_id = Uuid::now_v7();
        let author = Uuid::now_v7();
        let mentioned = Uuid::now_v7();
        let other = Uuid::now_v7();
        let mention = MentionMetadata::user(Uuid::now_v7(), mentioned);

        store.put_post(
            post_id,
            PostDetails {
                category_id,
                author_id: author,
                content: ContentNode::doc(vec![ContentNode::paragraph(vec![ContentNode::mention(&mention)])]),
            },
        );
        for member in [author, mentioned, other] {
            store.add_member(space_id, member, false);
            store.subscribe(category_id, member);
            store.grant(category_id, member, AvailablePermissions::viewer());
        }

        let event = WebhookEvent::ForumPostCreated {
            post: post(post_id, category_id, author),
            space: space(space_id),
            user: user(author),
        };
        engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        let to_mentioned = store.saved_for(mentioned);
        assert_eq!(to_mentioned.len(), 1);
        assert_eq!(post_type(&to_mentioned[0].record), PostNotificationType::MentionCreated);
        assert_eq!(to_mentioned[0].record.reference_ids(), (post_id, Some(mention.id)));

        let to_other = store.saved_for(other);
        assert_eq!(to_other.len(), 1);
        assert_eq!(post_type(&to_other[0].record), PostNotificationType::Created);
    }

    #[tokio::test]
    async fn permission_failure_drops_only_that_member() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let category_id = Uuid::now_v7();
        let post_id = Uuid::now_v7();
        let author = Uuid::now_v7();
        let healthy = Uuid::now_v7();
        let broken = Uuid::now_v7();

        seed_post(&store, post_id, category_id, author);
        for member in [author, healthy, broken] {
            store.add_member(space_id, member, false);
            store.subscribe(category_id, member);
        }
        store.grant(category_id, healthy, AvailablePermissions::viewer());
        store.break_permissions(category_id, broken);

        let event = WebhookEvent::ForumPostCreated {
            post: post(post_id, category_id, author),
            space: space(space_id),
            user: user(author),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(store.saved()[0].metadata.user_id, healthy);
    }

    #[tokio::test]
    async fn missing_post_is_fatal_for_the_event() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let post_id = Uuid::now_v7();

        let event = WebhookEvent::ForumPostCreated {
            post: post(post_id, Uuid::now_v7(), Uuid::now_v7()),
            space: space(space_id),
            user: user(Uuid::now_v7()),
        };
        let error = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap_err();

        assert!(matches!(
            error,
            crate::FanoutError::NotFound { kind: crate::ResourceKind::Post, id } if id == post_id
        ));
    }
}
