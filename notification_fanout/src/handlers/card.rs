use std::collections::HashSet;

use mention_utils::extract_mentions;
use model_events::{BlockCommentEntity, DocumentEntity, UserEntity};
use model_notifications::{CardNotification, NotificationRecord};
use uuid::Uuid;

use crate::engine::{EventContext, NotificationFanout};
use crate::error::FanoutError;
use crate::store::CommentScope;

impl NotificationFanout {
    /// A block comment notifies, in priority order, the author of the
    /// previous comment on the card, anyone mentioned in the body, and the
    /// card author. Each user gets at most one notification.
    pub(crate) async fn on_card_block_comment_created(
        &self,
        ctx: &EventContext,
        card: &DocumentEntity,
        block_comment: &BlockCommentEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let actor = block_comment.author.id;
        let previous = self
            .entities
            .find_previous_comment(CommentScope::CardBlock(card.id), block_comment.id)
            .await?;

        let mut created = Vec::new();
        let mut claimed = HashSet::from([actor]);

        if let Some(previous) = previous {
            if claimed.insert(previous.author_id) {
                let record = NotificationRecord::Card(CardNotification::BlockCommentReplied {
                    card_id: card.id,
                    block_comment_id: block_comment.id,
                });
                created.extend(self.emit(ctx, previous.author_id, actor, record).await?);
            }
        }

        for mention in extract_mentions(&block_comment.content) {
            let Some(mentioned) = mention.mentioned_user() else { continue };
            if claimed.insert(mentioned) {
                let record = NotificationRecord::Card(CardNotification::BlockCommentMentionCreated {
                    card_id: card.id,
                    block_comment_id: block_comment.id,
                    mention_id: mention.id,
                });
                created.extend(self.emit(ctx, mentioned, actor, record).await?);
            }
        }

        if claimed.insert(card.author.id) {
            let record = NotificationRecord::Card(CardNotification::BlockCommentCreated {
                card_id: card.id,
                block_comment_id: block_comment.id,
            });
            created.extend(self.emit(ctx, card.author.id, actor, record).await?);
        }

        Ok(created)
    }

    /// Assigning a user through a person property notifies that user alone.
    pub(crate) async fn on_card_person_property_assigned(
        &self,
        ctx: &EventContext,
        card: &DocumentEntity,
        assigned_user: &UserEntity,
        person_property_id: Uuid,
        user: &UserEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let record = NotificationRecord::Card(CardNotification::PersonAssigned {
            card_id: card.id,
            person_property_id,
        });
        Ok(self
            .emit(ctx, assigned_user.id, user.id, record)
            .await?
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mention_utils::{ContentNode, MentionMetadata};
    use model_events::{BlockCommentEntity, WebhookEvent};
    use model_notifications::{CardNotificationType, NotificationRecord};
    use uuid::Uuid;

    use crate::handlers::support::{engine, envelope, page, space, user};
    use crate::memory::MemoryStore;
    use crate::store::{CommentRef, CommentScope};

    fn card_type(record: &NotificationRecord) -> CardNotificationType {
        match record {
            NotificationRecord::Card(inner) => inner.notification_type(),
            other => panic!("expected a card notification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn block_comment_fans_out_to_previous_author_mentions_and_card_author() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let card_author = Uuid::now_v7();
        let earlier_commenter = Uuid::now_v7();
        let mentioned = Uuid::now_v7();
        let commenter = Uuid::now_v7();
        let card_id = Uuid::now_v7();
        let comment_id = Uuid::now_v7();
        let mention = MentionMetadata::user(Uuid::now_v7(), mentioned);

        let scope = CommentScope::CardBlock(card_id);
        store.push_sibling(scope, CommentRef { id: Uuid::now_v7(), author_id: earlier_commenter });
        store.push_sibling(scope, CommentRef { id: comment_id, author_id: commenter });

        let event = WebhookEvent::CardBlockCommentCreated {
            card: page(card_id, card_author),
            space: space(space_id),
            block_comment: BlockCommentEntity {
                id: comment_id,
                author: user(commenter),
                content: ContentNode::doc(vec![ContentNode::paragraph(vec![ContentNode::mention(&mention)])]),
            },
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 3);
        assert_eq!(
            card_type(&store.saved_for(earlier_commenter)[0].record),
            CardNotificationType::BlockCommentReplied
        );
        assert_eq!(
            card_type(&store.saved_for(mentioned)[0].record),
            CardNotificationType::BlockCommentMentionCreated
        );
        assert_eq!(
            card_type(&store.saved_for(card_author)[0].record),
            CardNotificationType::BlockCommentCreated
        );
        for saved in store.saved() {
            assert_eq!(saved.record.toggle_group(), "pages");
        }
    }

    #[tokio::test]
    async fn first_comment_by_the_card_author_notifies_nobody() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let card_author = Uuid::now_v7();
        let card_id = Uuid::now_v7();
        let comment_id = Uuid::now_v7();
        store.push_sibling(CommentScope::CardBlock(card_id), CommentRef { id: comment_id, author_id: card_author });

        let event = WebhookEvent::CardBlockCommentCreated {
            card: page(card_id, card_author),
            space: space(space_id),
            block_comment: BlockCommentEntity {
                id: comment_id,
                author: user(card_author),
                content: ContentNode::default(),
            },
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert!(created.is_empty());
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn person_assignment_notifies_the_assigned_user() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let assignee = Uuid::now_v7();
        let assigner = Uuid::now_v7();
        let card_id = Uuid::now_v7();
        let person_property_id = Uuid::now_v7();

        let event = WebhookEvent::CardPersonPropertyAssigned {
            card: page(card_id, Uuid::now_v7()),
            space: space(space_id),
            assigned_user: user(assignee),
            person_property_id,
            user: user(assigner),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert_eq!(created.len(), 1);
        let saved = store.saved_for(assignee);
        assert_eq!(card_type(&saved[0].record), CardNotificationType::PersonAssigned);
        assert_eq!(saved[0].metadata.created_by, assigner);
        assert_eq!(saved[0].record.reference_ids(), (card_id, Some(person_property_id)));
    }

    #[tokio::test]
    async fn assigning_yourself_is_suppressed() {
        let store = Arc::new(MemoryStore::default());
        let space_id = Uuid::now_v7();
        let assigner = Uuid::now_v7();

        let event = WebhookEvent::CardPersonPropertyAssigned {
            card: page(Uuid::now_v7(), Uuid::now_v7()),
            space: space(space_id),
            assigned_user: user(assigner),
            person_property_id: Uuid::now_v7(),
            user: user(assigner),
        };
        let created = engine(&store).dispatch(&envelope(space_id, event)).await.unwrap();

        assert!(created.is_empty());
    }
}
