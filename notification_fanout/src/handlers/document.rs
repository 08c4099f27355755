use std::collections::HashSet;

use mention_utils::{extract_mentions, MentionMetadata};
use model_events::{CommentEntity, DocumentEntity, DocumentEventSource, InlineCommentEntity, UserEntity};
use model_notifications::{DocumentNotification, DocumentTarget, NotificationRecord};
use uuid::Uuid;

use crate::engine::{EventContext, NotificationFanout};
use crate::error::{FanoutError, ResourceKind};
use crate::store::CommentScope;

fn target_of(source: &DocumentEventSource) -> DocumentTarget {
    match source {
        DocumentEventSource::Document { document } => DocumentTarget::page(document.id),
        DocumentEventSource::Post { post } => DocumentTarget::post(post.id),
    }
}

impl NotificationFanout {
    /// A mention in a page or post body notifies the mentioned user and
    /// nobody else. Role mentions are not fanned out.
    pub(crate) async fn on_document_mention_created(
        &self,
        ctx: &EventContext,
        source: &DocumentEventSource,
        user: &UserEntity,
        mention: &MentionMetadata,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let Some(mentioned) = mention.mentioned_user() else {
            tracing::debug!(mention_id = %mention.id, "mention does not target a single user, skipping");
            return Ok(Vec::new());
        };

        let record = NotificationRecord::Document(DocumentNotification::MentionCreated {
            target: target_of(source),
            mention_id: mention.id,
        });
        Ok(self.emit(ctx, mentioned, user.id, record).await?.into_iter().collect())
    }

    /// An inline comment notifies, in priority order, the author of the
    /// previous comment in the thread, anyone mentioned in the body, and
    /// the document author. Each user gets at most one notification.
    pub(crate) async fn on_document_inline_comment_created(
        &self,
        ctx: &EventContext,
        document: &DocumentEntity,
        inline_comment: &InlineCommentEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let details = self
            .entities
            .comment(inline_comment.id)
            .await?
            .ok_or_else(|| FanoutError::not_found(ResourceKind::Comment, inline_comment.id))?;
        let actor = inline_comment.author.id;
        let previous = self
            .entities
            .find_previous_comment(CommentScope::Thread(inline_comment.thread_id), inline_comment.id)
            .await?;

        let mut created = Vec::new();
        let mut claimed = HashSet::from([actor]);

        if let Some(previous) = previous {
            if claimed.insert(previous.author_id) {
                let record = NotificationRecord::Document(DocumentNotification::InlineCommentReplied {
                    page_id: document.id,
                    inline_comment_id: inline_comment.id,
                });
                created.extend(self.emit(ctx, previous.author_id, actor, record).await?);
            }
        }

        for mention in extract_mentions(&details.content) {
            let Some(mentioned) = mention.mentioned_user() else { continue };
            if claimed.insert(mentioned) {
                let record = NotificationRecord::Document(DocumentNotification::InlineCommentMentionCreated {
                    page_id: document.id,
                    inline_comment_id: inline_comment.id,
                    mention_id: mention.id,
                });
                created.extend(self.emit(ctx, mentioned, actor, record).await?);
            }
        }

        if claimed.insert(document.author.id) {
            let record = NotificationRecord::Document(DocumentNotification::InlineCommentCreated {
                page_id: document.id,
                inline_comment_id: inline_comment.id,
            });
            created.extend(self.emit(ctx, document.author.id, actor, record).await?);
        }

        Ok(created)
    }

    /// A top-level comment notifies the page or post author; a reply
    /// notifies the parent comment's author instead. Mentions in the body
    /// take priority over the author notification.
    pub(crate) async fn on_document_comment_created(
        &self,
        ctx: &EventContext,
        source: &DocumentEventSource,
        comment: &CommentEntity,
    ) -> Result<Vec<Uuid>, FanoutError> {
        let details = self
            .entities
            .comment(comment.id)
            .await?
            .ok_or_else(|| FanoutError::not_found(ResourceKind::Comment, comment.id))?;
        let actor = comment.author.id;
        let target = target_of(source);

        let mut created = Vec::new();
        let mut claimed = HashSet::from([actor]);

        if let Some(parent) = details.parent {
            if claimed.insert(parent.author_id) {
                let record = NotificationRecord::Document(DocumentNotification::CommentReplied {
                    target,
                    comment_id: comment.id,
                });
                created.extend(self.emit(ctx, parent.author_id, actor, record).await?);
            }
        }

        for mention in extract_mentions(&details.content) {
            let Some(mentioned) = mention.mentioned_user() else { continue };
            if claimed.insert(mentioned) {
                let record = NotificationRecord::Document(DocumentNotification::CommentMentionCreated {
                    target,
                    comment_id: comment.id,
                    mention_id: mention.id,
                });
                created.extend(self.emit(ctx, mentioned, actor, record).await?);
            }
        }

        if details.parent.is_none() && claimed.insert(source.author_id()) {
            let record = NotificationRecord::Document(DocumentNotification::CommentCreated {
                target,
                comment_id: comment.id,
            });
            created.extend(self.emit(ctx, source.author_id(), actor, record).await?);
        }

        Ok(created)
    }
}
