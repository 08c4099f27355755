//! Read queries against the application's entity tables.
//!
//! Each function returns exactly the fields its [`EntityStore`] method
//! promises. Rows come back as local [`sqlx::FromRow`] structs and are mapped
//! into the engine's types at the edge.
//!
//! [`EntityStore`]: notification_fanout::store::EntityStore

use anyhow::Context;
use mention_utils::ContentNode;
use notification_fanout::store::{
    CommentDetails, CommentRef, CommentScope, EvaluationDetails, PostDetails, ProposalDetails,
    SpaceMember, VoteDetails, VoteStatus,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct SpaceMemberRow {
    user_id: Uuid,
    is_admin: bool,
}

/// Every member of a space with their admin flag.
#[tracing::instrument(skip(db))]
pub async fn get_space_members(
    db: &Pool<Postgres>,
    space_id: Uuid,
) -> anyhow::Result<Vec<SpaceMember>> {
    let rows: Vec<SpaceMemberRow> = sqlx::query_as(
        r#"
        SELECT "userId" AS user_id, "isAdmin" AS is_admin
        FROM "SpaceRole"
        WHERE "spaceId" = $1
        "#,
    )
    .bind(space_id)
    .fetch_all(db)
    .await
    .context("unable to load space members")?;

    Ok(rows
        .into_iter()
        .map(|row| SpaceMember { user_id: row.user_id, is_admin: row.is_admin })
        .collect())
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    content: serde_json::Value,
    parent_id: Option<Uuid>,
    parent_author_id: Option<Uuid>,
}

/// A comment's body and, for threaded comments, the parent's author.
#[tracing::instrument(skip(db))]
pub async fn get_comment(db: &Pool<Postgres>, id: Uuid) -> anyhow::Result<Option<CommentDetails>> {
    let row: Option<CommentRow> = sqlx::query_as(
        r#"
        SELECT
            comment."content" AS content,
            parent."id" AS parent_id,
            parent."createdBy" AS parent_author_id
        FROM "Comment" comment
        LEFT JOIN "Comment" parent ON parent."id" = comment."parentId"
        WHERE comment."id" = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("unable to load comment")?;

    let Some(row) = row else {
        return Ok(None);
    };
    let content: ContentNode =
        serde_json::from_value(row.content).context("comment content is not rich content")?;
    let parent = row
        .parent_id
        .zip(row.parent_author_id)
        .map(|(id, author_id)| CommentRef { id, author_id });

    Ok(Some(CommentDetails { content, parent }))
}

#[derive(sqlx::FromRow)]
struct PreviousCommentRow {
    id: Uuid,
    author_id: Uuid,
}

/// The newest comment in the scope other than the one being fanned out.
#[tracing::instrument(skip(db))]
pub async fn find_previous_comment(
    db: &Pool<Postgres>,
    scope: CommentScope,
    excluding: Uuid,
) -> anyhow::Result<Option<CommentRef>> {
    // The comment table carries both inline threads and card block comments;
    // the scope picks which foreign key to filter on.
    let (sql, scope_id) = match scope {
        CommentScope::Thread(thread_id) => (
            r#"
            SELECT "id" AS id, "createdBy" AS author_id
            FROM "Comment"
            WHERE "threadId" = $1 AND "id" != $2
            ORDER BY "createdAt" DESC
            LIMIT 1
            "#,
            thread_id,
        ),
        CommentScope::CardBlock(card_id) => (
            r#"
            SELECT "id" AS id, "createdBy" AS author_id
            FROM "Comment"
            WHERE "cardId" = $1 AND "id" != $2
            ORDER BY "createdAt" DESC
            LIMIT 1
            "#,
            card_id,
        ),
    };

    let row: Option<PreviousCommentRow> = sqlx::query_as(sql)
        .bind(scope_id)
        .bind(excluding)
        .fetch_optional(db)
        .await
        .context("unable to resolve the previous comment")?;

    Ok(row.map(|row| CommentRef { id: row.id, author_id: row.author_id }))
}

#[derive(sqlx::FromRow)]
struct PostRow {
    category_id: Uuid,
    author_id: Uuid,
    content: serde_json::Value,
}

/// A forum post's category, author and body.
#[tracing::instrument(skip(db))]
pub async fn get_post(db: &Pool<Postgres>, id: Uuid) -> anyhow::Result<Option<PostDetails>> {
    let row: Option<PostRow> = sqlx::query_as(
        r#"
        SELECT "categoryId" AS category_id, "createdBy" AS author_id, "content" AS content
        FROM "Post"
        WHERE "id" = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("unable to load post")?;

    let Some(row) = row else {
        return Ok(None);
    };
    let content: ContentNode =
        serde_json::from_value(row.content).context("post content is not rich content")?;

    Ok(Some(PostDetails { category_id: row.category_id, author_id: row.author_id, content }))
}

/// Users subscribed to a post category.
#[tracing::instrument(skip(db))]
pub async fn get_post_category_subscribers(
    db: &Pool<Postgres>,
    category_id: Uuid,
) -> anyhow::Result<Vec<Uuid>> {
    sqlx::query_scalar(
        r#"
        SELECT "userId"
        FROM "PostCategorySubscription"
        WHERE "categoryId" = $1
        "#,
    )
    .bind(category_id)
    .fetch_all(db)
    .await
    .context("unable to load post category subscribers")
}

#[derive(sqlx::FromRow)]
struct ProposalRow {
    page_deleted: bool,
    evaluation_id: Option<Uuid>,
    evaluation_private: Option<bool>,
}

/// A proposal with its authors, page state, current evaluation and linked
/// rewards.
#[tracing::instrument(skip(db))]
pub async fn get_proposal(
    db: &Pool<Postgres>,
    id: Uuid,
) -> anyhow::Result<Option<ProposalDetails>> {
    let row: Option<ProposalRow> = sqlx::query_as(
        r#"
        SELECT
            page."deletedAt" IS NOT NULL AS page_deleted,
            evaluation."id" AS evaluation_id,
            evaluation."private" AS evaluation_private
        FROM "Proposal" proposal
        JOIN "Page" page ON page."proposalId" = proposal."id"
        LEFT JOIN "ProposalEvaluation" evaluation
            ON evaluation."id" = proposal."currentEvaluationId"
        WHERE proposal."id" = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("unable to load proposal")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let author_ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT "userId"
        FROM "ProposalAuthor"
        WHERE "proposalId" = $1
        "#,
    )
    .bind(id)
    .fetch_all(db)
    .await
    .context("unable to load proposal authors")?;

    let reward_ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT "id"
        FROM "Bounty"
        WHERE "proposalId" = $1
        "#,
    )
    .bind(id)
    .fetch_all(db)
    .await
    .context("unable to load proposal rewards")?;

    let current_evaluation = row
        .evaluation_id
        .map(|id| EvaluationDetails { id, private: row.evaluation_private.unwrap_or(false) });

    Ok(Some(ProposalDetails {
        author_ids,
        page_deleted: row.page_deleted,
        current_evaluation,
        reward_ids,
    }))
}

/// Users configured as reviewers of a reward.
#[tracing::instrument(skip(db))]
pub async fn get_bounty_reviewers(
    db: &Pool<Postgres>,
    bounty_id: Uuid,
) -> anyhow::Result<Vec<Uuid>> {
    sqlx::query_scalar(
        r#"
        SELECT "userId"
        FROM "BountyReviewer"
        WHERE "bountyId" = $1
        "#,
    )
    .bind(bounty_id)
    .fetch_all(db)
    .await
    .context("unable to load bounty reviewers")
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    created_by: Uuid,
    status: String,
    page_id: Option<Uuid>,
    post_category_id: Option<Uuid>,
}

/// A poll with its lifecycle status and hosting surface.
#[tracing::instrument(skip(db))]
pub async fn get_vote(db: &Pool<Postgres>, id: Uuid) -> anyhow::Result<Option<VoteDetails>> {
    let row: Option<VoteRow> = sqlx::query_as(
        r#"
        SELECT
            vote."createdBy" AS created_by,
            vote."status" AS status,
            vote."pageId" AS page_id,
            post."categoryId" AS post_category_id
        FROM "Vote" vote
        LEFT JOIN "Post" post ON post."id" = vote."postId"
        WHERE vote."id" = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("unable to load vote")?;

    let Some(row) = row else {
        return Ok(None);
    };
    let status = row
        .status
        .parse::<VoteStatus>()
        .with_context(|| format!("unknown vote status {:?}", row.status))?;

    Ok(Some(VoteDetails {
        created_by: row.created_by,
        status,
        page_id: row.page_id,
        post_category_id: row.post_category_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_status_parses_its_stored_form() {
        assert_eq!("in_progress".parse::<VoteStatus>().ok(), Some(VoteStatus::InProgress));
        assert_eq!("passed".parse::<VoteStatus>().ok(), Some(VoteStatus::Passed));
        assert!("tallying".parse::<VoteStatus>().is_err());
    }

    #[test]
    fn comment_parent_requires_both_columns() {
        let id = Uuid::now_v7();
        let author_id = Uuid::now_v7();

        let complete = Some(id).zip(Some(author_id));
        assert_eq!(complete, Some((id, author_id)));

        let orphaned: Option<(Uuid, Uuid)> = Some(id).zip(None);
        assert_eq!(orphaned, None);
    }
}
