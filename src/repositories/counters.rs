//! Synchronization of the denormalized counters on posts and comments.
//!
//! Every function here is a single conditional UPDATE executed on a
//! caller-supplied transaction: the delta (or the recomputed set size) is
//! applied by the database itself, so two concurrent mutations can never
//! lose each other's increment. Callers compose these legs with the record
//! mutation they belong to; the whole transaction commits or nothing does.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::DbResultSingle;

/// Shift a post's total comment count by `delta` (any depth; creation passes
/// +1, a cascade delete passes the negated subtree size)
pub async fn increment_comments_count<'a>(
    post_id: &Uuid,
    delta: i64,
    transaction_handle: &mut Transaction<'a, Postgres>,
) -> DbResultSingle<()> {
    sqlx::query!(
        r#"
        UPDATE "Post" SET comments_count = comments_count + $2 WHERE id = $1
        "#,
        post_id,
        delta,
    )
    .execute(transaction_handle.as_mut())
    .await?;

    Ok(())
}

/// Shift a comment's direct-children count by `delta`. Only the direct
/// parent link is counted, never the whole subtree.
pub async fn increment_replies_count<'a>(
    comment_id: &Uuid,
    delta: i64,
    transaction_handle: &mut Transaction<'a, Postgres>,
) -> DbResultSingle<()> {
    sqlx::query!(
        r#"
        UPDATE "Comment" SET replies_count = replies_count + $2 WHERE id = $1
        "#,
        comment_id,
        delta,
    )
    .execute(transaction_handle.as_mut())
    .await?;

    Ok(())
}

/// Rewrite a comment's like counter from the authoritative like set and
/// return the written value. Runs after the membership flip in the same
/// transaction, so the counter can never drift from the set.
pub async fn sync_comment_likes_count<'a>(
    comment_id: &Uuid,
    transaction_handle: &mut Transaction<'a, Postgres>,
) -> DbResultSingle<i64> {
    let row = sqlx::query!(
        r#"
        UPDATE "Comment"
        SET likes_count = (SELECT count(*) FROM "CommentLike" WHERE comment_id = $1)
        WHERE id = $1
        RETURNING likes_count
        "#,
        comment_id,
    )
    .fetch_one(transaction_handle.as_mut())
    .await?;

    Ok(row.likes_count)
}

/// Rewrite a post's like counter from the authoritative like set and return
/// the written value
pub async fn sync_post_likes_count<'a>(
    post_id: &Uuid,
    transaction_handle: &mut Transaction<'a, Postgres>,
) -> DbResultSingle<i64> {
    let row = sqlx::query!(
        r#"
        UPDATE "Post"
        SET likes_count = (SELECT count(*) FROM "PostLike" WHERE post_id = $1)
        WHERE id = $1
        RETURNING likes_count
        "#,
        post_id,
    )
    .fetch_one(transaction_handle.as_mut())
    .await?;

    Ok(row.likes_count)
}
