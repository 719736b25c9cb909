use async_trait::async_trait;

use crate::common::error::DbResultSingle;
use crate::common::{DbPoolHandler, DbReadOne, DbRepository, PoolHandler};
use crate::error::{BusinessLogicError, BusinessLogicErrorKind, DbError};
use crate::models::{
    Comment, CommentGetById, CommentModerate, CommentReport, CommentSoftDelete, HiddenCause,
    ModerationAction, PostGetById, REPORT_AUTO_HIDE_THRESHOLD, ReportOutcome, UserGetById,
};
use crate::repositories::{CommentRepository, PostRepository, UserRepository};

/// Report bookkeeping and hide/unhide state of comments.
///
/// A comment is hidden one of three ways: automatically once its unique
/// report count reaches the threshold, explicitly by a moderator, or through
/// the user-facing delete path. All three set the same flag; the cause tag
/// keeps them apart.
pub struct ModerationRepository {
    pool_handler: PoolHandler,
}

#[async_trait]
impl DbRepository for ModerationRepository {
    #[inline]
    fn new(pool_handler: PoolHandler) -> Self {
        Self { pool_handler }
    }

    #[inline]
    async fn disconnect(&mut self) -> () {
        self.pool_handler.disconnect().await;
    }
}

#[async_trait]
impl DbReadOne<CommentGetById, Comment> for ModerationRepository {
    /// The moderation-side view of a comment: resolved whether hidden or
    /// not, including who hid it and why
    async fn read_one(&mut self, params: &CommentGetById) -> DbResultSingle<Comment> {
        let comment = sqlx::query_as!(
            Comment,
            r#"
            SELECT id, post_id, author_id, parent_id, depth, content,
                   likes_count, replies_count, report_count,
                   is_hidden, hidden_by, hidden_reason,
                   hidden_cause AS "hidden_cause: HiddenCause",
                   hidden_at, created_at, edited_at
            FROM "Comment" WHERE id = $1
            "#,
            params.id
        )
        .fetch_optional(self.pool_handler.pool.as_ref())
        .await?;

        CommentRepository::is_comment_correct(comment)
    }
}

impl ModerationRepository {
    /// Report a comment.
    ///
    /// A reporter appears in a comment's report list at most once: repeating
    /// the call is a no-op answering the current state, not an error. A fresh
    /// report bumps the counter and, when the new count reaches the
    /// threshold on a comment that is still visible, hides it in the same
    /// conditional UPDATE with no human actor recorded. Reports past the
    /// threshold (or against an already hidden comment) still append without
    /// touching the hidden state again.
    pub async fn report(&mut self, params: &CommentReport) -> DbResultSingle<ReportOutcome> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let reporter =
            UserRepository::get_user(UserGetById::new(&params.reporter_id), &mut tx).await?;
        UserRepository::user_is_correct(reporter)?;

        let comment =
            CommentRepository::get_comment(CommentGetById::new(&params.comment_id), &mut tx)
                .await?;
        let comment = CommentRepository::is_comment_correct(comment)?;

        let inserted = sqlx::query!(
            r#"
            INSERT INTO "CommentReport" (comment_id, reporter_id, reason)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
            params.comment_id,
            params.reporter_id,
            params.reason,
        )
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.commit().await?;
            return Ok(ReportOutcome {
                report_count: comment.report_count,
                is_hidden: comment.is_hidden,
            });
        }

        // The CASE legs read the pre-update row, so the threshold test uses
        // the count this report produces and an already hidden comment keeps
        // its cause, reason, and actor.
        let row = sqlx::query!(
            r#"
            UPDATE "Comment"
            SET report_count = report_count + 1,
                is_hidden = CASE WHEN report_count + 1 >= $2 THEN TRUE
                                 ELSE is_hidden END,
                hidden_cause = CASE WHEN report_count + 1 >= $2 AND NOT is_hidden
                                    THEN 'report_threshold'::hidden_cause
                                    ELSE hidden_cause END,
                hidden_reason = CASE WHEN report_count + 1 >= $2 AND NOT is_hidden
                                     THEN 'Multiple reports'
                                     ELSE hidden_reason END,
                hidden_at = CASE WHEN report_count + 1 >= $2 AND NOT is_hidden
                                 THEN now()
                                 ELSE hidden_at END
            WHERE id = $1
            RETURNING report_count, is_hidden
            "#,
            params.comment_id,
            REPORT_AUTO_HIDE_THRESHOLD,
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if row.is_hidden && !comment.is_hidden {
            log::warn!(
                "comment.auto_hide id={} reports={}",
                params.comment_id,
                row.report_count
            );
        }

        Ok(ReportOutcome {
            report_count: row.report_count,
            is_hidden: row.is_hidden,
        })
    }

    /// Apply an explicit moderation action to a comment.
    ///
    /// The caller must hold the moderator or admin role. The action arrives
    /// as text; anything other than `hide`, `unhide` or `clear_reports` is
    /// rejected. Clearing reports empties the report list and counter but
    /// leaves the hidden state alone.
    pub async fn moderate(&mut self, params: &CommentModerate) -> DbResultSingle<Comment> {
        let action: ModerationAction = params.action.parse().map_err(|()| {
            DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::InvalidModerationAction,
            ))
        })?;

        let mut tx = self.pool_handler.pool.begin().await?;

        let moderator =
            UserRepository::get_user(UserGetById::new(&params.moderator_id), &mut tx).await?;
        let moderator = UserRepository::user_is_correct(moderator)?;
        if !moderator.can_moderate() {
            return Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::ModeratorRequired,
            )));
        }

        let comment =
            CommentRepository::get_comment(CommentGetById::new(&params.comment_id), &mut tx)
                .await?;
        CommentRepository::is_comment_correct(comment)?;

        let moderated = match action {
            ModerationAction::Hide => {
                sqlx::query_as!(
                    Comment,
                    r#"
                    UPDATE "Comment"
                    SET is_hidden = TRUE,
                        hidden_by = $2,
                        hidden_reason = $3,
                        hidden_cause = 'moderator'::hidden_cause,
                        hidden_at = now()
                    WHERE id = $1
                    RETURNING id, post_id, author_id, parent_id, depth, content,
                              likes_count, replies_count, report_count,
                              is_hidden, hidden_by, hidden_reason,
                              hidden_cause AS "hidden_cause: HiddenCause",
                              hidden_at, created_at, edited_at
                    "#,
                    params.comment_id,
                    params.moderator_id,
                    params.reason,
                )
                .fetch_one(&mut *tx)
                .await?
            }
            ModerationAction::Unhide => {
                sqlx::query_as!(
                    Comment,
                    r#"
                    UPDATE "Comment"
                    SET is_hidden = FALSE,
                        hidden_by = NULL,
                        hidden_reason = NULL,
                        hidden_cause = NULL,
                        hidden_at = NULL
                    WHERE id = $1
                    RETURNING id, post_id, author_id, parent_id, depth, content,
                              likes_count, replies_count, report_count,
                              is_hidden, hidden_by, hidden_reason,
                              hidden_cause AS "hidden_cause: HiddenCause",
                              hidden_at, created_at, edited_at
                    "#,
                    params.comment_id,
                )
                .fetch_one(&mut *tx)
                .await?
            }
            ModerationAction::ClearReports => {
                sqlx::query!(
                    r#"
                    DELETE FROM "CommentReport" WHERE comment_id = $1
                    "#,
                    params.comment_id,
                )
                .execute(&mut *tx)
                .await?;

                sqlx::query_as!(
                    Comment,
                    r#"
                    UPDATE "Comment"
                    SET report_count = 0
                    WHERE id = $1
                    RETURNING id, post_id, author_id, parent_id, depth, content,
                              likes_count, replies_count, report_count,
                              is_hidden, hidden_by, hidden_reason,
                              hidden_cause AS "hidden_cause: HiddenCause",
                              hidden_at, created_at, edited_at
                    "#,
                    params.comment_id,
                )
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        log::info!(
            "comment.moderate id={} action={} by={}",
            params.comment_id,
            params.action,
            params.moderator_id
        );

        Ok(moderated)
    }

    /// The user-facing delete: hide the comment, keep the record and its
    /// children. Allowed to the comment author, the post's author, and
    /// admins. Children stay visible and are surfaced by the thread fetch
    /// even though their parent no longer is.
    pub async fn soft_delete(&mut self, params: &CommentSoftDelete) -> DbResultSingle<Comment> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let comment =
            CommentRepository::get_comment(CommentGetById::new(&params.comment_id), &mut tx)
                .await?;
        let comment = CommentRepository::is_comment_correct(comment)?;

        let actor = UserRepository::get_user(UserGetById::new(&params.actor_id), &mut tx).await?;
        let actor = UserRepository::user_is_correct(actor)?;

        let mut allowed = actor.id == comment.author_id || actor.is_admin();
        if !allowed {
            let post = PostRepository::get_post(PostGetById::new(&comment.post_id), &mut tx)
                .await?;
            allowed = post.is_some_and(|post| post.author_id == actor.id);
        }
        if !allowed {
            return Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::CommentDeleteForbidden,
            )));
        }

        let deleted = sqlx::query_as!(
            Comment,
            r#"
            UPDATE "Comment"
            SET is_hidden = TRUE,
                hidden_by = $2,
                hidden_reason = 'Deleted by user',
                hidden_cause = 'user_deleted'::hidden_cause,
                hidden_at = now()
            WHERE id = $1
            RETURNING id, post_id, author_id, parent_id, depth, content,
                      likes_count, replies_count, report_count,
                      is_hidden, hidden_by, hidden_reason,
                      hidden_cause AS "hidden_cause: HiddenCause",
                      hidden_at, created_at, edited_at
            "#,
            params.comment_id,
            params.actor_id,
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(deleted)
    }
}
