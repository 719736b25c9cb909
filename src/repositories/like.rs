//! Like toggling for comments and posts.
//!
//! A toggle is an atomic test-and-flip on the like set: the conditional
//! INSERT tells us in the same statement whether the membership already
//! existed, and the counter is rewritten from the set before the transaction
//! commits. Two users toggling concurrently both land; the same user
//! double-toggling ends up with whichever flip committed last, with the
//! stored count equal to the stored set either way.

use async_trait::async_trait;

use crate::common::DbToggleLike;
use crate::common::error::DbResultSingle;
use crate::models::{
    CommentGetById, CommentLikeToggle, LikeStatus, PostGetById, PostLikeToggle, UserGetById,
};
use crate::repositories::{CommentRepository, PostRepository, UserRepository, counters};

#[async_trait]
impl DbToggleLike<CommentLikeToggle, LikeStatus> for CommentRepository {
    /// Flip the caller's like on a visible comment
    async fn toggle_like(&mut self, params: &CommentLikeToggle) -> DbResultSingle<LikeStatus> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let user = UserRepository::get_user(UserGetById::new(&params.user_id), &mut tx).await?;
        UserRepository::user_is_correct(user)?;

        let comment =
            Self::get_comment(CommentGetById::new(&params.comment_id), &mut tx).await?;
        Self::is_comment_visible(comment)?;

        let inserted = sqlx::query!(
            r#"
            INSERT INTO "CommentLike" (comment_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
            params.comment_id,
            params.user_id,
        )
        .execute(&mut *tx)
        .await?;

        let liked = inserted.rows_affected() > 0;
        if !liked {
            sqlx::query!(
                r#"
                DELETE FROM "CommentLike" WHERE comment_id = $1 AND user_id = $2
                "#,
                params.comment_id,
                params.user_id,
            )
            .execute(&mut *tx)
            .await?;
        }

        let likes_count = counters::sync_comment_likes_count(&params.comment_id, &mut tx).await?;

        tx.commit().await?;

        Ok(LikeStatus { liked, likes_count })
    }
}

#[async_trait]
impl DbToggleLike<PostLikeToggle, LikeStatus> for PostRepository {
    /// Flip the caller's like on a published post
    async fn toggle_like(&mut self, params: &PostLikeToggle) -> DbResultSingle<LikeStatus> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let user = UserRepository::get_user(UserGetById::new(&params.user_id), &mut tx).await?;
        UserRepository::user_is_correct(user)?;

        let post = Self::get_post(PostGetById::new(&params.post_id), &mut tx).await?;
        Self::is_post_commentable(post)?;

        let inserted = sqlx::query!(
            r#"
            INSERT INTO "PostLike" (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
            params.post_id,
            params.user_id,
        )
        .execute(&mut *tx)
        .await?;

        let liked = inserted.rows_affected() > 0;
        if !liked {
            sqlx::query!(
                r#"
                DELETE FROM "PostLike" WHERE post_id = $1 AND user_id = $2
                "#,
                params.post_id,
                params.user_id,
            )
            .execute(&mut *tx)
            .await?;
        }

        let likes_count = counters::sync_post_likes_count(&params.post_id, &mut tx).await?;

        tx.commit().await?;

        Ok(LikeStatus { liked, likes_count })
    }
}
