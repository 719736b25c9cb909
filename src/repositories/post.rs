use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::common::error::DbResultSingle;
use crate::common::{DbPoolHandler, DbReadOne, DbRepository, PoolHandler};
use crate::error::{BusinessLogicError, BusinessLogicErrorKind, DbError};
use crate::models::{Post, PostGetById, PostStatus};

/// Access to posts as the comment engine sees them: lookups, the commentable
/// gate, and the atomic view counter. Post lifecycle (creation, publishing,
/// archival, soft deletion) is owned by the layer above; the engine mutates
/// nothing here except the denormalized counters.
pub struct PostRepository {
    pub(crate) pool_handler: PoolHandler,
}

impl PostRepository {
    /// Function which retrieves a single post by its id, usable within a transaction
    ///
    /// # Params
    /// - `params`: structure containing the id of the post
    /// - `transaction_handle` mutable reference to an ongoing transaction
    ///
    /// # Returns
    /// - `Ok(post)`: on successful connection and retrieval
    /// - `Err(_)`: otherwise
    pub(crate) async fn get_post<'a>(
        params: PostGetById,
        transaction_handle: &mut Transaction<'a, Postgres>,
    ) -> DbResultSingle<Option<Post>> {
        let post = sqlx::query_as!(
            Post,
            r#"
            SELECT id, author_id, title, content, status AS "status: PostStatus",
                   published_at, is_deleted, views, likes_count, comments_count,
                   created_at, edited_at
            FROM "Post" WHERE id = $1
            "#,
            params.id
        )
        .fetch_optional(transaction_handle.as_mut())
        .await?;
        Ok(post)
    }

    /// Function which checks if the post is correct (existing and not deleted)
    ///
    /// # Params
    /// - `post`: optional post retrieved from the database
    ///
    /// # Returns
    /// - `Ok(post)`: when the post exists and is not deleted
    /// - `Err(DbError)`: with appropriate error description otherwise
    pub(crate) fn is_post_correct(post: Option<Post>) -> DbResultSingle<Post> {
        match post {
            Some(p) => {
                if p.is_deleted {
                    Err(DbError::from(BusinessLogicError::new(
                        BusinessLogicErrorKind::PostDeleted,
                    )))
                } else {
                    Ok(p)
                }
            }
            None => Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::PostDoesNotExist,
            ))),
        }
    }

    /// Function which checks that the post accepts comments and likes:
    /// existing, not deleted, published, and not scheduled for the future
    ///
    /// # Params
    /// - `post`: optional post retrieved from the database
    ///
    /// # Returns
    /// - `Ok(post)`: when the post is published and not deleted
    /// - `Err(DbError)`: with appropriate error description otherwise
    pub(crate) fn is_post_commentable(post: Option<Post>) -> DbResultSingle<Post> {
        let post = Self::is_post_correct(post)?;
        if post.is_commentable() {
            Ok(post)
        } else {
            Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::PostNotPublished,
            )))
        }
    }

    /// Bump the view counter of a post by one. A single conditional UPDATE,
    /// so concurrent views cannot lose each other's increment.
    pub async fn increment_views(&mut self, params: &PostGetById) -> DbResultSingle<i64> {
        let row = sqlx::query!(
            r#"
            UPDATE "Post" SET views = views + 1
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING views
            "#,
            params.id,
        )
        .fetch_optional(self.pool_handler.pool.as_ref())
        .await?;

        match row {
            Some(row) => Ok(row.views),
            None => Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::PostDoesNotExist,
            ))),
        }
    }
}

#[async_trait]
impl DbRepository for PostRepository {
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
impl DbReadOne<PostGetById, Post> for PostRepository {
    /// Read a single post, rejecting soft-deleted ones
    async fn read_one(&mut self, params: &PostGetById) -> DbResultSingle<Post> {
        let post = sqlx::query_as!(
            Post,
            r#"
            SELECT id, author_id, title, content, status AS "status: PostStatus",
                   published_at, is_deleted, views, likes_count, comments_count,
                   created_at, edited_at
            FROM "Post" WHERE id = $1
            "#,
            params.id
        )
        .fetch_optional(self.pool_handler.pool.as_ref())
        .await?;

        Self::is_post_correct(post)
    }
}
