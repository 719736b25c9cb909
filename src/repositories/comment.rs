use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::{DbResultMultiple, DbResultSingle};
use crate::common::query_parameters::{DbOrder, Pagination};
use crate::common::{DbCreate, DbDelete, DbPoolHandler, DbReadOne, DbRepository, DbUpdate, PoolHandler};
use crate::error::{BusinessLogicError, BusinessLogicErrorKind, DbError};
use crate::models::{
    Comment, CommentAnonymized, CommentCreate, CommentGetById, CommentHardDelete, CommentPage,
    CommentThread, CommentUpdate, CommentsByAuthor, DEFAULT_COMMENT_PAGE_SIZE, HiddenCause,
    MAX_COMMENT_DEPTH, Post, PostGetById, PostStatus, ThreadFetch, ThreadNode, UserGetById,
};
use crate::repositories::{PostRepository, UserRepository, counters};

pub struct CommentRepository {
    pub(crate) pool_handler: PoolHandler,
}

impl CommentRepository {
    /// Function which retrieves a single comment by its id, usable within a transaction
    ///
    /// # Params
    /// - `params`: structure containing the id of the comment
    /// - `transaction_handle` mutable reference to an ongoing transaction
    ///
    /// # Returns
    /// - `Ok(comment)`: on successful connection and retrieval
    /// - `Err(_)`: otherwise
    pub(crate) async fn get_comment<'a>(
        params: CommentGetById,
        transaction_handle: &mut Transaction<'a, Postgres>,
    ) -> DbResultSingle<Option<Comment>> {
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
        .fetch_optional(transaction_handle.as_mut())
        .await?;
        Ok(comment)
    }

    /// Function which checks that the comment exists (hard-deleted comments
    /// simply have no row anymore)
    pub(crate) fn is_comment_correct(comment: Option<Comment>) -> DbResultSingle<Comment> {
        match comment {
            Some(c) => Ok(c),
            None => Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::CommentDoesNotExist,
            ))),
        }
    }

    /// Function which checks that the comment exists and is visible; hidden
    /// comments resolve the same as missing ones for non-moderation callers
    pub(crate) fn is_comment_visible(comment: Option<Comment>) -> DbResultSingle<Comment> {
        let comment = Self::is_comment_correct(comment)?;
        if comment.is_hidden {
            return Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::CommentDoesNotExist,
            )));
        }
        Ok(comment)
    }

    fn sort_level(level: &mut [CommentAnonymized], order: DbOrder) {
        match order {
            DbOrder::Asc => level.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id))),
            DbOrder::Desc => level.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id))),
        }
    }

    fn into_node(
        comment: CommentAnonymized,
        children: &mut HashMap<Uuid, Vec<CommentAnonymized>>,
        max_depth: i32,
        order: DbOrder,
    ) -> ThreadNode {
        let mut replies = Vec::new();
        // Below the depth bound the branch is not attached; the node's own
        // replies_count still reports the size of the collapsed level.
        if comment.depth < max_depth
            && let Some(mut level) = children.remove(&comment.id)
        {
            Self::sort_level(&mut level, order);
            replies = level
                .into_iter()
                .map(|child| Self::into_node(child, children, max_depth, order))
                .collect();
        }
        ThreadNode { comment, replies }
    }

    /// Assemble the comment forest of one post from a single bulk read,
    /// indexed by parent id — no per-node queries.
    ///
    /// Top-level entries are the roots plus any visible comment whose parent
    /// is absent from the input (a hidden parent keeps its children visible,
    /// so they surface at the top rather than vanish with it). Every level is
    /// ordered by creation time according to `order`; replies deeper than
    /// `max_depth` are left unattached.
    #[must_use]
    pub fn build_forest(
        comments: Vec<Comment>,
        max_depth: i32,
        order: DbOrder,
    ) -> Vec<ThreadNode> {
        let present: HashSet<Uuid> = comments.iter().map(|comment| comment.id).collect();

        let mut top_level: Vec<CommentAnonymized> = Vec::new();
        let mut children: HashMap<Uuid, Vec<CommentAnonymized>> = HashMap::new();
        for comment in comments {
            let comment = CommentAnonymized::from(comment);
            match comment.parent_id {
                Some(parent_id) if present.contains(&parent_id) => {
                    children.entry(parent_id).or_default().push(comment);
                }
                _ => top_level.push(comment),
            }
        }

        Self::sort_level(&mut top_level, order);
        top_level
            .into_iter()
            .map(|root| Self::into_node(root, &mut children, max_depth, order))
            .collect()
    }
}

#[async_trait]
impl DbRepository for CommentRepository {
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
impl DbCreate<CommentCreate, Comment> for CommentRepository {
    /// Create a comment (or a reply) under a published post.
    ///
    /// The structural checks, the insert, and both counter legs run inside
    /// one transaction: either the comment exists with `Post.comments_count`
    /// (and the parent's `replies_count` for replies) already shifted, or
    /// nothing changed at all. The counters are shifted by the database
    /// itself, never read into memory first.
    async fn create(&mut self, data: &CommentCreate) -> DbResultSingle<Comment> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let post = PostRepository::get_post(PostGetById::new(&data.post_id), &mut tx).await?;
        PostRepository::is_post_commentable(post)?;

        let author = UserRepository::get_user(UserGetById::new(&data.author_id), &mut tx).await?;
        UserRepository::user_is_correct(author)?;

        let depth = match data.parent_id {
            None => 0,
            Some(parent_id) => {
                let parent = Self::get_comment(CommentGetById::new(&parent_id), &mut tx).await?;
                let parent = match parent {
                    Some(parent) if parent.post_id == data.post_id => parent,
                    _ => {
                        return Err(DbError::from(BusinessLogicError::new(
                            BusinessLogicErrorKind::ParentCommentDoesNotExist,
                        )));
                    }
                };
                if parent.is_hidden {
                    return Err(DbError::from(BusinessLogicError::new(
                        BusinessLogicErrorKind::ParentCommentHidden,
                    )));
                }
                if parent.depth + 1 > MAX_COMMENT_DEPTH {
                    return Err(DbError::from(BusinessLogicError::new(
                        BusinessLogicErrorKind::CommentDepthExceeded,
                    )));
                }
                parent.depth + 1
            }
        };

        let comment = sqlx::query_as!(
            Comment,
            r#"
            INSERT INTO "Comment" (post_id, author_id, parent_id, depth, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, author_id, parent_id, depth, content,
                      likes_count, replies_count, report_count,
                      is_hidden, hidden_by, hidden_reason,
                      hidden_cause AS "hidden_cause: HiddenCause",
                      hidden_at, created_at, edited_at
            "#,
            data.post_id,
            data.author_id,
            data.parent_id,
            depth,
            data.content,
        )
        .fetch_one(&mut *tx)
        .await?;

        counters::increment_comments_count(&data.post_id, 1, &mut tx).await?;
        if let Some(parent_id) = data.parent_id {
            counters::increment_replies_count(&parent_id, 1, &mut tx).await?;
        }

        tx.commit().await?;

        Ok(comment)
    }
}

#[async_trait]
impl DbReadOne<CommentGetById, Comment> for CommentRepository {
    /// Read a single comment; hidden comments resolve the same as missing ones
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

        Self::is_comment_visible(comment)
    }
}

#[async_trait]
impl DbUpdate<CommentUpdate, Comment> for CommentRepository {
    /// Update a comment's content (the only mutable field) if the editor is
    /// its author or an admin
    async fn update(&mut self, params: &CommentUpdate) -> DbResultMultiple<Comment> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let comment = Self::get_comment(CommentGetById::new(&params.id), &mut tx).await?;
        let comment = Self::is_comment_correct(comment)?;

        if comment.author_id != params.editor_id {
            let editor = UserRepository::get_user(UserGetById::new(&params.editor_id), &mut tx)
                .await?;
            let editor = UserRepository::user_is_correct(editor)?;
            if !editor.is_admin() {
                return Err(DbError::from(BusinessLogicError::new(
                    BusinessLogicErrorKind::CommentEditForbidden,
                )));
            }
        }

        let updated_comment = sqlx::query_as!(
            Comment,
            r#"
            UPDATE "Comment"
            SET content = $1, edited_at = now()
            WHERE id = $2
            RETURNING id, post_id, author_id, parent_id, depth, content,
                      likes_count, replies_count, report_count,
                      is_hidden, hidden_by, hidden_reason,
                      hidden_cause AS "hidden_cause: HiddenCause",
                      hidden_at, created_at, edited_at
            "#,
            params.content,
            params.id
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated_comment)
    }
}

#[async_trait]
impl DbDelete<CommentHardDelete, Comment> for CommentRepository {
    /// Administrative purge of a comment and its whole subtree.
    ///
    /// One transaction removes every descendant (found through the parent
    /// index), rolls the post's total back by the removed count, and rolls
    /// the direct parent's `replies_count` back by exactly one — the parent
    /// only ever counted the direct child link. Like and report rows die
    /// with their comments through the foreign keys. The user-facing delete
    /// path is `ModerationRepository::soft_delete`, which never comes here.
    async fn delete(&mut self, params: &CommentHardDelete) -> DbResultMultiple<Comment> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let admin = UserRepository::get_user(UserGetById::new(&params.admin_id), &mut tx).await?;
        let admin = UserRepository::user_is_correct(admin)?;
        if !admin.is_admin() {
            return Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::AdminRequired,
            )));
        }

        let comment = Self::get_comment(CommentGetById::new(&params.id), &mut tx).await?;
        let comment = Self::is_comment_correct(comment)?;

        let removed = sqlx::query_as!(
            Comment,
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM "Comment" WHERE id = $1
                UNION ALL
                SELECT c.id FROM "Comment" c INNER JOIN subtree s ON c.parent_id = s.id
            )
            DELETE FROM "Comment"
            WHERE id IN (SELECT id FROM subtree)
            RETURNING id, post_id, author_id, parent_id, depth, content,
                      likes_count, replies_count, report_count,
                      is_hidden, hidden_by, hidden_reason,
                      hidden_cause AS "hidden_cause: HiddenCause",
                      hidden_at, created_at, edited_at
            "#,
            params.id
        )
        .fetch_all(&mut *tx)
        .await?;

        counters::increment_comments_count(&comment.post_id, -(removed.len() as i64), &mut tx)
            .await?;
        if let Some(parent_id) = comment.parent_id {
            counters::increment_replies_count(&parent_id, -1, &mut tx).await?;
        }

        tx.commit().await?;

        log::info!(
            "comment.cascade_delete id={} post={} removed={}",
            params.id,
            comment.post_id,
            removed.len()
        );

        Ok(removed)
    }
}

/// trait for assembling a post's comment thread
#[async_trait]
pub trait CommentRepositoryFetchThread {
    /// Fetch one page of a post's comment forest: a single bulk read of the
    /// visible comments followed by in-memory assembly
    async fn fetch_thread(&mut self, params: &ThreadFetch) -> DbResultSingle<CommentThread>;
}

#[async_trait]
impl CommentRepositoryFetchThread for CommentRepository {
    async fn fetch_thread(&mut self, params: &ThreadFetch) -> DbResultSingle<CommentThread> {
        let post = sqlx::query_as!(
            Post,
            r#"
            SELECT id, author_id, title, content, status AS "status: PostStatus",
                   published_at, is_deleted, views, likes_count, comments_count,
                   created_at, edited_at
            FROM "Post" WHERE id = $1
            "#,
            params.post_id
        )
        .fetch_optional(self.pool_handler.pool.as_ref())
        .await?;
        PostRepository::is_post_correct(post)?;

        let comments = sqlx::query_as!(
            Comment,
            r#"
            SELECT id, post_id, author_id, parent_id, depth, content,
                   likes_count, replies_count, report_count,
                   is_hidden, hidden_by, hidden_reason,
                   hidden_cause AS "hidden_cause: HiddenCause",
                   hidden_at, created_at, edited_at
            FROM "Comment"
            WHERE post_id = $1 AND is_hidden = FALSE
            "#,
            params.post_id
        )
        .fetch_all(self.pool_handler.pool.as_ref())
        .await?;

        let max_depth = params
            .max_depth
            .unwrap_or(MAX_COMMENT_DEPTH)
            .clamp(0, MAX_COMMENT_DEPTH);
        let order = params.order.unwrap_or(DbOrder::Desc);

        let roots = Self::build_forest(comments, max_depth, order);

        let pagination = Pagination::new(
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(DEFAULT_COMMENT_PAGE_SIZE),
            roots.len() as i64,
        );
        let comments = roots
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.page_size as usize)
            .collect();

        Ok(CommentThread {
            comments,
            pagination,
        })
    }
}

/// trait for listing the comments written by one user
#[async_trait]
pub trait CommentRepositoryListByAuthor {
    /// List one page of a user's comments, newest first; hidden comments are
    /// included only when the caller asks for them (moderation listings)
    async fn list_by_author(&mut self, params: &CommentsByAuthor) -> DbResultSingle<CommentPage>;
}

#[async_trait]
impl CommentRepositoryListByAuthor for CommentRepository {
    async fn list_by_author(&mut self, params: &CommentsByAuthor) -> DbResultSingle<CommentPage> {
        let total = sqlx::query!(
            r#"
            SELECT count(*) AS "count!" FROM "Comment"
            WHERE author_id = $1 AND ($2 OR is_hidden = FALSE)
            "#,
            params.author_id,
            params.include_hidden,
        )
        .fetch_one(self.pool_handler.pool.as_ref())
        .await?;

        let pagination = Pagination::new(
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(DEFAULT_COMMENT_PAGE_SIZE),
            total.count,
        );

        let comments = sqlx::query_as!(
            Comment,
            r#"
            SELECT id, post_id, author_id, parent_id, depth, content,
                   likes_count, replies_count, report_count,
                   is_hidden, hidden_by, hidden_reason,
                   hidden_cause AS "hidden_cause: HiddenCause",
                   hidden_at, created_at, edited_at
            FROM "Comment"
            WHERE author_id = $1 AND ($2 OR is_hidden = FALSE)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            params.author_id,
            params.include_hidden,
            pagination.page_size,
            pagination.offset(),
        )
        .fetch_all(self.pool_handler.pool.as_ref())
        .await?;

        Ok(CommentPage {
            comments: comments.into_iter().map(Into::into).collect(),
            pagination,
        })
    }
}
