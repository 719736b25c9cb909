use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lifecycle state of a post. Transitions are owned by the external post
/// lifecycle layer; the engine only checks the state.
#[derive(sqlx::Type, Debug, PartialEq, Eq, Clone, Copy)]
#[sqlx(type_name = "post_status", rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

/// Post structure which is serialized from the database. The engine mutates
/// only the denormalized counters (views, likes_count, comments_count);
/// every other field belongs to the post lifecycle layer.
#[derive(sqlx::FromRow, Debug, PartialEq, Eq, Clone)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub views: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub edited_at: DateTime<Utc>,
}

impl Post {
    /// A post accepts comments and likes once published (with a publication
    /// timestamp not in the future) and not soft-deleted
    #[must_use]
    pub fn is_commentable(&self) -> bool {
        !self.is_deleted
            && self.status == PostStatus::Published
            && self.published_at.is_none_or(|at| at <= Utc::now())
    }
}

/// Structure passed to the repository to retrieve a post by its id
#[derive(Debug, Clone)]
pub struct PostGetById {
    pub id: Uuid,
}

impl PostGetById {
    #[must_use]
    #[inline]
    pub const fn new(id: &Uuid) -> Self {
        Self { id: *id }
    }
}

/// Structure passed to the repository for flipping a user's like on a post
#[derive(Debug, Clone)]
pub struct PostLikeToggle {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

impl PostLikeToggle {
    #[must_use]
    #[inline]
    pub const fn new(post_id: &Uuid, user_id: &Uuid) -> Self {
        Self {
            post_id: *post_id,
            user_id: *user_id,
        }
    }
}
