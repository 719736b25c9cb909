use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

use crate::common::query_parameters::{DbOrder, Pagination};

/// Maximum nesting depth of a reply; root comments sit at depth 0
pub const MAX_COMMENT_DEPTH: i32 = 3;

/// Number of unique reports at which a comment is hidden automatically
pub const REPORT_AUTO_HIDE_THRESHOLD: i64 = 3;

/// Default page size for comment listings
pub const DEFAULT_COMMENT_PAGE_SIZE: i64 = 20;

/// Why a comment is hidden. The flag itself is a single boolean; the cause
/// keeps the three ways of setting it distinguishable without parsing the
/// free-text reason.
#[derive(sqlx::Type, Debug, PartialEq, Eq, Clone, Copy)]
#[sqlx(type_name = "hidden_cause", rename_all = "snake_case")]
pub enum HiddenCause {
    /// Removed through the user-facing delete path (author, post author, admin)
    UserDeleted,
    /// Hidden automatically after reaching the report threshold, no human actor
    ReportThreshold,
    /// Hidden explicitly by a moderator
    Moderator,
}

/// Comment structure which is serialized from the database, containing the
/// full record including the hidden-side fields (admin projection).
///
/// `likes_count`, `replies_count` and `report_count` are denormalized from
/// the "CommentLike"/"CommentReport" tables and the children set; every
/// mutating operation keeps them synchronized transactionally.
#[derive(sqlx::FromRow, Debug, PartialEq, Eq, Clone)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub depth: i32,
    pub content: String,
    pub likes_count: i64,
    pub replies_count: i64,
    pub report_count: i64,
    pub is_hidden: bool,
    pub hidden_by: Option<Uuid>,
    pub hidden_reason: Option<String>,
    pub hidden_cause: Option<HiddenCause>,
    pub hidden_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub edited_at: DateTime<Utc>,
}

/// Comment structure for anyone other than moderation tooling: hidden-side
/// details (who hid it and why) are stripped off
#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct CommentAnonymized {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub depth: i32,
    pub content: String,
    pub likes_count: i64,
    pub replies_count: i64,
    pub is_hidden: bool,
    pub report_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentAnonymized {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
            depth: comment.depth,
            content: comment.content,
            likes_count: comment.likes_count,
            replies_count: comment.replies_count,
            is_hidden: comment.is_hidden,
            report_count: comment.report_count,
            created_at: comment.created_at,
        }
    }
}

/// Structure passed to the repository for comment creation
#[derive(Debug, Clone)]
pub struct CommentCreate {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
}

impl CommentCreate {
    #[must_use]
    pub fn new(post_id: &Uuid, author_id: &Uuid, content: &str, parent_id: Option<&Uuid>) -> Self {
        Self {
            post_id: *post_id,
            author_id: *author_id,
            content: content.to_owned(),
            parent_id: parent_id.copied(),
        }
    }
}

/// Structure passed to the repository to retrieve a comment by its id
#[derive(Debug, Clone)]
pub struct CommentGetById {
    pub id: Uuid,
}

impl CommentGetById {
    #[must_use]
    #[inline]
    pub const fn new(id: &Uuid) -> Self {
        Self { id: *id }
    }
}

/// Structure passed to the repository for updating a comment; content is the
/// only mutable field
#[derive(Debug, Clone)]
pub struct CommentUpdate {
    pub id: Uuid,
    pub editor_id: Uuid,
    pub content: String,
}

impl CommentUpdate {
    #[must_use]
    pub fn new(id: &Uuid, editor_id: &Uuid, content: &str) -> Self {
        Self {
            id: *id,
            editor_id: *editor_id,
            content: content.to_owned(),
        }
    }
}

/// Structure passed to the repository for the administrative purge of a
/// comment subtree. The user-facing delete path is `CommentSoftDelete`.
#[derive(Debug, Clone)]
pub struct CommentHardDelete {
    pub id: Uuid,
    pub admin_id: Uuid,
}

impl CommentHardDelete {
    #[must_use]
    #[inline]
    pub const fn new(id: &Uuid, admin_id: &Uuid) -> Self {
        Self {
            id: *id,
            admin_id: *admin_id,
        }
    }
}

/// Structure passed to the repository for flipping a user's like on a comment
#[derive(Debug, Clone)]
pub struct CommentLikeToggle {
    pub comment_id: Uuid,
    pub user_id: Uuid,
}

impl CommentLikeToggle {
    #[must_use]
    #[inline]
    pub const fn new(comment_id: &Uuid, user_id: &Uuid) -> Self {
        Self {
            comment_id: *comment_id,
            user_id: *user_id,
        }
    }
}

/// Membership state of the caller in the like set after a toggle, along with
/// the counter value written in the same transaction
#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Serialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub likes_count: i64,
}

/// Structure passed to the moderation repository for reporting a comment
#[derive(Debug, Clone)]
pub struct CommentReport {
    pub comment_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: String,
}

impl CommentReport {
    #[must_use]
    pub fn new(comment_id: &Uuid, reporter_id: &Uuid, reason: &str) -> Self {
        Self {
            comment_id: *comment_id,
            reporter_id: *reporter_id,
            reason: reason.to_owned(),
        }
    }
}

/// Report bookkeeping state returned to the reporter
#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Serialize)]
pub struct ReportOutcome {
    pub report_count: i64,
    pub is_hidden: bool,
}

/// Recognized moderation actions. The wire-level action arrives as text and
/// is parsed; anything else is rejected as an invalid action.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ModerationAction {
    Hide,
    Unhide,
    ClearReports,
}

impl FromStr for ModerationAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hide" => Ok(Self::Hide),
            "unhide" => Ok(Self::Unhide),
            "clear_reports" => Ok(Self::ClearReports),
            _ => Err(()),
        }
    }
}

/// Structure passed to the moderation repository for an explicit moderator
/// action on a comment
#[derive(Debug, Clone)]
pub struct CommentModerate {
    pub comment_id: Uuid,
    pub moderator_id: Uuid,
    pub action: String,
    pub reason: Option<String>,
}

impl CommentModerate {
    #[must_use]
    pub fn new(comment_id: &Uuid, moderator_id: &Uuid, action: &str, reason: Option<&str>) -> Self {
        Self {
            comment_id: *comment_id,
            moderator_id: *moderator_id,
            action: action.to_owned(),
            reason: reason.map(ToOwned::to_owned),
        }
    }
}

/// Structure passed to the moderation repository for the user-facing delete
/// path (soft hide; the record and its children stay)
#[derive(Debug, Clone)]
pub struct CommentSoftDelete {
    pub comment_id: Uuid,
    pub actor_id: Uuid,
}

impl CommentSoftDelete {
    #[must_use]
    #[inline]
    pub const fn new(comment_id: &Uuid, actor_id: &Uuid) -> Self {
        Self {
            comment_id: *comment_id,
            actor_id: *actor_id,
        }
    }
}

/// Structure passed to the repository for fetching a post's comment thread
#[derive(Debug, Clone)]
pub struct ThreadFetch {
    pub post_id: Uuid,
    /// Depth bound of the assembled forest; clamped to `MAX_COMMENT_DEPTH`
    pub max_depth: Option<i32>,
    /// 1-based page over the root comments
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// `Desc` (newest first, the default) or `Asc` at every level
    pub order: Option<DbOrder>,
}

impl ThreadFetch {
    #[must_use]
    pub const fn new(
        post_id: &Uuid,
        max_depth: Option<i32>,
        page: Option<i64>,
        page_size: Option<i64>,
        order: Option<DbOrder>,
    ) -> Self {
        Self {
            post_id: *post_id,
            max_depth,
            page,
            page_size,
            order,
        }
    }
}

/// One comment with its eagerly attached replies. Replies below the depth
/// bound are not attached; `comment.replies_count` still carries the size of
/// the collapsed branch.
#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct ThreadNode {
    pub comment: CommentAnonymized,
    pub replies: Vec<ThreadNode>,
}

/// One page of a post's comment forest
#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct CommentThread {
    pub comments: Vec<ThreadNode>,
    pub pagination: Pagination,
}

/// Structure passed to the repository for listing a user's comments
#[derive(Debug, Clone)]
pub struct CommentsByAuthor {
    pub author_id: Uuid,
    /// Include hidden comments (moderation/admin listings)
    pub include_hidden: bool,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl CommentsByAuthor {
    #[must_use]
    pub const fn new(
        author_id: &Uuid,
        include_hidden: bool,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Self {
        Self {
            author_id: *author_id,
            include_hidden,
            page,
            page_size,
        }
    }
}

/// One page of a user's comments
#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct CommentPage {
    pub comments: Vec<CommentAnonymized>,
    pub pagination: Pagination,
}
