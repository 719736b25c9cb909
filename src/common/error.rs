use std::fmt::{Debug, Display, Formatter};

use thiserror::Error;

/// Broad category of a business logic error, usable by the API layer for
/// mapping responses without inspecting message strings.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorClass {
    NotFound,
    Forbidden,
    InvalidState,
    InvalidAction,
    Conflict,
}

/// All the possible business logic errors raised by the repositories
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BusinessLogicErrorKind {
    // User errors
    UserDoesNotExist,
    UserDeleted,
    // Post errors
    PostDoesNotExist,
    PostDeleted,
    PostNotPublished,
    // Comment errors
    CommentDoesNotExist,
    ParentCommentDoesNotExist,
    ParentCommentHidden,
    CommentDepthExceeded,
    CommentEditForbidden,
    CommentDeleteForbidden,
    // Moderation errors
    ModeratorRequired,
    AdminRequired,
    InvalidModerationAction,
    // Transactional contention, safe to retry for idempotent operations only
    RetryableConflict,
}

impl BusinessLogicErrorKind {
    /// Category of the error kind
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UserDoesNotExist
            | Self::UserDeleted
            | Self::PostDoesNotExist
            | Self::PostDeleted
            | Self::CommentDoesNotExist
            | Self::ParentCommentDoesNotExist => ErrorClass::NotFound,
            Self::CommentEditForbidden
            | Self::CommentDeleteForbidden
            | Self::ModeratorRequired
            | Self::AdminRequired => ErrorClass::Forbidden,
            Self::PostNotPublished | Self::ParentCommentHidden | Self::CommentDepthExceeded => {
                ErrorClass::InvalidState
            }
            Self::InvalidModerationAction => ErrorClass::InvalidAction,
            Self::RetryableConflict => ErrorClass::Conflict,
        }
    }
}

impl Display for BusinessLogicErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::UserDoesNotExist => "The specified user does not exist!",
            Self::UserDeleted => "The specified user has been deleted!",
            Self::PostDoesNotExist => "The specified post does not exist!",
            Self::PostDeleted => "The specified post has been deleted!",
            Self::PostNotPublished => "The specified post is not published yet!",
            Self::CommentDoesNotExist => "The specified comment does not exist!",
            Self::ParentCommentDoesNotExist => "The parent comment does not exist!",
            Self::ParentCommentHidden => "The parent comment is hidden!",
            Self::CommentDepthExceeded => "The comment nesting depth limit has been exceeded!",
            Self::CommentEditForbidden => "Only the author or an admin may edit the comment!",
            Self::CommentDeleteForbidden => {
                "Only the author, the post author, or an admin may delete the comment!"
            }
            Self::ModeratorRequired => "The operation requires a moderator or admin role!",
            Self::AdminRequired => "The operation requires an admin role!",
            Self::InvalidModerationAction => "The moderation action is not recognized!",
            Self::RetryableConflict => {
                "The operation conflicted with a concurrent transaction, retry may succeed!"
            }
        };
        f.write_str(message)
    }
}

/// Error type representing a business logic error in the database layer
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
#[error("Business logic error: {error}")]
pub struct BusinessLogicError {
    pub error: BusinessLogicErrorKind,
}

impl BusinessLogicError {
    /// Business Logic Error constructor
    #[must_use]
    #[inline]
    pub const fn new(error: BusinessLogicErrorKind) -> Self {
        Self { error }
    }

    /// Category of the underlying error kind
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        self.error.class()
    }
}

/// Error encountered when working with the database, either a business logic
/// violation or a fault of the storage layer (kept with its original cause)
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    BusinessLogic(#[from] BusinessLogicError),
    #[error("Database error: {0}")]
    Database(sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// Kind of the business logic error, if this is one
    #[must_use]
    pub const fn business_logic_kind(&self) -> Option<BusinessLogicErrorKind> {
        match self {
            Self::BusinessLogic(error) => Some(error.error),
            _ => None,
        }
    }

    /// Check whether the error is the given business logic kind
    #[must_use]
    pub fn is_kind(&self, kind: BusinessLogicErrorKind) -> bool {
        self.business_logic_kind() == Some(kind)
    }
}

/// Serialization failures and deadlocks mean the transaction lost a race with
/// a concurrent one; surface those as a retryable conflict instead of a
/// storage fault.
impl From<sqlx::Error> for DbError {
    fn from(value: sqlx::Error) -> Self {
        if let sqlx::Error::Database(database_error) = &value
            && matches!(database_error.code().as_deref(), Some("40001") | Some("40P01"))
        {
            return Self::BusinessLogic(BusinessLogicError::new(
                BusinessLogicErrorKind::RetryableConflict,
            ));
        }
        Self::Database(value)
    }
}

/// Syntax sugar type for single record operation results
pub type DbResultSingle<T> = Result<T, DbError>;
/// Syntax sugar type for multiple record operation results
pub type DbResultMultiple<T> = Result<Vec<T>, DbError>;
