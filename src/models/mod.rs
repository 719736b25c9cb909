pub use comment::{
    Comment, CommentAnonymized, CommentCreate, CommentGetById, CommentHardDelete,
    CommentLikeToggle, CommentModerate, CommentPage, CommentReport, CommentSoftDelete,
    CommentThread, CommentUpdate, CommentsByAuthor, DEFAULT_COMMENT_PAGE_SIZE, HiddenCause,
    LikeStatus, MAX_COMMENT_DEPTH, ModerationAction, REPORT_AUTO_HIDE_THRESHOLD, ReportOutcome,
    ThreadFetch, ThreadNode,
};
pub use post::{Post, PostGetById, PostLikeToggle, PostStatus};
pub use user::{Role, User, UserGetById};

pub mod comment;
pub mod post;
pub mod user;
