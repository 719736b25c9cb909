pub use comment::{
    CommentRepository, CommentRepositoryFetchThread, CommentRepositoryListByAuthor,
};
pub use moderation::ModerationRepository;
pub use post::PostRepository;
pub use user::UserRepository;

pub mod comment;
pub mod counters;
pub mod like;
pub mod moderation;
pub mod post;
pub mod user;
