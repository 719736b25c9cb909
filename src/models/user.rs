use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Role of a user account; the engine trusts this as already authenticated
/// and only consults it for moderation and admin gates.
#[derive(sqlx::Type, Debug, PartialEq, Eq, Clone, Copy)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

/// User structure which is serialized from the database. The engine never
/// mutates users, it only reads their identity and role.
#[derive(sqlx::FromRow, Debug, PartialEq, Eq, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub edited_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Admins may do everything a moderator may
    #[must_use]
    pub const fn can_moderate(&self) -> bool {
        matches!(self.role, Role::Moderator | Role::Admin)
    }
}

/// Structure passed to the repository to retrieve a user by their id
#[derive(Debug, Clone)]
pub struct UserGetById {
    pub id: Uuid,
}

impl UserGetById {
    #[must_use]
    #[inline]
    pub const fn new(id: &Uuid) -> Self {
        Self { id: *id }
    }
}
