use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::common::error::DbResultSingle;
use crate::common::{DbPoolHandler, DbReadOne, DbRepository, PoolHandler};
use crate::error::{BusinessLogicError, BusinessLogicErrorKind, DbError};
use crate::models::{Role, User, UserGetById};

/// Read-only access to user identities. Account management (registration,
/// login, profile updates) lives outside the engine; the repositories here
/// only need to resolve `{id, role}` for permission checks.
pub struct UserRepository {
    pool_handler: PoolHandler,
}

impl UserRepository {
    /// Function which retrieves a user by their id, usable within a transaction
    ///
    /// # Params
    /// - `params`: structure containing the id of the user
    /// - `transaction_handle` mutable reference to an ongoing transaction
    ///
    /// # Returns
    /// - `Ok(user)`: on successful connection and retrieval
    /// - `Err(_)`: otherwise
    pub async fn get_user<'a>(
        params: UserGetById,
        transaction_handle: &mut Transaction<'a, Postgres>,
    ) -> DbResultSingle<Option<User>> {
        let user = sqlx::query_as!(
            User,
            r#"
            SELECT id, username, email, role AS "role: Role", created_at, edited_at, deleted_at
            FROM "User" WHERE id = $1
            "#,
            params.id
        )
        .fetch_optional(transaction_handle.as_mut())
        .await?;
        Ok(user)
    }

    /// Function which checks if the user is correct (existing and not deleted)
    ///
    /// # Params
    /// - `user`: optional user retrieved from the database
    ///
    /// # Returns
    /// - `Ok(user)`: when the user exists and is not deleted
    /// - `Err(DbError)`: with appropriate error description otherwise
    pub fn user_is_correct(user: Option<User>) -> DbResultSingle<User> {
        match user {
            Some(u) => {
                if u.deleted_at.is_some() {
                    Err(DbError::from(BusinessLogicError::new(
                        BusinessLogicErrorKind::UserDeleted,
                    )))
                } else {
                    Ok(u)
                }
            }
            None => Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::UserDoesNotExist,
            ))),
        }
    }
}

#[async_trait]
impl DbRepository for UserRepository {
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
impl DbReadOne<UserGetById, User> for UserRepository {
    /// Resolve an identity for permission checks; deleted accounts resolve
    /// the same as missing ones
    async fn read_one(&mut self, params: &UserGetById) -> DbResultSingle<User> {
        let user = sqlx::query_as!(
            User,
            r#"
            SELECT id, username, email, role AS "role: Role", created_at, edited_at, deleted_at
            FROM "User" WHERE id = $1 AND deleted_at IS NULL
            "#,
            params.id
        )
        .fetch_optional(self.pool_handler.pool.as_ref())
        .await?;

        match user {
            Some(user) => Ok(user),
            None => Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::UserDoesNotExist,
            ))),
        }
    }
}
