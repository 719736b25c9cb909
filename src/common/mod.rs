use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::error::{DbResultMultiple, DbResultSingle};

pub mod error;
pub mod query_parameters;
pub mod run_migration;

/// Generic trait for handlers which hold the database connection pool
#[async_trait]
pub trait DbPoolHandler {
    /// Pool handler constructor
    #[must_use]
    fn new(pool: Arc<PgPool>) -> Self;

    /// Method allowing the pool handler to disconnect from the pool
    async fn disconnect(&mut self) -> ();
}

/// Generic handler holding the shared database connection pool
#[derive(Clone)]
pub struct PoolHandler {
    pub pool: Arc<PgPool>,
}

#[async_trait]
impl DbPoolHandler for PoolHandler {
    #[inline]
    fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn disconnect(&mut self) -> () {
        self.pool.close().await;
    }
}

/// Generic trait for each repository to implement
#[async_trait]
pub trait DbRepository {
    /// Repository constructor
    #[must_use]
    fn new(pool_handler: PoolHandler) -> Self;

    /// Method allowing the repository to disconnect from the database pool
    async fn disconnect(&mut self) -> ();
}

/// Generic trait for repositories creating a record in the database
#[async_trait]
pub trait DbCreate<Create, Read> {
    /// Create a new record in the database from the `data` structure
    async fn create(&mut self, data: &Create) -> DbResultSingle<Read>;
}

/// Generic trait for repositories reading a single record from the database
#[async_trait]
pub trait DbReadOne<ReadOne, Read> {
    /// Read a single record from the database identified by `params`
    async fn read_one(&mut self, params: &ReadOne) -> DbResultSingle<Read>;
}

/// Generic trait for repositories updating records in the database
#[async_trait]
pub trait DbUpdate<Update, Read> {
    /// Update records in the database matching `params`
    async fn update(&mut self, params: &Update) -> DbResultMultiple<Read>;
}

/// Generic trait for repositories deleting records from the database
#[async_trait]
pub trait DbDelete<Delete, Read> {
    /// Delete records from the database matching `params`
    async fn delete(&mut self, params: &Delete) -> DbResultMultiple<Read>;
}

/// Generic trait for repositories flipping a user's membership in a record's
/// like set. The flip and the denormalized counter rewrite happen inside one
/// transaction, so the stored count always matches the persisted set.
#[async_trait]
pub trait DbToggleLike<Toggle, Response> {
    /// Add the user to the like set if absent, remove them if present, and
    /// report the resulting membership along with the synchronized count
    async fn toggle_like(&mut self, params: &Toggle) -> DbResultSingle<Response>;
}
