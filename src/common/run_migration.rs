use std::sync::Arc;

use sqlx::PgPool;
use sqlx::sqlx_macros::migrate;

use crate::error::DbResultSingle;

#[inline]
/// Apply the migration scripts in `./migrations`, bringing the database up
/// to the schema the repositories expect (posts, comments, like sets,
/// report bookkeeping).
///
/// # Errors
/// When the migrations folder could not be found, the database connection
/// cannot be established, or one of the migration scripts fails to apply.
pub async fn run_migration(pool: Arc<PgPool>) -> DbResultSingle<()> {
    migrate!("./migrations").run(&*pool).await?;

    Ok(())
}
