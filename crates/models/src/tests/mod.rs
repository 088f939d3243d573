
use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

use crate::db::connect_in_memory;

/// Private in-memory database with the schema applied.
pub(crate) async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
