#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

use models::db::connect_in_memory;

/// Each test gets its own in-memory database with the schema applied.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
