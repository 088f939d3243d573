use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sea_orm::sqlx::ConnectOptions as _;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxSqliteConnector};
use tracing::info;

use crate::errors::ModelError;

/// Connect with explicit pool settings.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, ModelError> {
    if cfg.is_sqlite() && cfg.url.contains(":memory:") {
        return connect_sqlite_memory(cfg).await;
    }
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opt).await?;
    info!(
        max_connections = cfg.max_connections,
        min_connections = cfg.min_connections,
        sqlite = cfg.is_sqlite(),
        "database pool ready"
    );
    Ok(db)
}

/// An in-memory SQLite database lives and dies with its single connection:
/// the pool holds exactly one and never retires it for idleness or age.
async fn connect_sqlite_memory(cfg: &DatabaseConfig) -> Result<DatabaseConnection, ModelError> {
    let mut opts: SqliteConnectOptions = cfg.url.parse().map_err(|e: sea_orm::sqlx::Error| ModelError::Db(e.to_string()))?;
    if !cfg.sqlx_logging {
        opts = opts.disable_statement_logging();
    }
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    info!(max_connections = 1, sqlite = true, "in-memory database pool ready");
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// Fresh private SQLite database, used by tests and local demos.
pub async fn connect_in_memory() -> Result<DatabaseConnection, ModelError> {
    let cfg = DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    connect_with_config(&cfg).await
}
