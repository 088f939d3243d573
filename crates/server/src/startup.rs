use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, auth};
use service::auth::{repo::seaorm::SeaOrmAuthRepository, AuthConfig, AuthService};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Connect the database, apply migrations when enabled, and wire the service.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<auth::ServerState> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("migrations applied");
    }

    let repo = Arc::new(SeaOrmAuthRepository::new(db));
    let auth_cfg = AuthConfig {
        jwt_secret: cfg.auth.jwt_secret.clone(),
        token_ttl: Duration::from_secs(cfg.auth.token_ttl_secs),
        allow_admin_self_registration: cfg.auth.allow_admin_self_registration,
    };
    Ok(auth::ServerState { auth: Arc::new(AuthService::new(repo, auth_cfg)?) })
}

pub fn build_app(state: auth::ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Serve until `shutdown` resolves.
pub async fn serve(cfg: AppConfig, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting auth server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server stopped");
    Ok(())
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}

/// Public entry: load configuration, then run the HTTP server until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_or_env()?;
    serve(cfg, ctrl_c()).await
}
