use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // load .env first so RUST_LOG / LOG_FORMAT apply
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "user_auth", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "user_auth",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    // config.toml first, then TOKIO_WORKER_THREADS
    let worker_threads = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg.server.worker_threads,
        Err(_) => std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()),
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "user_auth", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "user_auth",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "auth service starting"
    );

    // server::run owns Ctrl+C handling and drains in-flight requests
    match rt.block_on(server::run()) {
        Ok(()) => {
            info!(service = "user_auth", event = "stop", %service_id, pid, "auth service stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "user_auth", event = "run_failed", error = %e, "auth service exited with error");
            ExitCode::FAILURE
        }
    }
}
