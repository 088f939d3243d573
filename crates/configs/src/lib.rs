use std::io;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            run_migrations: true,
        }
    }
}

/// Token signing and registration policy.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// When false, `is_admin` in a self-registration request is ignored.
    #[serde(default)]
    pub allow_admin_self_registration: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
            allow_admin_self_registration: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_token_ttl() -> u64 { 900 }
fn default_true() -> bool { true }

/// Upper bound for `auth.token_ttl_secs` (one year).
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    parse(&content).with_context(|| format!("parsing {path}"))
}

/// `Ok(None)` only when the file does not exist; unreadable or malformed
/// files are errors.
pub fn load_optional(path: &str) -> Result<Option<AppConfig>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(parse(&content).with_context(|| format!("parsing {path}"))?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::Error::new(e).context(format!("reading {path}"))),
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml`, validated and completed from the environment.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Prefer the config file; without one, build everything from env vars.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = match load_optional(&config_path())? {
            Some(cfg) => cfg,
            None => {
                let mut cfg = AppConfig::default();
                cfg.server.apply_env();
                cfg
            }
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.to_lowercase().starts_with("sqlite:")
    }
}

impl AuthSettings {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
        if let Some(ttl) = std::env::var("JWT_TTL_SECS").ok().and_then(|v| v.parse::<u64>().ok()) {
            self.token_ttl_secs = ttl;
        }
        if let Ok(v) = std::env::var("ALLOW_ADMIN_SELF_REGISTRATION") {
            self.allow_admin_self_registration = matches!(v.trim(), "1" | "true" | "yes");
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(anyhow!("auth.token_ttl_secs must be within 1..={MAX_TOKEN_TTL_SECS}"));
        }
        Ok(())
    }
}
