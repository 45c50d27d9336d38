use std::path::Path;

use globset::Glob;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_secs: u64,
    pub cleanup_interval_secs: u64,
    pub secure_cookie: bool,
}

/// Fixed admin credentials checked by the secret-key login.
#[derive(Clone, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub secret_key: String,
}

// Keep credentials out of logs.
impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("email", &self.email)
            .field("password", &"***")
            .field("secret_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub dir: String,
    pub public_path: String,
    pub max_file_bytes: u64,
    pub allowed: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub admin: AdminConfig,
    pub uploads: UploadConfig,
    pub passwords: PasswordConfig,
    pub rate_limit: RateLimitConfig,
    pub security: Option<SecurityConfig>,
}

const DEFAULTS: &str = include_str!("../config/default.toml");

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        match ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        // Optional local file: library.toml (in CWD)
        .add_source(::config::File::with_name("library").required(false));

    if let Ok(custom_path) = std::env::var("LIBRARY_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("LIBRARY").separator("__"));

    // Unprefixed variables understood by existing deployments.
    builder = builder
        .set_override_option("admin.email", std::env::var("ADMIN_EMAIL").ok())?
        .set_override_option("admin.password", std::env::var("ADMIN_PASSWORD").ok())?
        .set_override_option("admin.secret_key", std::env::var("ADMIN_SECRET_KEY").ok())?
        .set_override_option("server.port", std::env::var("PORT").ok())?;

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }
    if cfg.server.request_timeout_secs == 0 {
        return Err(anyhow::anyhow!("server.request_timeout_secs must be > 0"));
    }
    if cfg.database.max_connections == 0 {
        return Err(anyhow::anyhow!("database.max_connections must be > 0"));
    }

    if cfg.session.cookie_name.trim().is_empty() {
        return Err(anyhow::anyhow!("session.cookie_name must not be empty"));
    }
    if cfg.session.ttl_secs == 0 {
        return Err(anyhow::anyhow!("session.ttl_secs must be > 0"));
    }
    if cfg.session.cleanup_interval_secs == 0 {
        return Err(anyhow::anyhow!("session.cleanup_interval_secs must be > 0"));
    }

    if cfg.admin.email.is_empty() || cfg.admin.password.is_empty() || cfg.admin.secret_key.is_empty() {
        return Err(anyhow::anyhow!("admin.email, admin.password and admin.secret_key must be set"));
    }

    if cfg.uploads.max_file_bytes == 0 {
        return Err(anyhow::anyhow!("uploads.max_file_bytes must be > 0"));
    }
    if !cfg.uploads.public_path.starts_with('/') || cfg.uploads.public_path.trim_end_matches('/').is_empty() {
        return Err(anyhow::anyhow!("uploads.public_path must start with '/' and name a sub-path"));
    }
    for pattern in &cfg.uploads.allowed {
        Glob::new(pattern).map_err(|e| anyhow::anyhow!("invalid uploads.allowed pattern {}: {}", pattern, e))?;
    }

    // Argon2 requires at least 8 KiB per lane.
    if cfg.passwords.parallelism == 0 || cfg.passwords.iterations == 0 {
        return Err(anyhow::anyhow!("passwords.iterations and passwords.parallelism must be > 0"));
    }
    if cfg.passwords.memory_kib < 8 * cfg.passwords.parallelism {
        return Err(anyhow::anyhow!("passwords.memory_kib must be >= 8 * parallelism"));
    }

    if cfg.rate_limit.max_requests == 0 || cfg.rate_limit.window_secs == 0 {
        return Err(anyhow::anyhow!("rate_limit.max_requests and rate_limit.window_secs must be > 0"));
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}
