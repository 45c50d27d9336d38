use std::sync::Arc;

use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::middleware::rate_limit::RateLimiter;
use crate::password::PasswordHasher;
use crate::session::SessionStore;
use crate::upload::UploadStore;

/// The shared application state.
///
/// Cloned into every handler by Axum's `State` extractor; every field is
/// cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Server-side sessions keyed by cookie.
    pub sessions: SessionStore,
    /// Argon2 hasher for account and library-card passwords.
    pub passwords: PasswordHasher,
    /// Destination for uploaded images and PDFs.
    pub uploads: UploadStore,
    /// The application metrics.
    pub metrics: Metrics,
    /// Per-IP limiter applied to every request.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Builds the state from a connected pool and a validated configuration.
    ///
    /// Fails only if the password or upload settings cannot be turned into
    /// their runtime form, which `config::validate` already guards against.
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> anyhow::Result<Self> {
        let metrics = Metrics::new();
        let sessions = SessionStore::new(&config.session);
        let passwords = PasswordHasher::new(&config.passwords)?;
        let uploads = UploadStore::new(&config.uploads, metrics.clone())?;
        let rate_limiter = RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window_secs);

        Ok(Self {
            db,
            config: Arc::new(config),
            sessions,
            passwords,
            uploads,
            metrics,
            rate_limiter,
        })
    }
}
