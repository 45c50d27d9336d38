use std::{net::SocketAddr, time::Duration};

use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use college_library::{config, db, middleware, routes, session, state::AppState};

/// Interval for dropping idle IPs from the rate limiter.
const RATE_LIMIT_CLEANUP: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging: stdout plus a daily rotated file under ./logs
    std::fs::create_dir_all("logs").ok();
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily("logs", "library.log");
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Writers flush on drop; keep the guards for the whole process.
    let _log_guards = (stdout_guard, file_guard);

    // embedded defaults -> library.toml -> LIBRARY_CONFIG -> env/.env
    let app_cfg = config::load()?;
    info!(admin = ?app_cfg.admin, "Configuration loaded");

    let db_url = app_cfg.database.url.clone();
    config::ensure_sqlite_parent_dir(&db_url)?;
    if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
        info!("Creating SQLite database at {}", db_url);
        Sqlite::create_database(&db_url).await?;
    }
    let pool = SqlitePoolOptions::new()
        .max_connections(app_cfg.database.max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                let _ = sqlx::query("PRAGMA foreign_keys=ON;").execute(&mut *conn).await;
                let _ = sqlx::query("PRAGMA busy_timeout=10000;").execute(&mut *conn).await;
                let _ = sqlx::query("PRAGMA temp_store=MEMORY;").execute(&mut *conn).await;
                Ok(())
            })
        })
        .connect(&db_url)
        .await?;

    db::init_db(&pool).await?;
    tokio::fs::create_dir_all(&app_cfg.uploads.dir).await?;

    let addr: SocketAddr = format!("{}:{}", app_cfg.server.host, app_cfg.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen addr {}:{} - {}", app_cfg.server.host, app_cfg.server.port, e))?;
    let session_cleanup = Duration::from_secs(app_cfg.session.cleanup_interval_secs);

    let state = AppState::new(pool, app_cfg)?;

    tokio::spawn(session::cleanup_task(state.sessions.clone(), session_cleanup));
    tokio::spawn(middleware::rate_limit::cleanup_task(state.rate_limiter.clone(), RATE_LIMIT_CLEANUP));

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Library backend listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received. Stopping server...");
}
