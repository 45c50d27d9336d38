use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Liveness probe, no DB access
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: DB ping bounded by a timeout
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let query = sqlx::query("SELECT 1").fetch_one(&state.db);
    match tokio::time::timeout(std::time::Duration::from_secs(5), query).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout").into_response(),
    }
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.get_snapshot())
}

fn counter(out: &mut String, name: &str, help: &str, kind: &str, value: impl std::fmt::Display) {
    out.push_str(&format!(
        "# HELP library_{name} {help}\n# TYPE library_{name} {kind}\nlibrary_{name} {value}\n"
    ));
}

// Prometheus text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let mut body = String::new();
    counter(&mut body, "logins_succeeded", "Successful logins", "counter", m.logins_succeeded);
    counter(&mut body, "logins_failed", "Rejected login attempts", "counter", m.logins_failed);
    counter(&mut body, "forbidden_requests", "Requests rejected for missing admin rights", "counter", m.forbidden_requests);
    counter(&mut body, "records_created", "Records created", "counter", m.records_created);
    counter(&mut body, "records_deleted", "Records deleted", "counter", m.records_deleted);
    counter(&mut body, "files_uploaded", "Files stored", "counter", m.files_uploaded);
    counter(&mut body, "bytes_uploaded", "Bytes stored", "counter", m.bytes_uploaded);
    counter(&mut body, "uptime_seconds", "Uptime seconds", "gauge", m.uptime_seconds);
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/build info (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
