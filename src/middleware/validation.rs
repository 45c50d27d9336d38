use axum::{
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, state::AppState};

/// Rejects requests with traversal sequences in the path or a declared body
/// larger than the upload limit allows. Suspicious scanners are only logged.
pub async fn validate_request_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let uri_path = req.uri().path();
    if contains_path_traversal(uri_path) {
        tracing::warn!(path = %uri_path, "Path traversal attempt rejected");
        return AppError::BadRequest("Path traversal detected in request".to_string()).into_response();
    }

    if let Some(ua) = req.headers().get("user-agent").and_then(|v| v.to_str().ok()) {
        if is_suspicious_user_agent(ua) {
            tracing::warn!("Suspicious user agent detected: {}", ua);
        }
    }

    if matches!(req.method(), &Method::POST | &Method::PUT | &Method::PATCH) {
        let declared = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let limit = max_body_bytes(state.config.uploads.max_file_bytes);
        if let Some(length) = declared {
            if length > limit as u64 {
                return AppError::PayloadTooLarge(format!("Request body exceeds maximum size of {} bytes", limit))
                    .into_response();
            }
        }
    }

    next.run(req).await
}

/// Largest accepted request body: room for the biggest multipart request
/// (ten event images) plus a megabyte of form fields.
pub fn max_body_bytes(max_file_bytes: u64) -> usize {
    let limit = max_file_bytes.saturating_mul(10).saturating_add(1024 * 1024);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

/// Check if a path contains traversal attempts, including encoded variants.
fn contains_path_traversal(path: &str) -> bool {
    let lower = path.to_lowercase();

    if path.contains("/..") || path.contains("\\..") || path.starts_with("..") {
        return true;
    }
    if path.contains("/./") || path.contains("\\.\\") {
        return true;
    }
    if path.contains("....") {
        return true;
    }

    let encoded_patterns = [
        "%2e%2e",
        "%252e%252e",
        "%2e/",
        "%252e%2f",
        "/%2e",
        "%2f%2e",
        "%2e\\",
        "%2e%5c",
        "%5c%2e",
        "%5c%5c",
        "%00",
    ];
    if encoded_patterns.iter().any(|p| lower.contains(p)) {
        return true;
    }

    path.contains('\0')
}

/// Check for suspicious user agents (simple heuristic)
fn is_suspicious_user_agent(ua: &str) -> bool {
    let ua_lower = ua.to_lowercase();
    ua_lower.contains("scanner")
        || (ua_lower.contains("crawler") && !ua_lower.contains("googlebot") && !ua_lower.contains("bingbot"))
        || ua_lower.contains("nikto")
        || ua_lower.contains("sqlmap")
        || ua_lower.contains("havij")
        || ua_lower.contains("acunetix")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_traversal_detection() {
        assert!(contains_path_traversal("/server/uploads/../config/default.toml"));
        assert!(contains_path_traversal("/server/uploads/%2e%2e/secret"));
        assert!(contains_path_traversal("/server/uploads/%2E%2E/secret"));
        assert!(contains_path_traversal("/api/books/%00"));
        assert!(!contains_path_traversal("/server/uploads/1718000000000-42.pdf"));
        assert!(!contains_path_traversal("/api/library-card/applications/abc/status"));
    }

    #[test]
    fn test_suspicious_user_agents() {
        assert!(is_suspicious_user_agent("sqlmap/1.7"));
        assert!(is_suspicious_user_agent("SomeCrawler/2.0"));
        assert!(!is_suspicious_user_agent("Mozilla/5.0 (compatible; Googlebot/2.1; crawler)"));
        assert!(!is_suspicious_user_agent("Mozilla/5.0 (X11; Linux x86_64)"));
    }

    #[test]
    fn test_max_body_bytes() {
        assert_eq!(max_body_bytes(1024), 10 * 1024 + 1024 * 1024);
        assert_eq!(max_body_bytes(u64::MAX), usize::MAX);
    }
}
