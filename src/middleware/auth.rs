//! Session-based authorization.
//!
//! Handlers declare what they need by taking one of these extractors:
//! [`CurrentSession`] never rejects, [`RequireUser`] rejects anonymous callers
//! with 401, and [`RequireAdmin`] rejects everyone without the admin flag with
//! 403. There is no role hierarchy beyond that flag.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, session::Session, state::AppState};

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const ADMIN_REQUIRED_MESSAGE: &str = "Admin access required";

/// The caller's session, if the cookie maps to a live one.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: Option<String>,
    pub session: Option<Session>,
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = state.sessions.session_id_from_headers(&parts.headers);
        let session = match id.as_deref() {
            Some(id) => state.sessions.get(id).await,
            None => None,
        };
        Ok(Self { id, session })
    }
}

/// Any logged-in caller.
#[derive(Debug, Clone)]
pub struct RequireUser(pub Session);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = match CurrentSession::from_request_parts(parts, state).await {
            Ok(current) => current,
            Err(never) => match never {},
        };
        current
            .session
            .map(RequireUser)
            .ok_or_else(|| AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()))
    }
}

/// A caller whose session carries the admin flag.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Session);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = match CurrentSession::from_request_parts(parts, state).await {
            Ok(current) => current,
            Err(never) => match never {},
        };
        match current.session {
            Some(session) if session.is_admin => Ok(RequireAdmin(session)),
            _ => {
                state.metrics.inc_forbidden();
                tracing::debug!(path = %parts.uri.path(), "Rejected non-admin request");
                Err(AppError::Forbidden(ADMIN_REQUIRED_MESSAGE.to_string()))
            }
        }
    }
}

/// Compares two secrets without short-circuiting on the first differing byte.
pub fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided_bytes = provided.as_bytes();
    let expected_bytes = expected.as_bytes();
    if provided_bytes.len() != expected_bytes.len() {
        return false;
    }
    let mut diff = 0u8;
    for (a, b) in provided_bytes.iter().zip(expected_bytes) {
        diff |= a ^ b;
    }
    diff == 0
}
