//! Middleware components for HTTP request processing.
//!
//! Cross-cutting concerns layered onto the router: session-based
//! authorization extractors, client identification, per-IP rate limiting,
//! security headers, and request validation.

pub mod auth;
pub mod ip;
pub mod rate_limit;
pub mod security_headers;
pub mod validation;

pub use auth::{CurrentSession, RequireAdmin, RequireUser};
