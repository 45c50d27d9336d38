//! # College Library Backend
//!
//! HTTP/JSON backend for a college library: student and admin authentication,
//! the book catalog and borrowing records, library-card applications, a
//! rare-book archive, study notes, events, notifications, contact messages and
//! donations. Uploaded images and PDFs are stored on disk and served back from
//! a static path.
//!
//! ## Architecture
//!
//! - **Axum**: routing, extractors and middleware
//! - **SQLx**: SQLite storage, schema created at startup
//! - **Tokio**: async runtime; password hashing runs on the blocking pool
//! - **Serde**: camelCase JSON on the wire
//!
//! ## Core Components
//!
//! - [`config`]: layered configuration (embedded TOML, files, env)
//! - [`db`]: schema initialization
//! - [`error`]: `AppError` and its JSON response shape
//! - [`metrics`]: login, upload and record counters
//! - [`middleware`]: authorization extractors, rate limiting, security headers, request validation
//! - [`password`]: Argon2id hashing
//! - [`routes`]: endpoint handlers and the router
//! - [`session`]: cookie-addressed server-side sessions
//! - [`state`]: shared application state
//! - [`store`]: per-entity SQL accessors
//! - [`types`]: request and response DTOs
//! - [`upload`]: multipart parsing and file storage

pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod types;
pub mod upload;

#[cfg(test)]
mod tests;
