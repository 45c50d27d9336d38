//! HTTP route handlers for the library API.
//!
//! One sub-module per resource; [`router`] wires them together with the
//! middleware stack:
//!
//! - `auth`: register, login (admin / library card / email), logout, me
//! - `profile`: the caller's own profile
//! - `books`, `borrows`, `library_cards`: catalog and circulation
//! - `rare_books`, `notes`, `events`, `notifications`: published content
//! - `contact`, `donations`: public submissions reviewed by admins
//! - `users`: admin view of registered accounts
//! - `health`: probes, metrics and build info

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::{middleware, state::AppState};

pub mod auth;
pub mod books;
pub mod borrows;
pub mod contact;
pub mod donations;
pub mod events;
pub mod health;
pub mod library_cards;
pub mod notes;
pub mod notifications;
pub mod profile;
pub mod rare_books;
pub mod users;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/profile", get(profile::get_profile).post(profile::upsert_profile))
        .route("/api/books", get(books::list_books).post(books::create_book))
        .route("/api/books/{id}", patch(books::update_book).delete(books::delete_book))
        .route("/api/library-card/applications", get(library_cards::list_applications))
        .route("/api/library-card/apply", post(library_cards::apply))
        .route("/api/library-card/applications/{id}/status", patch(library_cards::update_status))
        .route("/api/library-card/applications/{id}", delete(library_cards::delete_application))
        .route("/api/book-borrows", get(borrows::list_borrows).post(borrows::create_borrow))
        .route("/api/book-borrows/{id}/status", patch(borrows::update_status))
        .route("/api/book-borrows/{id}/return", patch(borrows::mark_returned))
        .route("/api/book-borrows/{id}", delete(borrows::delete_borrow))
        .route("/api/rare-books", get(rare_books::list_rare_books).post(rare_books::create_rare_book))
        .route("/api/rare-books/stream/{id}", get(rare_books::stream_rare_book))
        .route("/api/rare-books/{id}/toggle", patch(rare_books::toggle_rare_book))
        .route("/api/rare-books/{id}", delete(rare_books::delete_rare_book))
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route("/api/admin/notes", get(notes::list_all_notes))
        .route("/api/notes/{id}", patch(notes::update_note).delete(notes::delete_note))
        .route("/api/notes/{id}/toggle", patch(notes::toggle_note))
        .route("/api/events", get(events::list_events).post(events::create_event))
        .route("/api/events/{id}", patch(events::update_event).delete(events::delete_event))
        .route(
            "/api/notifications",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route("/api/notifications/{id}", delete(notifications::delete_notification))
        .route("/api/contact", post(contact::create_message))
        .route("/api/contact-messages", get(contact::list_messages))
        .route("/api/contact-messages/{id}/seen", patch(contact::set_seen))
        .route("/api/contact-messages/{id}", delete(contact::delete_message))
        .route("/api/donations", get(donations::list_donations).post(donations::create_donation))
        .route("/api/donations/{id}", delete(donations::delete_donation))
        .route("/api/admin/users", get(users::list_users))
        .route("/api/admin/users/{id}", delete(users::delete_user))
}

fn probe_routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
}

/// The complete application: API, probes, uploaded files and middleware.
pub fn router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());
    let body_limit = middleware::validation::max_body_bytes(state.config.uploads.max_file_bytes);
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let cfg_arc = state.config.clone();

    let app = Router::new()
        .merge(api_routes())
        .merge(probe_routes())
        .nest_service(state.uploads.public_path(), uploads)
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn_with_state(state.clone(), middleware::validation::validate_request_middleware))
        .layer(from_fn_with_state(state, middleware::rate_limit::rate_limit_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(cfg_arc, middleware::security_headers::security_headers_middleware));

    // Permissive CORS only for local development against a separately served UI.
    if cfg!(debug_assertions) {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
