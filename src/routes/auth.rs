//! Registration, login, logout and the `me` probe.
//!
//! Login has three paths, picked by which fields the body carries: a
//! `secretKey` means the configured admin account, a `libraryCardId` means a
//! library-card holder, anything else is an email/password account.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{validation, AppError, AppResult},
    middleware::{auth::constant_time_eq, CurrentSession},
    session::{Session, ADMIN_USER_ID},
    state::AppState,
    store::{
        library_cards::{self, CardStatus},
        users::{self, NewUser},
    },
    types::{ApiJson, AuthResponse, LoginRequest, RegisterRequest, SuccessResponse},
};

const ADMIN_REDIRECT: &str = "/admin-dashboard";

/// Replaces whatever session the client had with `session` and returns the
/// cookie that carries the new id.
async fn start_session(state: &AppState, current: &CurrentSession, session: Session) -> HeaderValue {
    if let Some(old) = current.id.as_deref() {
        state.sessions.remove(old).await;
    }
    let id = state.sessions.create(session).await;
    state.sessions.session_cookie(&id)
}

fn login_failed(state: &AppState, message: &str) -> AppError {
    state.metrics.inc_login_failed();
    AppError::Unauthorized(message.to_string())
}

pub async fn register(
    State(state): State<AppState>,
    current: CurrentSession,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> AppResult<Response> {
    let email = validation::require(req.email, "email")?;
    let password = validation::require(req.password, "password")?;

    if users::get_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let password_hash = state.passwords.hash(&password).await?;
    let user = users::create(
        &state.db,
        NewUser {
            email,
            password_hash,
            full_name: req.full_name,
            phone: req.phone,
            roll_number: req.roll_number,
            department: req.department,
            student_class: req.student_class,
        },
    )
    .await?;
    state.metrics.inc_created();
    tracing::info!(user_id = %user.id, kind = %user.kind, "User registered");

    let cookie = start_session(&state, &current, Session::user(&user.id, false)).await;
    Ok(([(SET_COOKIE, cookie)], Json(AuthResponse::user(user.id, user.email))).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    current: CurrentSession,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    // Blank selector fields count as absent.
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    if let Some(secret_key) = present(req.secret_key) {
        return admin_login(&state, &current, req.email, req.password, secret_key).await;
    }
    if let Some(card_id) = present(req.library_card_id) {
        return library_card_login(&state, &current, card_id, req.password).await;
    }
    email_login(&state, &current, req.email, req.password).await
}

async fn admin_login(
    state: &AppState,
    current: &CurrentSession,
    email: Option<String>,
    password: Option<String>,
    secret_key: String,
) -> AppResult<Response> {
    let admin = &state.config.admin;
    let email = email.unwrap_or_default();
    let password = password.unwrap_or_default();

    // Non-short-circuiting `&` so every comparison runs.
    let valid = constant_time_eq(email.trim(), &admin.email)
        & constant_time_eq(&password, &admin.password)
        & constant_time_eq(&secret_key, &admin.secret_key);
    if !valid {
        tracing::warn!("Admin login rejected");
        return Err(login_failed(state, "Invalid admin credentials"));
    }

    let cookie = start_session(state, current, Session::admin()).await;
    state.metrics.inc_login_succeeded();
    tracing::info!("Admin logged in");
    let body = AuthResponse::user(ADMIN_USER_ID, admin.email.clone()).with_admin(true).with_redirect(ADMIN_REDIRECT);
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

async fn library_card_login(
    state: &AppState,
    current: &CurrentSession,
    card_id: String,
    password: Option<String>,
) -> AppResult<Response> {
    const WRONG_DETAILS: &str = "Write correct details";

    let application = library_cards::get_by_card_number(&state.db, card_id.trim())
        .await?
        .ok_or_else(|| login_failed(state, WRONG_DETAILS))?;
    let (Some(hash), Some(password)) = (application.password.as_deref(), password.as_deref()) else {
        return Err(login_failed(state, WRONG_DETAILS));
    };
    if !state.passwords.verify(password, hash).await? {
        return Err(login_failed(state, WRONG_DETAILS));
    }

    match application.status {
        CardStatus::Pending => return Err(login_failed(state, "Your account is pending for approval")),
        CardStatus::Rejected => {
            return Err(login_failed(state, "Your application was rejected. Please contact library."))
        }
        CardStatus::Approved => {}
    }

    let cookie = start_session(state, current, Session::library_card(&application.id)).await;
    state.metrics.inc_login_succeeded();
    tracing::info!(application_id = %application.id, "Library card holder logged in");
    Ok(([(SET_COOKIE, cookie)], Json(AuthResponse::user(application.id, application.email))).into_response())
}

async fn email_login(
    state: &AppState,
    current: &CurrentSession,
    email: Option<String>,
    password: Option<String>,
) -> AppResult<Response> {
    const INVALID: &str = "Invalid credentials";

    let email = validation::require(email, "email")?;
    let password = validation::require(password, "password")?;

    let user = users::get_by_email(&state.db, &email).await?.ok_or_else(|| login_failed(state, INVALID))?;
    if !state.passwords.verify(&password, &user.password).await? {
        return Err(login_failed(state, INVALID));
    }

    let is_admin = user.is_admin || users::roles(&state.db, &user.id).await?.iter().any(|r| r == "admin");
    let cookie = start_session(state, current, Session::user(&user.id, is_admin)).await;
    state.metrics.inc_login_succeeded();
    tracing::info!(user_id = %user.id, is_admin, "User logged in");
    Ok(([(SET_COOKIE, cookie)], Json(AuthResponse::user(user.id, user.email).with_admin(is_admin))).into_response())
}

pub async fn logout(State(state): State<AppState>, current: CurrentSession) -> impl IntoResponse {
    if let Some(id) = current.id.as_deref() {
        state.sessions.remove(id).await;
    }
    ([(SET_COOKIE, state.sessions.expired_cookie())], Json(SuccessResponse::ok()))
}

pub async fn me(State(state): State<AppState>, current: CurrentSession) -> AppResult<Json<AuthResponse>> {
    let session = current.session.ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))?;

    if session.is_admin && session.user_id == ADMIN_USER_ID {
        return Ok(Json(AuthResponse::user(ADMIN_USER_ID, state.config.admin.email.clone()).with_admin(true)));
    }
    if let Some(user) = users::get(&state.db, &session.user_id).await? {
        return Ok(Json(AuthResponse::user(user.id, user.email).with_admin(session.is_admin)));
    }
    if let Some(application) = library_cards::get(&state.db, &session.user_id).await? {
        return Ok(Json(AuthResponse::user(application.id, application.email).with_admin(false)));
    }
    Err(AppError::Unauthorized("User not found".to_string()))
}
