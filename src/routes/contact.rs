use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{validation, AppResult, OptionExt},
    middleware::RequireAdmin,
    state::AppState,
    store::contact::{self, ContactMessage, NewContactMessage},
    types::{ApiJson, ContactRequest, SeenRequest, SuccessResponse},
};

pub async fn list_messages(State(state): State<AppState>, _admin: RequireAdmin) -> AppResult<Json<Vec<ContactMessage>>> {
    Ok(Json(contact::list(&state.db).await?))
}

pub async fn create_message(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ContactRequest>,
) -> AppResult<Json<ContactMessage>> {
    let new = NewContactMessage {
        name: validation::require(req.name, "name")?,
        email: validation::require(req.email, "email")?,
        subject: validation::require(req.subject, "subject")?,
        message: validation::require(req.message, "message")?,
    };
    let message = contact::create(&state.db, new).await?;
    state.metrics.inc_created();
    tracing::info!(message_id = %message.id, "Contact message received");
    Ok(Json(message))
}

pub async fn set_seen(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<SeenRequest>,
) -> AppResult<Json<ContactMessage>> {
    let message = contact::set_seen(&state.db, &id, req.is_seen).await?.ok_or_not_found("Message")?;
    Ok(Json(message))
}

pub async fn delete_message(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    if contact::delete(&state.db, &id).await? {
        state.metrics.inc_deleted();
        tracing::info!(message_id = %id, "Contact message deleted");
    }
    Ok(Json(SuccessResponse::ok()))
}
