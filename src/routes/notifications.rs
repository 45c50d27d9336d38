use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::RequireAdmin,
    state::AppState,
    store::notifications::{self, NewNotification, Notification, NotificationKind},
    types::SuccessResponse,
    upload::FormData,
};

pub async fn list_notifications(State(state): State<AppState>) -> AppResult<Json<Vec<Notification>>> {
    Ok(Json(notifications::list(&state.db).await?))
}

/// `text` needs a message, `image` needs an image, `both` needs both.
/// Requirements are checked before the image is written.
pub async fn create_notification(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    mut form: FormData,
) -> AppResult<Json<Notification>> {
    let kind_raw = form.required("type")?;
    let kind = NotificationKind::parse(&kind_raw).ok_or_else(|| AppError::ValidationError {
        field: "type".to_string(),
        message: format!("Unknown notification type: {}", kind_raw),
    })?;
    let title = form.text("title");
    let message = form.text("message");
    let image_file = form.take_file("image");
    let image_text = form.text("image");

    if kind.needs_message() && message.is_none() {
        return Err(AppError::ValidationError {
            field: "message".to_string(),
            message: "message is required for this notification type".to_string(),
        });
    }
    if kind.needs_image() && image_file.is_none() && image_text.is_none() {
        return Err(AppError::ValidationError {
            field: "image".to_string(),
            message: "image is required for this notification type".to_string(),
        });
    }

    let uploaded = state.uploads.save_optional(image_file).await?;
    let stored: Vec<String> = uploaded.iter().cloned().collect();
    let image = uploaded.or(image_text);
    let created =
        notifications::create(&state.db, NewNotification { title, message, image, kind }).await.map_err(AppError::from);
    let notification = state.uploads.settle(&stored, created).await?;
    state.metrics.inc_created();
    tracing::info!(notification_id = %notification.id, kind = ?notification.kind, "Notification published");
    Ok(Json(notification))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    if notifications::delete(&state.db, &id).await? {
        state.metrics.inc_deleted();
        tracing::info!(notification_id = %id, "Notification deleted");
    }
    Ok(Json(SuccessResponse::ok()))
}
