use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{validation, AppError, AppResult, OptionExt},
    middleware::RequireAdmin,
    state::AppState,
    store::events::{self, Event, EventChanges, NewEvent},
    types::{ApiJson, EventUpdateRequest, SuccessResponse},
    upload::FormData,
};

pub const MAX_EVENT_IMAGES: usize = 10;

fn optional_date(value: Option<String>) -> AppResult<Option<String>> {
    match value.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => validation::parse_date(d, "date").map(Some),
        None => Ok(None),
    }
}

pub async fn list_events(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(events::list(&state.db).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    mut form: FormData,
) -> AppResult<Json<Event>> {
    let title = form.required("title")?;
    let description = form.required("description")?;
    let date = optional_date(form.text("date"))?;

    let files = form.take_files("images");
    if files.len() > MAX_EVENT_IMAGES {
        return Err(AppError::ValidationError {
            field: "images".to_string(),
            message: format!("At most {} images per event", MAX_EVENT_IMAGES),
        });
    }
    let images = state.uploads.save_all(files).await?;

    let stored = images.clone();
    let created = events::create(&state.db, NewEvent { title, description, images, date }).await.map_err(AppError::from);
    let event = state.uploads.settle(&stored, created).await?;
    state.metrics.inc_created();
    tracing::info!(event_id = %event.id, images = event.images.len(), "Event created");
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<EventUpdateRequest>,
) -> AppResult<Json<Event>> {
    let changes = EventChanges {
        title: req.title.filter(|t| !t.trim().is_empty()),
        description: req.description,
        date: optional_date(req.date)?,
    };
    let event = events::update(&state.db, &id, changes).await?.ok_or_not_found("Event")?;
    tracing::info!(event_id = %id, "Event updated");
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    if events::delete(&state.db, &id).await? {
        state.metrics.inc_deleted();
        tracing::info!(event_id = %id, "Event deleted");
    }
    Ok(Json(SuccessResponse::ok()))
}
