use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::RequireAdmin,
    state::AppState,
    store::notes::{self, NewNote, Note, NoteChanges},
    types::{ApiJson, NoteUpdateRequest, NotesQuery, SuccessResponse},
    upload::FormData,
};

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Active notes; narrowed to one class and subject when both are given.
pub async fn list_notes(State(state): State<AppState>, Query(q): Query<NotesQuery>) -> AppResult<Json<Vec<Note>>> {
    let notes = match (non_empty(q.class), non_empty(q.subject)) {
        (Some(class), Some(subject)) => notes::list_active_by_class_and_subject(&state.db, &class, &subject).await?,
        _ => notes::list_active(&state.db).await?,
    };
    Ok(Json(notes))
}

pub async fn list_all_notes(State(state): State<AppState>, _admin: RequireAdmin) -> AppResult<Json<Vec<Note>>> {
    Ok(Json(notes::list(&state.db).await?))
}

pub async fn create_note(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    mut form: FormData,
) -> AppResult<Json<Note>> {
    let class = form.required("class")?;
    let subject = form.required("subject")?;
    let title = form.required("title")?;
    let description = form.required("description")?;
    let pdf_path = state.uploads.save_optional(form.take_file("pdf")).await?.unwrap_or_default();

    let stored = [pdf_path.clone()];
    let created = notes::create(&state.db, NewNote { class, subject, title, description, pdf_path })
        .await
        .map_err(AppError::from);
    let note = state.uploads.settle(&stored, created).await?;
    state.metrics.inc_created();
    tracing::info!(note_id = %note.id, class = %note.class, subject = %note.subject, "Note uploaded");
    Ok(Json(note))
}

pub async fn update_note(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<NoteUpdateRequest>,
) -> AppResult<Json<Note>> {
    let changes = NoteChanges {
        class: non_empty(req.class),
        subject: non_empty(req.subject),
        title: non_empty(req.title),
        description: req.description,
        status: req.status,
    };
    let note = notes::update(&state.db, &id, changes).await?.ok_or_not_found("Note")?;
    tracing::info!(note_id = %id, "Note updated");
    Ok(Json(note))
}

pub async fn toggle_note(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<Note>> {
    let note = notes::toggle_status(&state.db, &id).await?.ok_or_not_found("Note")?;
    tracing::info!(note_id = %id, status = ?note.status, "Note visibility toggled");
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    if notes::delete(&state.db, &id).await? {
        state.metrics.inc_deleted();
        tracing::info!(note_id = %id, "Note deleted");
    }
    Ok(Json(SuccessResponse::ok()))
}
