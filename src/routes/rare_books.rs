use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header::CONTENT_TYPE, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::{CurrentSession, RequireAdmin},
    state::AppState,
    store::{
        rare_books::{self, NewRareBook, RareBook},
        ActiveStatus,
    },
    types::SuccessResponse,
    upload::FormData,
};

pub async fn list_rare_books(State(state): State<AppState>) -> AppResult<Json<Vec<RareBook>>> {
    Ok(Json(rare_books::list(&state.db).await?))
}

/// Missing `pdf` or `cover` files are stored as empty paths.
pub async fn create_rare_book(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    mut form: FormData,
) -> AppResult<Json<RareBook>> {
    let title = form.required("title")?;
    let description = form.required("description")?;
    let category = form.text("category");

    let pdf_path = state.uploads.save_optional(form.take_file("pdf")).await?.unwrap_or_default();
    let cover_image = match state.uploads.save_optional(form.take_file("cover")).await {
        Ok(path) => path.unwrap_or_default(),
        Err(e) => {
            state.uploads.discard(&[pdf_path]).await;
            return Err(e);
        }
    };
    let stored = [pdf_path.clone(), cover_image.clone()];

    let created = rare_books::create(&state.db, NewRareBook { title, description, category, pdf_path, cover_image })
        .await
        .map_err(AppError::from);
    let book = state.uploads.settle(&stored, created).await?;
    state.metrics.inc_created();
    tracing::info!(rare_book_id = %book.id, "Rare book added");
    Ok(Json(book))
}

/// Serves the archived PDF inline. Hidden books are only visible to admins.
pub async fn stream_rare_book(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<String>,
    req: Request,
) -> AppResult<Response> {
    let is_admin = current.session.as_ref().is_some_and(|s| s.is_admin);
    let book = rare_books::get(&state.db, &id)
        .await?
        .filter(|b| is_admin || b.status == ActiveStatus::Active)
        .ok_or_not_found("Rare book")?;
    let file = state.uploads.local_path(&book.pdf_path).ok_or_not_found("PDF")?;
    if !tokio::fs::try_exists(&file).await.unwrap_or(false) {
        tracing::warn!(rare_book_id = %id, path = %file.display(), "Rare book PDF missing on disk");
        return Err(AppError::NotFound("PDF not found".to_string()));
    }

    let res = match ServeFile::new(&file).oneshot(req).await {
        Ok(res) => res,
        Err(never) => match never {},
    };
    let mut res = res.map(Body::new).into_response();
    if res.status().is_success() {
        res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    }
    Ok(res)
}

pub async fn toggle_rare_book(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<RareBook>> {
    let book = rare_books::toggle_status(&state.db, &id).await?.ok_or_not_found("Rare book")?;
    tracing::info!(rare_book_id = %id, status = ?book.status, "Rare book visibility toggled");
    Ok(Json(book))
}

pub async fn delete_rare_book(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    if rare_books::delete(&state.db, &id).await? {
        state.metrics.inc_deleted();
        tracing::info!(rare_book_id = %id, "Rare book deleted");
    }
    Ok(Json(SuccessResponse::ok()))
}
