use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{validation, AppError, AppResult, OptionExt},
    middleware::RequireAdmin,
    state::AppState,
    store::books::{self, Book, BookChanges, NewBook},
    types::SuccessResponse,
    upload::FormData,
};

const IMAGE_FIELD: &str = "bookImage";

pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(books::list(&state.db).await?))
}

/// An uploaded `bookImage` file wins over a `bookImage` text field. Also
/// returns the files written, so they can be discarded if the row is not.
async fn image_path(state: &AppState, form: &mut FormData) -> AppResult<(Option<String>, Vec<String>)> {
    let uploaded = state.uploads.save_optional(form.take_file(IMAGE_FIELD)).await?;
    let stored = uploaded.iter().cloned().collect();
    Ok((uploaded.or_else(|| form.text(IMAGE_FIELD)), stored))
}

pub async fn create_book(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    mut form: FormData,
) -> AppResult<Json<Book>> {
    let book_name = form.required("bookName")?;
    let short_intro = form.required("shortIntro")?;
    let description = form.required("description")?;
    let total_copies = form.integer("totalCopies")?;
    validation::validate_positive_number(total_copies, "totalCopies")?;
    let total_copies = total_copies.unwrap_or(1);
    let available_copies = form.integer("availableCopies")?.unwrap_or(1);
    validation::validate_copies(total_copies, available_copies)?;

    let (book_image, stored) = image_path(&state, &mut form).await?;
    let created = books::create(
        &state.db,
        NewBook { book_name, short_intro, description, book_image, total_copies, available_copies },
    )
    .await
    .map_err(AppError::from);
    let book = state.uploads.settle(&stored, created).await?;
    state.metrics.inc_created();
    tracing::info!(book_id = %book.id, "Book created");
    Ok(Json(book))
}

pub async fn update_book(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    mut form: FormData,
) -> AppResult<Json<Book>> {
    let total_copies = form.integer("totalCopies")?;
    validation::validate_positive_number(total_copies, "totalCopies")?;
    let available_copies = form.integer("availableCopies")?;

    let current = books::get(&state.db, &id).await?.ok_or_not_found("Book")?;
    validation::validate_copies(
        total_copies.unwrap_or(current.total_copies),
        available_copies.unwrap_or(current.available_copies),
    )?;

    let (book_image, stored) = image_path(&state, &mut form).await?;
    let changes = BookChanges {
        book_name: form.text("bookName"),
        short_intro: form.text("shortIntro"),
        description: form.text("description"),
        total_copies,
        available_copies,
        book_image,
    };
    // The row can still vanish between the lookup and the write.
    let updated = books::update(&state.db, &id, changes)
        .await
        .map_err(AppError::from)
        .and_then(|book| book.ok_or_not_found("Book"));
    let book = state.uploads.settle(&stored, updated).await?;
    tracing::info!(book_id = %book.id, "Book updated");
    Ok(Json(book))
}

pub async fn delete_book(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    if books::delete(&state.db, &id).await? {
        state.metrics.inc_deleted();
        tracing::info!(book_id = %id, "Book deleted");
    }
    Ok(Json(SuccessResponse::ok()))
}
