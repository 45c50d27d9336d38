use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{validation, AppResult, OptionExt},
    middleware::RequireAdmin,
    state::AppState,
    store::borrows::{self, BookBorrow, NewBorrow},
    types::{ApiJson, BorrowRequest, BorrowStatusRequest, SuccessResponse},
};

pub async fn list_borrows(State(state): State<AppState>, _admin: RequireAdmin) -> AppResult<Json<Vec<BookBorrow>>> {
    Ok(Json(borrows::list(&state.db).await?))
}

pub async fn create_borrow(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ApiJson(req): ApiJson<BorrowRequest>,
) -> AppResult<Json<BookBorrow>> {
    let due_date = validation::require(req.due_date, "dueDate")?;
    let borrow_date = match req.borrow_date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => Some(validation::parse_timestamp(d, "borrowDate")?),
        None => None,
    };
    let new = NewBorrow {
        user_id: validation::require(req.user_id, "userId")?,
        book_id: validation::require(req.book_id, "bookId")?,
        book_title: validation::require(req.book_title, "bookTitle")?,
        borrower_name: validation::require(req.borrower_name, "borrowerName")?,
        borrower_phone: req.borrower_phone,
        borrower_email: req.borrower_email,
        borrow_date,
        due_date: validation::parse_timestamp(&due_date, "dueDate")?,
    };

    let borrow = borrows::create(&state.db, new).await?;
    state.metrics.inc_created();
    tracing::info!(borrow_id = %borrow.id, book_id = %borrow.book_id, "Borrow recorded");
    Ok(Json(borrow))
}

pub async fn update_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<BorrowStatusRequest>,
) -> AppResult<Json<BookBorrow>> {
    let return_date = match req.return_date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => Some(validation::parse_timestamp(d, "returnDate")?),
        None => None,
    };
    let borrow = borrows::update_status(&state.db, &id, req.status, return_date)
        .await?
        .ok_or_not_found("Borrow record")?;
    tracing::info!(borrow_id = %id, status = ?borrow.status, "Borrow status changed");
    Ok(Json(borrow))
}

pub async fn mark_returned(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<BookBorrow>> {
    let borrow = borrows::mark_returned(&state.db, &id).await?.ok_or_not_found("Borrow record")?;
    tracing::info!(borrow_id = %id, "Book returned");
    Ok(Json(borrow))
}

pub async fn delete_borrow(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    if borrows::delete(&state.db, &id).await? {
        state.metrics.inc_deleted();
        tracing::info!(borrow_id = %id, "Borrow record deleted");
    }
    Ok(Json(SuccessResponse::ok()))
}
