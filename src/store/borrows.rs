use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::{first, new_id, single};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookBorrow {
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    pub book_title: String,
    pub borrower_name: String,
    pub borrower_phone: Option<String>,
    pub borrower_email: Option<String>,
    pub borrow_date: String,
    pub due_date: String,
    pub return_date: Option<String>,
    pub status: BorrowStatus,
    pub created_at: String,
}

pub struct NewBorrow {
    pub user_id: String,
    pub book_id: String,
    pub book_title: String,
    pub borrower_name: String,
    pub borrower_phone: Option<String>,
    pub borrower_email: Option<String>,
    /// Defaults to the insertion time when absent.
    pub borrow_date: Option<String>,
    pub due_date: String,
}

pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<BookBorrow>> {
    sqlx::query_as("SELECT * FROM book_borrows ORDER BY created_at DESC, rowid DESC").fetch_all(pool).await
}

pub async fn create(pool: &SqlitePool, new: NewBorrow) -> sqlx::Result<BookBorrow> {
    sqlx::query_as(
        r#"INSERT INTO book_borrows (id, user_id, book_id, book_title, borrower_name, borrower_phone, borrower_email, borrow_date, due_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, COALESCE(?8, strftime('%Y-%m-%dT%H:%M:%fZ','now')), ?9)
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(new.user_id)
    .bind(new.book_id)
    .bind(new.book_title)
    .bind(new.borrower_name)
    .bind(new.borrower_phone)
    .bind(new.borrower_email)
    .bind(new.borrow_date)
    .bind(new.due_date)
    .fetch_all(pool)
    .await
    .and_then(single)
}

/// Sets the status and, when given, the return date.
pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    status: BorrowStatus,
    return_date: Option<String>,
) -> sqlx::Result<Option<BookBorrow>> {
    sqlx::query_as(
        r#"UPDATE book_borrows SET status = ?2, return_date = COALESCE(?3, return_date)
           WHERE id = ?1
           RETURNING *"#,
    )
    .bind(id)
    .bind(status)
    .bind(return_date)
    .fetch_all(pool)
    .await
    .map(first)
}

/// Marks the borrow returned as of now.
pub async fn mark_returned(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<BookBorrow>> {
    sqlx::query_as(
        r#"UPDATE book_borrows SET status = 'returned', return_date = strftime('%Y-%m-%dT%H:%M:%fZ','now')
           WHERE id = ?1
           RETURNING *"#,
    )
    .bind(id)
    .fetch_all(pool)
    .await
    .map(first)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM book_borrows WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(res.rows_affected() > 0)
}
