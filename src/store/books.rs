use serde::Serialize;
use sqlx::SqlitePool;

use super::{first, new_id, single};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub book_name: String,
    pub short_intro: String,
    pub description: String,
    pub book_image: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewBook {
    pub book_name: String,
    pub short_intro: String,
    pub description: String,
    pub book_image: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
}

#[derive(Debug, Default)]
pub struct BookChanges {
    pub book_name: Option<String>,
    pub short_intro: Option<String>,
    pub description: Option<String>,
    pub book_image: Option<String>,
    pub total_copies: Option<i64>,
    pub available_copies: Option<i64>,
}

pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<Book>> {
    sqlx::query_as("SELECT * FROM books ORDER BY created_at DESC, rowid DESC").fetch_all(pool).await
}

pub async fn get(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<Book>> {
    sqlx::query_as("SELECT * FROM books WHERE id = ?1").bind(id).fetch_optional(pool).await
}

pub async fn create(pool: &SqlitePool, new: NewBook) -> sqlx::Result<Book> {
    sqlx::query_as(
        r#"INSERT INTO books (id, book_name, short_intro, description, book_image, total_copies, available_copies)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(new.book_name)
    .bind(new.short_intro)
    .bind(new.description)
    .bind(new.book_image)
    .bind(new.total_copies)
    .bind(new.available_copies)
    .fetch_all(pool)
    .await
    .and_then(single)
}

pub async fn update(pool: &SqlitePool, id: &str, changes: BookChanges) -> sqlx::Result<Option<Book>> {
    sqlx::query_as(
        r#"UPDATE books SET
               book_name = COALESCE(?2, book_name),
               short_intro = COALESCE(?3, short_intro),
               description = COALESCE(?4, description),
               book_image = COALESCE(?5, book_image),
               total_copies = COALESCE(?6, total_copies),
               available_copies = COALESCE(?7, available_copies),
               updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
           WHERE id = ?1
           RETURNING *"#,
    )
    .bind(id)
    .bind(changes.book_name)
    .bind(changes.short_intro)
    .bind(changes.description)
    .bind(changes.book_image)
    .bind(changes.total_copies)
    .bind(changes.available_copies)
    .fetch_all(pool)
    .await
    .map(first)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM books WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(res.rows_affected() > 0)
}
