use serde::Serialize;
use sqlx::SqlitePool;

use super::{first, new_id, single, ActiveStatus};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RareBook {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub pdf_path: String,
    pub cover_image: String,
    pub status: ActiveStatus,
    pub created_at: String,
}

pub struct NewRareBook {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub pdf_path: String,
    pub cover_image: String,
}

pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<RareBook>> {
    sqlx::query_as("SELECT * FROM rare_books ORDER BY created_at DESC, rowid DESC").fetch_all(pool).await
}

pub async fn get(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<RareBook>> {
    sqlx::query_as("SELECT * FROM rare_books WHERE id = ?1").bind(id).fetch_optional(pool).await
}

pub async fn create(pool: &SqlitePool, new: NewRareBook) -> sqlx::Result<RareBook> {
    sqlx::query_as(
        r#"INSERT INTO rare_books (id, title, description, category, pdf_path, cover_image)
           VALUES (?1, ?2, ?3, COALESCE(?4, 'General'), ?5, ?6)
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(new.title)
    .bind(new.description)
    .bind(new.category)
    .bind(new.pdf_path)
    .bind(new.cover_image)
    .fetch_all(pool)
    .await
    .and_then(single)
}

/// Flips active/inactive in a single statement.
pub async fn toggle_status(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<RareBook>> {
    sqlx::query_as(
        r#"UPDATE rare_books
           SET status = CASE status WHEN 'active' THEN 'inactive' ELSE 'active' END
           WHERE id = ?1
           RETURNING *"#,
    )
    .bind(id)
    .fetch_all(pool)
    .await
    .map(first)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM rare_books WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(res.rows_affected() > 0)
}
