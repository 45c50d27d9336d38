use serde::Serialize;
use sqlx::SqlitePool;

use super::{first, new_id, single, ActiveStatus};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub class: String,
    pub subject: String,
    pub title: String,
    pub description: String,
    pub pdf_path: String,
    pub status: ActiveStatus,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewNote {
    pub class: String,
    pub subject: String,
    pub title: String,
    pub description: String,
    pub pdf_path: String,
}

#[derive(Debug, Default)]
pub struct NoteChanges {
    pub class: Option<String>,
    pub subject: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ActiveStatus>,
}

pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<Note>> {
    sqlx::query_as("SELECT * FROM notes ORDER BY created_at DESC, rowid DESC").fetch_all(pool).await
}

pub async fn list_active(pool: &SqlitePool) -> sqlx::Result<Vec<Note>> {
    sqlx::query_as("SELECT * FROM notes WHERE status = 'active' ORDER BY created_at DESC, rowid DESC")
        .fetch_all(pool)
        .await
}

pub async fn list_active_by_class_and_subject(
    pool: &SqlitePool,
    class: &str,
    subject: &str,
) -> sqlx::Result<Vec<Note>> {
    sqlx::query_as(
        r#"SELECT * FROM notes
           WHERE class = ?1 AND subject = ?2 AND status = 'active'
           ORDER BY created_at DESC, rowid DESC"#,
    )
    .bind(class)
    .bind(subject)
    .fetch_all(pool)
    .await
}

pub async fn create(pool: &SqlitePool, new: NewNote) -> sqlx::Result<Note> {
    sqlx::query_as(
        r#"INSERT INTO notes (id, class, subject, title, description, pdf_path)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(new.class)
    .bind(new.subject)
    .bind(new.title)
    .bind(new.description)
    .bind(new.pdf_path)
    .fetch_all(pool)
    .await
    .and_then(single)
}

pub async fn update(pool: &SqlitePool, id: &str, changes: NoteChanges) -> sqlx::Result<Option<Note>> {
    sqlx::query_as(
        r#"UPDATE notes SET
               class = COALESCE(?2, class),
               subject = COALESCE(?3, subject),
               title = COALESCE(?4, title),
               description = COALESCE(?5, description),
               status = COALESCE(?6, status),
               updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
           WHERE id = ?1
           RETURNING *"#,
    )
    .bind(id)
    .bind(changes.class)
    .bind(changes.subject)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.status)
    .fetch_all(pool)
    .await
    .map(first)
}

/// Flips active/inactive in a single statement.
pub async fn toggle_status(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<Note>> {
    sqlx::query_as(
        r#"UPDATE notes
           SET status = CASE status WHEN 'active' THEN 'inactive' ELSE 'active' END,
               updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
           WHERE id = ?1
           RETURNING *"#,
    )
    .bind(id)
    .fetch_all(pool)
    .await
    .map(first)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM notes WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(res.rows_affected() > 0)
}
