use serde::Serialize;
use sqlx::{types::Json, SqlitePool};

use super::{first, new_id, single};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub images: Json<Vec<String>>,
    pub date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub date: Option<String>,
}

#[derive(Debug, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<Event>> {
    sqlx::query_as("SELECT * FROM events ORDER BY created_at DESC, rowid DESC").fetch_all(pool).await
}

pub async fn create(pool: &SqlitePool, new: NewEvent) -> sqlx::Result<Event> {
    sqlx::query_as(
        r#"INSERT INTO events (id, title, description, images, date)
           VALUES (?1, ?2, ?3, ?4, ?5)
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(new.title)
    .bind(new.description)
    .bind(Json(new.images))
    .bind(new.date)
    .fetch_all(pool)
    .await
    .and_then(single)
}

pub async fn update(pool: &SqlitePool, id: &str, changes: EventChanges) -> sqlx::Result<Option<Event>> {
    sqlx::query_as(
        r#"UPDATE events SET
               title = COALESCE(?2, title),
               description = COALESCE(?3, description),
               date = COALESCE(?4, date),
               updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
           WHERE id = ?1
           RETURNING *"#,
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.date)
    .fetch_all(pool)
    .await
    .map(first)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM events WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(res.rows_affected() > 0)
}
