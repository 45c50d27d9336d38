use serde::Serialize;
use sqlx::SqlitePool;

use super::{first, new_id, single};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub is_seen: bool,
    pub created_at: String,
}

pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<ContactMessage>> {
    sqlx::query_as("SELECT * FROM contact_messages ORDER BY created_at DESC, rowid DESC").fetch_all(pool).await
}

pub async fn create(pool: &SqlitePool, new: NewContactMessage) -> sqlx::Result<ContactMessage> {
    sqlx::query_as(
        r#"INSERT INTO contact_messages (id, name, email, subject, message)
           VALUES (?1, ?2, ?3, ?4, ?5)
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(new.name)
    .bind(new.email)
    .bind(new.subject)
    .bind(new.message)
    .fetch_all(pool)
    .await
    .and_then(single)
}

pub async fn set_seen(pool: &SqlitePool, id: &str, is_seen: bool) -> sqlx::Result<Option<ContactMessage>> {
    sqlx::query_as("UPDATE contact_messages SET is_seen = ?2 WHERE id = ?1 RETURNING *")
        .bind(id)
        .bind(is_seen)
        .fetch_all(pool)
        .await
        .map(first)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM contact_messages WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(res.rows_affected() > 0)
}
