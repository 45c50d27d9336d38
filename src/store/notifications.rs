use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::{new_id, single};

/// What a notification carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum NotificationKind {
    Text,
    Image,
    Both,
}

impl NotificationKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn needs_message(self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }

    pub fn needs_image(self) -> bool {
        matches!(self, Self::Image | Self::Both)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: Option<String>,
    pub message: Option<String>,
    pub image: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub created_at: String,
}

pub struct NewNotification {
    pub title: Option<String>,
    pub message: Option<String>,
    pub image: Option<String>,
    pub kind: NotificationKind,
}

pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<Notification>> {
    sqlx::query_as("SELECT * FROM notifications ORDER BY created_at DESC, rowid DESC").fetch_all(pool).await
}

pub async fn create(pool: &SqlitePool, new: NewNotification) -> sqlx::Result<Notification> {
    sqlx::query_as(
        r#"INSERT INTO notifications (id, title, message, image, type)
           VALUES (?1, ?2, ?3, ?4, ?5)
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(new.title)
    .bind(new.message)
    .bind(new.image)
    .bind(new.kind)
    .fetch_all(pool)
    .await
    .and_then(single)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM notifications WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_requirements() {
        assert!(NotificationKind::Text.needs_message());
        assert!(!NotificationKind::Text.needs_image());
        assert!(NotificationKind::Image.needs_image());
        assert!(!NotificationKind::Image.needs_message());
        assert!(NotificationKind::Both.needs_image() && NotificationKind::Both.needs_message());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(NotificationKind::parse(" Both "), Some(NotificationKind::Both));
        assert_eq!(NotificationKind::parse("video"), None);
    }
}
