use serde::Serialize;
use sqlx::SqlitePool;

use super::{new_id, single};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    /// Decimal with two places, e.g. `"500.00"`.
    pub amount: String,
    pub method: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: String,
}

pub struct NewDonation {
    pub amount: String,
    pub method: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<Donation>> {
    sqlx::query_as("SELECT * FROM donations ORDER BY created_at DESC, rowid DESC").fetch_all(pool).await
}

pub async fn create(pool: &SqlitePool, new: NewDonation) -> sqlx::Result<Donation> {
    sqlx::query_as(
        r#"INSERT INTO donations (id, amount, method, name, email, message)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(new.amount)
    .bind(new.method)
    .bind(new.name)
    .bind(new.email)
    .bind(new.message)
    .fetch_all(pool)
    .await
    .and_then(single)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM donations WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(res.rows_affected() > 0)
}
