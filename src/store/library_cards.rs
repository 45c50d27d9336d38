use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::{first, new_id, single};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CardStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCardApplication {
    pub id: String,
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub dob: Option<String>,
    pub class: String,
    pub field: Option<String>,
    pub roll_no: String,
    pub email: String,
    pub phone: String,
    pub address_street: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub status: CardStatus,
    pub card_number: Option<String>,
    pub student_id: Option<String>,
    pub issue_date: Option<String>,
    pub valid_through: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewApplication {
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub dob: Option<String>,
    pub class: String,
    pub field: Option<String>,
    pub roll_no: String,
    pub email: String,
    pub phone: String,
    pub address_street: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub card_number: String,
    pub student_id: Option<String>,
    pub password_hash: String,
}

/// Card numbers look like `LIB-2026-048213`.
pub fn generate_card_number(year: i32) -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("LIB-{}-{:06}", year, n)
}

pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<LibraryCardApplication>> {
    sqlx::query_as("SELECT * FROM library_card_applications ORDER BY created_at DESC, rowid DESC")
        .fetch_all(pool)
        .await
}

pub async fn get(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<LibraryCardApplication>> {
    sqlx::query_as("SELECT * FROM library_card_applications WHERE id = ?1").bind(id).fetch_optional(pool).await
}

pub async fn get_by_card_number(pool: &SqlitePool, card_number: &str) -> sqlx::Result<Option<LibraryCardApplication>> {
    sqlx::query_as("SELECT * FROM library_card_applications WHERE card_number = ?1")
        .bind(card_number)
        .fetch_optional(pool)
        .await
}

pub async fn card_number_exists(pool: &SqlitePool, card_number: &str) -> sqlx::Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM library_card_applications WHERE card_number = ?1")
        .bind(card_number)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn create(pool: &SqlitePool, new: NewApplication) -> sqlx::Result<LibraryCardApplication> {
    sqlx::query_as(
        r#"INSERT INTO library_card_applications (
               id, user_id, first_name, last_name, father_name, dob, class, field, roll_no, email, phone,
               address_street, address_city, address_state, address_zip, status, card_number, student_id, password)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, 'pending', ?16, ?17, ?18)
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(new.user_id)
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.father_name)
    .bind(new.dob)
    .bind(new.class)
    .bind(new.field)
    .bind(new.roll_no)
    .bind(new.email)
    .bind(new.phone)
    .bind(new.address_street)
    .bind(new.address_city)
    .bind(new.address_state)
    .bind(new.address_zip)
    .bind(new.card_number)
    .bind(new.student_id)
    .bind(new.password_hash)
    .fetch_all(pool)
    .await
    .and_then(single)
}

/// Sets the status. Approval stamps `issue_date` (today) and `valid_through`
/// (one year later) unless they were already set.
pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    status: CardStatus,
) -> sqlx::Result<Option<LibraryCardApplication>> {
    sqlx::query_as(
        r#"UPDATE library_card_applications SET
               status = ?2,
               issue_date = CASE WHEN ?2 = 'approved' THEN COALESCE(issue_date, date('now')) ELSE issue_date END,
               valid_through = CASE WHEN ?2 = 'approved' THEN COALESCE(valid_through, date('now', '+1 year')) ELSE valid_through END,
               updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
           WHERE id = ?1
           RETURNING *"#,
    )
    .bind(id)
    .bind(status)
    .fetch_all(pool)
    .await
    .map(first)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM library_card_applications WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_number_format() {
        let n = generate_card_number(2026);
        assert!(n.starts_with("LIB-2026-"));
        assert_eq!(n.len(), "LIB-2026-".len() + 6);
        assert!(n["LIB-2026-".len()..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_status_parses_from_json() {
        let s: CardStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(s, CardStatus::Rejected);
        assert!(serde_json::from_str::<CardStatus>("\"archived\"").is_err());
    }
}
