use serde::Serialize;
use sqlx::SqlitePool;

use super::{new_id, single};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub is_admin: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn is_student(&self) -> bool {
        self.kind == "student"
    }
}

pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile fields sent by the client; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
    pub kind: Option<String>,
}

pub async fn get(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?1").bind(id).fetch_optional(pool).await
}

pub async fn get_by_email(pool: &SqlitePool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?1 COLLATE NOCASE")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &SqlitePool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC, rowid DESC").fetch_all(pool).await
}

/// Inserts the user together with its default `user` role.
pub async fn create(pool: &SqlitePool, new: NewUser) -> sqlx::Result<User> {
    let kind = if new.student_class.as_deref().is_some_and(|c| !c.is_empty()) { "student" } else { "user" };
    let mut tx = pool.begin().await?;
    let user: User = sqlx::query_as(
        r#"INSERT INTO users (id, email, password, full_name, phone, roll_number, department, student_class, type, is_admin)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(&new.email)
    .bind(&new.password_hash)
    .bind(&new.full_name)
    .bind(&new.phone)
    .bind(&new.roll_number)
    .bind(&new.department)
    .bind(&new.student_class)
    .bind(kind)
    .fetch_all(&mut *tx)
    .await
    .and_then(single)?;

    sqlx::query("INSERT INTO user_roles (id, user_id, role) VALUES (?1, ?2, 'user')")
        .bind(new_id())
        .bind(&user.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

/// Removes the user, its roles and its profile.
pub async fn delete(pool: &SqlitePool, id: &str) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM user_roles WHERE user_id = ?1").bind(id).execute(&mut *tx).await?;
    sqlx::query("DELETE FROM profiles WHERE user_id = ?1").bind(id).execute(&mut *tx).await?;
    let res = sqlx::query("DELETE FROM users WHERE id = ?1").bind(id).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(res.rows_affected() > 0)
}

pub async fn roles(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = ?1 ORDER BY created_at")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as("SELECT * FROM profiles WHERE user_id = ?1").bind(user_id).fetch_optional(pool).await
}

/// Creates the profile on first write, otherwise merges the given fields.
pub async fn upsert_profile(pool: &SqlitePool, user_id: &str, changes: ProfileChanges) -> sqlx::Result<Profile> {
    sqlx::query_as(
        r#"INSERT INTO profiles (id, user_id, full_name, phone, roll_number, department, student_class, type)
           VALUES (?1, ?2, COALESCE(?3, ''), ?4, ?5, ?6, ?7, COALESCE(?8, 'user'))
           ON CONFLICT(user_id) DO UPDATE SET
               full_name = COALESCE(?3, full_name),
               phone = COALESCE(?4, phone),
               roll_number = COALESCE(?5, roll_number),
               department = COALESCE(?6, department),
               student_class = COALESCE(?7, student_class),
               type = COALESCE(?8, type),
               updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
           RETURNING *"#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(changes.full_name)
    .bind(changes.phone)
    .bind(changes.roll_number)
    .bind(changes.department)
    .bind(changes.student_class)
    .bind(changes.kind)
    .fetch_all(pool)
    .await
    .and_then(single)
}
