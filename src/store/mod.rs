//! SQLite accessors, one module per entity.
//!
//! Handlers never build SQL themselves; they call the functions here with
//! already-validated inputs. Lists are ordered newest first. Deletes report
//! whether a row was removed but callers treat a missing row as success.

use serde::{Deserialize, Serialize};

pub mod books;
pub mod borrows;
pub mod contact;
pub mod donations;
pub mod events;
pub mod library_cards;
pub mod notes;
pub mod notifications;
pub mod rare_books;
pub mod users;

/// Generates a fresh record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// `INSERT/UPDATE ... RETURNING` statements are drained with `fetch_all`:
// SQLite only finishes the write once the statement has stepped past its last
// row, and a half-consumed statement keeps the pooled connection's read
// snapshot open.

/// First row of a drained `RETURNING` statement, if any.
pub(crate) fn first<T>(rows: Vec<T>) -> Option<T> {
    rows.into_iter().next()
}

/// The row an `INSERT ... RETURNING` must produce.
pub(crate) fn single<T>(rows: Vec<T>) -> sqlx::Result<T> {
    first(rows).ok_or(sqlx::Error::RowNotFound)
}

/// Visibility of notes and rare books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ActiveStatus {
    Active,
    Inactive,
}

impl ActiveStatus {
    pub fn toggled(self) -> Self {
        match self {
            ActiveStatus::Active => ActiveStatus::Inactive,
            ActiveStatus::Inactive => ActiveStatus::Active,
        }
    }
}
