use axum::extract::FromRequest;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::{borrows::BorrowStatus, library_cards::CardStatus, users::User, ActiveStatus};

/// `Json` whose rejections go through `AppError`, so malformed bodies get the
/// same 400 shape as every other client error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ---- auth ----

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
}

/// Login body. Which fields are present selects the login path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub secret_key: Option<String>,
    pub library_card_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: AuthUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl AuthResponse {
    pub fn user(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self { user: AuthUser { id: id.into(), email: email.into() }, is_admin: None, redirect: None }
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = Some(is_admin);
        self
    }

    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub students: Vec<User>,
    pub non_students: Vec<User>,
}

// ---- library cards ----

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardApplicationRequest {
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub father_name: Option<String>,
    pub dob: Option<String>,
    pub class: Option<String>,
    pub field: Option<String>,
    pub roll_no: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub address_zip: Option<String>,
    pub card_number: Option<String>,
    pub student_id: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardStatusRequest {
    pub status: CardStatus,
}

// ---- borrows ----

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub user_id: Option<String>,
    pub book_id: Option<String>,
    pub book_title: Option<String>,
    pub borrower_name: Option<String>,
    pub borrower_phone: Option<String>,
    pub borrower_email: Option<String>,
    pub borrow_date: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowStatusRequest {
    pub status: BorrowStatus,
    pub return_date: Option<String>,
}

// ---- notes / events ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteUpdateRequest {
    pub class: Option<String>,
    pub subject: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ActiveStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotesQuery {
    pub class: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

// ---- contact / donations ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeenRequest {
    pub is_seen: bool,
}

/// Donation amounts arrive either as JSON numbers or as strings from form inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn value(&self) -> Option<f64> {
        match self {
            AmountInput::Number(n) => Some(*n),
            AmountInput::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DonationRequest {
    pub amount: Option<AmountInput>,
    pub method: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}
