use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Datelike;

use crate::{
    error::{validation, AppError, AppResult, OptionExt},
    middleware::RequireAdmin,
    state::AppState,
    store::library_cards::{self, LibraryCardApplication, NewApplication},
    types::{ApiJson, CardApplicationRequest, CardStatusRequest, SuccessResponse},
};

/// Attempts at drawing an unused card number before giving up.
const CARD_NUMBER_ATTEMPTS: usize = 8;

pub async fn list_applications(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<Vec<LibraryCardApplication>>> {
    Ok(Json(library_cards::list(&state.db).await?))
}

async fn fresh_card_number(state: &AppState) -> AppResult<String> {
    let year = chrono::Utc::now().year();
    for _ in 0..CARD_NUMBER_ATTEMPTS {
        let candidate = library_cards::generate_card_number(year);
        if !library_cards::card_number_exists(&state.db, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Conflict("Could not allocate a library card number".to_string()))
}

pub async fn apply(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CardApplicationRequest>,
) -> AppResult<Json<LibraryCardApplication>> {
    let first_name = validation::require(req.first_name, "firstName")?;
    let last_name = validation::require(req.last_name, "lastName")?;
    let class = validation::require(req.class, "class")?;
    let roll_no = validation::require(req.roll_no, "rollNo")?;
    let email = validation::require(req.email, "email")?;
    let phone = validation::require(req.phone, "phone")?;
    let address_street = validation::require(req.address_street, "addressStreet")?;
    let address_city = validation::require(req.address_city, "addressCity")?;
    let address_state = validation::require(req.address_state, "addressState")?;
    let address_zip = validation::require(req.address_zip, "addressZip")?;
    let password = validation::require(req.password, "password")?;
    let dob = match req.dob.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => Some(validation::parse_date(d, "dob")?),
        None => None,
    };

    let card_number = match req.card_number.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) {
        Some(supplied) => {
            if library_cards::card_number_exists(&state.db, &supplied).await? {
                return Err(AppError::BadRequest("Card number already in use".to_string()));
            }
            supplied
        }
        None => fresh_card_number(&state).await?,
    };

    let password_hash = state.passwords.hash(&password).await?;
    let application = library_cards::create(
        &state.db,
        NewApplication {
            user_id: req.user_id,
            first_name,
            last_name,
            father_name: req.father_name,
            dob,
            class,
            field: req.field,
            roll_no,
            email,
            phone,
            address_street,
            address_city,
            address_state,
            address_zip,
            card_number,
            student_id: req.student_id,
            password_hash,
        },
    )
    .await?;
    state.metrics.inc_created();
    tracing::info!(
        application_id = %application.id,
        card_number = application.card_number.as_deref().unwrap_or_default(),
        "Library card application received"
    );
    Ok(Json(application))
}

pub async fn update_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<CardStatusRequest>,
) -> AppResult<Json<LibraryCardApplication>> {
    let application =
        library_cards::update_status(&state.db, &id, req.status).await?.ok_or_not_found("Application")?;
    tracing::info!(application_id = %id, status = ?application.status, "Library card status changed");
    Ok(Json(application))
}

pub async fn delete_application(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    if library_cards::delete(&state.db, &id).await? {
        state.metrics.inc_deleted();
        tracing::info!(application_id = %id, "Library card application deleted");
    }
    Ok(Json(SuccessResponse::ok()))
}
