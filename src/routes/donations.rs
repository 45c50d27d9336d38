use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{validation, AppError, AppResult},
    middleware::RequireAdmin,
    state::AppState,
    store::donations::{self, Donation, NewDonation},
    types::{AmountInput, ApiJson, DonationRequest, SuccessResponse},
};

/// Positive, finite amount rendered with two decimals.
fn normalize_amount(amount: Option<&AmountInput>) -> AppResult<String> {
    match amount.and_then(AmountInput::value) {
        Some(v) if v.is_finite() && v > 0.0 => Ok(format!("{:.2}", v)),
        _ => Err(AppError::ValidationError {
            field: "amount".to_string(),
            message: "amount must be a positive number".to_string(),
        }),
    }
}

pub async fn list_donations(State(state): State<AppState>, _admin: RequireAdmin) -> AppResult<Json<Vec<Donation>>> {
    Ok(Json(donations::list(&state.db).await?))
}

pub async fn create_donation(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DonationRequest>,
) -> AppResult<Json<Donation>> {
    let new = NewDonation {
        amount: normalize_amount(req.amount.as_ref())?,
        method: validation::require(req.method, "method")?,
        name: req.name,
        email: req.email,
        message: req.message,
    };
    let donation = donations::create(&state.db, new).await?;
    state.metrics.inc_created();
    tracing::info!(donation_id = %donation.id, amount = %donation.amount, method = %donation.method, "Donation recorded");
    Ok(Json(donation))
}

pub async fn delete_donation(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    if donations::delete(&state.db, &id).await? {
        state.metrics.inc_deleted();
        tracing::info!(donation_id = %id, "Donation deleted");
    }
    Ok(Json(SuccessResponse::ok()))
}
