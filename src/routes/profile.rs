use axum::{extract::State, Json};
use serde_json::Value;

use crate::{
    error::AppResult,
    middleware::RequireUser,
    state::AppState,
    store::users::{self, ProfileChanges},
    types::{ApiJson, ProfileRequest},
};

/// The caller's profile, or `{}` when none has been saved yet.
pub async fn get_profile(State(state): State<AppState>, RequireUser(session): RequireUser) -> AppResult<Json<Value>> {
    let profile = users::get_profile(&state.db, &session.user_id).await?;
    let body = match profile {
        Some(p) => serde_json::to_value(p).map_err(anyhow::Error::new)?,
        None => Value::Object(Default::default()),
    };
    Ok(Json(body))
}

pub async fn upsert_profile(
    State(state): State<AppState>,
    RequireUser(session): RequireUser,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> AppResult<Json<users::Profile>> {
    let changes = ProfileChanges {
        full_name: req.full_name,
        phone: req.phone,
        roll_number: req.roll_number,
        department: req.department,
        student_class: req.student_class,
        kind: req.kind,
    };
    let profile = users::upsert_profile(&state.db, &session.user_id, changes).await?;
    tracing::debug!(user_id = %session.user_id, "Profile saved");
    Ok(Json(profile))
}
