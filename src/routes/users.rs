use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    middleware::RequireAdmin,
    state::AppState,
    store::users,
    types::{SuccessResponse, UsersResponse},
};

/// Registered accounts, split into students and everyone else.
pub async fn list_users(State(state): State<AppState>, _admin: RequireAdmin) -> AppResult<Json<UsersResponse>> {
    let (students, non_students): (Vec<_>, Vec<_>) = users::list(&state.db).await?.into_iter().partition(|u| u.is_student());
    Ok(Json(UsersResponse { students, non_students }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    if users::delete(&state.db, &id).await? {
        state.metrics.inc_deleted();
        tracing::info!(user_id = %id, "User deleted");
    }
    Ok(Json(SuccessResponse::ok()))
}
