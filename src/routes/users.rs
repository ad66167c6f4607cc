//! # 사용자 핸들러
//!
//! - `POST /api/v1/user/create` → 201 `{ "message": ... }`
//! - `POST /api/v1/user/validate` → `{ "username", "is_admin" }`

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    models::user::{AccessDetails, Credentials},
    routes::AppState,
    services::users,
};

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(credentials) = payload?;
    let user = users::create_user(&state.pool, &credentials, &state.admin_users).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": format!("Successfully created user {}", user.username) })),
    ))
}

pub async fn validate_user(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AccessDetails>, AppError> {
    let Json(credentials) = payload?;
    let details = users::validate_user(&state.pool, &credentials).await?;
    Ok(Json(details))
}
