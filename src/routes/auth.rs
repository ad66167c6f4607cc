//! # 인증 핸들러
//!
//! - `POST /api/v1/auth/token/generate` → `{ "access_token", "refresh_token" }`
//! - `POST /api/v1/auth/token/validate` → `{ "username", "is_admin" }`
//! - `POST /api/v1/auth/token/refresh` → 새 토큰 쌍 (기존 refresh 토큰은 폐기)
//! - `POST /api/v1/auth/logout` → 사용자의 refresh 토큰 전부 삭제 (Bearer 필요)

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::user::*,
    routes::AppState,
    services::tokens,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

/// `POST /auth/token/generate`: 자격 증명을 받아 토큰 쌍을 발급
pub async fn generate_tokens(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenPair>, AppError> {
    let Json(credentials) = payload?;
    let pair = tokens::login(&state.pool, &state.secrets, &credentials).await?;
    Ok(Json(pair))
}

/// `POST /auth/token/validate`: access 토큰을 검증하고 사용자 정보를 반환
pub async fn validate_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<AccessDetails>, AppError> {
    let Json(req) = payload?;
    let details = tokens::validate(&req.token, &state.secrets)?;
    Ok(Json(details))
}

/// `POST /auth/token/refresh`: refresh 토큰을 소비하고 새 토큰 쌍을 발급
pub async fn refresh_tokens(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, AppError> {
    let Json(req) = payload?;
    let pair = tokens::refresh(&state.pool, &state.secrets, &req.token).await?;
    Ok(Json(pair))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    tokens::logout(&state.pool, &auth_user.user_id).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}
