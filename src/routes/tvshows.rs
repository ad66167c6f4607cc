//! # TV 쇼 카탈로그 핸들러
//!
//! ## 엔드포인트
//! - `POST /api/v1/tvshows/update/all` → 디렉토리 스캔 + TVmaze 재조정 (관리자 전용)
//! - `GET  /api/v1/tvshows/all` → `{ "tv_shows": [...] }`
//! - `POST /api/v1/tvshows/get` → 이름으로 쇼 하나
//! - `GET  /api/v1/tvshows/{id}` → 쇼 하나
//! - `GET  /api/v1/tvshows/{id}/episodes` → `{ "name", "seasons": [{ "name", "episodes" }] }`

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};
use std::path::Path as FsPath;

use crate::{
    error::AppError,
    middleware::auth::AdminUser,
    models::{ShowNameRequest, TvShow},
    routes::AppState,
    services::episodes,
};

/// `POST /tvshows/update/all`: TVmaze는 언어 파라미터가 없으므로 요청 본문은 무시합니다.
pub async fn update_all_shows(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Value>, AppError> {
    tracing::info!("TV show reconciliation requested [username={}]", admin.username);
    let report = state.shows.reconcile_all("en").await;

    Ok(Json(json!({
        "errors": report.errors,
        "updated_shows": report.updated,
    })))
}

/// `GET /tvshows/all`
pub async fn list_shows(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let shows = state.show_repo.find_all().await?;
    Ok(Json(json!({ "tv_shows": shows })))
}

/// `POST /tvshows/get`, 본문 `{"name": "The Office"}`
pub async fn get_show_by_name(
    State(state): State<AppState>,
    payload: Result<Json<ShowNameRequest>, JsonRejection>,
) -> Result<Json<TvShow>, AppError> {
    let Json(req) = payload?;
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }

    let show = state
        .show_repo
        .find_by_natural_key(&req.name)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(show))
}

/// `GET /tvshows/{id}/episodes`: 저장된 쇼 디렉토리의 시즌과 에피소드 파일
///
/// 쇼가 없거나 디렉토리가 사라졌으면 404.
pub async fn list_episodes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let show = state
        .show_repo
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    let seasons =
        episodes::list_seasons(FsPath::new(&show.dir_path), &state.episode_extensions).await?;

    Ok(Json(json!({
        "name": show.name,
        "seasons": seasons,
    })))
}

/// `GET /tvshows/{id}`
pub async fn get_show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TvShow>, AppError> {
    let show = state
        .show_repo
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(show))
}
