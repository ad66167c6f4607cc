//! # 영화 카탈로그 핸들러
//!
//! ## 엔드포인트
//! - `POST /api/v1/movies/update/all` → 디렉토리 스캔 + TMDb 재조정 (관리자 전용)
//! - `GET  /api/v1/movies/all` → `{ "movies": [...] }`
//! - `GET  /api/v1/movies/{id}` → 영화 하나

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::auth::AdminUser,
    models::{Movie, UpdateAllRequest},
    routes::AppState,
};

/// 기본 메타데이터 언어
pub const DEFAULT_LANGUAGE: &str = "en";

/// `POST /movies/update/all`
///
/// 본문: `{ "language": "pl" }`. 항목별 실패는 응답의 `errors`에 담기고
/// 요청 자체는 항상 200입니다.
pub async fn update_all_movies(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<UpdateAllRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    let language = req
        .language
        .filter(|lang| !lang.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    tracing::info!(
        "Movie reconciliation requested [username={}, language={}]",
        admin.username,
        language
    );
    let report = state.movies.reconcile_all(&language).await;

    Ok(Json(json!({
        "errors": report.errors,
        "updated_movies": report.updated,
    })))
}

/// `GET /movies/all`
pub async fn list_movies(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let movies = state.movie_repo.find_all().await?;
    Ok(Json(json!({ "movies": movies })))
}

/// `GET /movies/{id}`
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Movie>, AppError> {
    let movie = state
        .movie_repo
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(movie))
}
