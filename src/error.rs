//! # 에러 처리 모듈
//!
//! 핸들러가 반환하는 모든 에러를 `AppError` 하나로 통합하고,
//! `IntoResponse` 구현으로 HTTP 응답으로 변환합니다.
//!
//! 상태 코드 매핑 (모든 서비스에서 동일):
//! | 상황 | variant | 상태 |
//! |------|---------|------|
//! | 잘못된 JSON, 필드 누락, 검증 실패 | `BadRequest`, `Json` | 400 |
//! | 잘못된 자격 증명, 토큰 오류 | `Unauthorized` | 401 |
//! | 관리자 전용 경로 | `middleware::auth::AuthError::NotAdmin` | 403 |
//! | 리소스 없음 | `NotFound` | 404 |
//! | 유니크 제약 위반 | `Conflict` | 409 |
//! | 외부 메타데이터 API, DB, IO, 내부 오류 | `Metadata`, `Database`, `Io`, `Internal` | 500 |

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::metadata::MetadataError;
use crate::services::scanner::ScanError;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 요청 본문을 JSON으로 파싱하지 못함 (HTTP 400)
    /// axum 기본값(400/422 혼용) 대신 항상 400으로 응답합니다.
    #[error("Invalid request body: {0}")]
    Json(#[from] JsonRejection),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 외부 메타데이터 API 오류 (HTTP 500)
    #[error("Metadata service error: {0}")]
    Metadata(#[from] MetadataError),

    /// 데이터베이스 오류 (HTTP 500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 파일 입출력 오류 (HTTP 500)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// 응답에 사용할 상태 코드
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_)
            | AppError::Metadata(_)
            | AppError::Database(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 요청 경로에서 디렉토리를 읽다가 실패한 경우. 디렉토리가 사라졌으면 404입니다.
impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Io { source, .. } => AppError::Io(source),
            missing => {
                tracing::warn!("{}", missing);
                AppError::NotFound
            }
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, IO, Internal, Metadata)는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            AppError::NotFound => ("not_found", self.to_string()),
            AppError::BadRequest(ref msg) => ("bad_request", msg.clone()),
            AppError::Json(ref rejection) => ("bad_request", rejection.body_text()),
            AppError::Unauthorized(ref msg) => ("unauthorized", msg.clone()),
            AppError::Conflict(ref msg) => ("conflict", msg.clone()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string())
            }
            AppError::Metadata(ref e) => {
                tracing::error!("Metadata service error: {}", e);
                ("metadata_error", "The metadata service request failed".to_string())
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                ("database_error", "A database error occurred".to_string())
            }
            AppError::Io(ref e) => {
                tracing::error!("IO error: {}", e);
                ("io_error", "An IO error occurred".to_string())
            }
        };

        // { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
