//! # 토큰 서비스
//!
//! JWT(HS256) access / refresh 토큰 쌍을 발급하고 검증합니다.
//!
//! | 토큰 | 수명 | 서명 키 |
//! |------|------|---------|
//! | access | 15분 | `access_secret` |
//! | refresh | 7일 | `refresh_secret` |
//!
//! refresh 토큰은 SHA-256 해시만 DB에 저장됩니다. 갱신(refresh)하면 기존
//! 해시를 지우고 새 쌍을 발급하므로 같은 refresh 토큰은 한 번만 쓸 수 있습니다.
//! 로그아웃하면 사용자의 refresh 토큰이 모두 삭제됩니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::users as db_users;
use crate::error::AppError;
use crate::models::user::{AccessDetails, Credentials, TokenPair, User};
use crate::services::users;

const ACCESS_TTL_MINUTES: i64 = 15;
const REFRESH_TTL_DAYS: i64 = 7;
const EXPIRES_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// 서명 키 한 쌍. `Config`에서 만들어져 `AppState`로 전달됩니다.
#[derive(Debug, Clone)]
pub struct TokenSecrets {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub username: String,
    pub is_admin: bool,
    pub kind: TokenKind,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for AccessDetails {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token signature is invalid")]
    Signature,

    #[error("Token is malformed")]
    Malformed,

    #[error("Unable to sign token: {0}")]
    Encode(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encode(msg) => AppError::Internal(msg),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

fn create_token(
    user: &User,
    kind: TokenKind,
    ttl: Duration,
    secret: &str,
) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.clone(),
        username: user.username.clone(),
        is_admin: user.is_admin,
        kind,
        // 같은 초에 발급된 토큰도 해시가 달라야 함
        jti: uuid::Uuid::now_v7().to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Encode(e.to_string()))
}

/// 서명과 만료를 검사하고 claims를 꺼냅니다. 종류(`kind`)가 다르면 `Malformed`.
pub fn extract_claims(token: &str, secret: &str, kind: TokenKind) -> Result<Claims, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::Signature,
        _ => TokenError::Malformed,
    })?;

    if data.claims.kind != kind {
        return Err(TokenError::Malformed);
    }
    Ok(data.claims)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 새 토큰 쌍을 만들고 refresh 토큰 해시를 저장합니다.
pub async fn generate(
    pool: &SqlitePool,
    secrets: &TokenSecrets,
    user: &User,
) -> Result<TokenPair, AppError> {
    let access_token = create_token(
        user,
        TokenKind::Access,
        Duration::minutes(ACCESS_TTL_MINUTES),
        &secrets.access,
    )?;
    let refresh_token = create_token(
        user,
        TokenKind::Refresh,
        Duration::days(REFRESH_TTL_DAYS),
        &secrets.refresh,
    )?;

    let token_id = uuid::Uuid::now_v7().to_string();
    let expires_at = (Utc::now() + Duration::days(REFRESH_TTL_DAYS))
        .format(EXPIRES_AT_FORMAT)
        .to_string();
    db_users::store_refresh_token(pool, &token_id, &user.id, &hash_token(&refresh_token), &expires_at)
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// 자격 증명을 확인하고 토큰 쌍을 발급합니다.
///
/// 없는 사용자도 잘못된 비밀번호와 같은 401로 응답합니다.
pub async fn login(
    pool: &SqlitePool,
    secrets: &TokenSecrets,
    credentials: &Credentials,
) -> Result<TokenPair, AppError> {
    let user = users::authenticate(pool, credentials)
        .await
        .map_err(|e| match e {
            AppError::NotFound => AppError::Unauthorized("Invalid username or password".to_string()),
            other => other,
        })?;

    tracing::info!("Issued tokens for [username={}]", user.username);
    generate(pool, secrets, &user).await
}

/// access 토큰을 검증하고 담긴 사용자 정보를 돌려줍니다.
pub fn validate(token: &str, secrets: &TokenSecrets) -> Result<AccessDetails, TokenError> {
    extract_claims(token, &secrets.access, TokenKind::Access).map(AccessDetails::from)
}

/// refresh 토큰을 소비하고 새 토큰 쌍을 발급합니다.
pub async fn refresh(
    pool: &SqlitePool,
    secrets: &TokenSecrets,
    refresh_token: &str,
) -> Result<TokenPair, AppError> {
    let claims = extract_claims(refresh_token, &secrets.refresh, TokenKind::Refresh)?;

    let token_hash = hash_token(refresh_token);
    let (_token_id, user_id, expires_at) = db_users::find_refresh_token(pool, &token_hash)
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    let expires = chrono::NaiveDateTime::parse_from_str(&expires_at, EXPIRES_AT_FORMAT)
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        db_users::delete_refresh_token(pool, &token_hash).await?;
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    // 같은 토큰으로 동시에 갱신하면 한쪽은 여기서 실패
    if !db_users::delete_refresh_token(pool, &token_hash).await? {
        return Err(AppError::Unauthorized("Refresh token not found or revoked".to_string()));
    }

    let user = db_users::find_by_id(pool, &user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;
    if user.id != claims.sub {
        return Err(AppError::Unauthorized("Refresh token does not match user".to_string()));
    }

    generate(pool, secrets, &user).await
}

pub async fn logout(pool: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    let removed = db_users::delete_user_refresh_tokens(pool, user_id).await?;
    tracing::debug!("Revoked {} refresh tokens for [user_id={}]", removed, user_id);
    Ok(())
}
