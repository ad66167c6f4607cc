//! # 사용자 모델
//!
//! - `User`: `users` 테이블 한 행 (비밀번호 해시는 직렬화하지 않음)
//! - `Credentials`: 가입/로그인 요청 본문과 검증 규칙
//! - `AccessDetails`, `TokenPair`, `TokenRequest`: 토큰 API의 요청/응답

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// 계정 생성과 로그인에 쓰는 사용자 이름/비밀번호
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub const USERNAME_MIN: usize = 3;
    pub const USERNAME_MAX: usize = 32;
    pub const PASSWORD_MIN: usize = 8;

    /// 처음 어긋난 조건을 클라이언트에 보여줄 메시지로 반환합니다.
    pub fn validate(&self) -> Result<(), String> {
        let username_len = self.username.chars().count();
        if username_len < Self::USERNAME_MIN || username_len > Self::USERNAME_MAX {
            return Err(format!(
                "Username must be between {} and {} characters",
                Self::USERNAME_MIN,
                Self::USERNAME_MAX
            ));
        }
        if self.username.trim() != self.username {
            return Err("Username must not start or end with whitespace".to_string());
        }
        if self.password.chars().count() < Self::PASSWORD_MIN {
            return Err(format!(
                "Password must be at least {} characters",
                Self::PASSWORD_MIN
            ));
        }
        Ok(())
    }
}

/// 모든 토큰에 담기는 사용자 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessDetails {
    pub username: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn validate_accepts_reasonable_credentials() {
        assert!(creds("TheBill", "hunter2hunter2").validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_fields() {
        assert!(creds("ab", "hunter2hunter2").validate().is_err());
        assert!(creds("TheBill", "short").validate().is_err());
        assert!(creds(&"x".repeat(33), "hunter2hunter2").validate().is_err());
        assert!(creds(" TheBill", "hunter2hunter2").validate().is_err());
    }
}
