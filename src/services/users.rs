//! 사용자 생성과 자격 증명 확인. 비밀번호는 Argon2id로 해싱합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::SqlitePool;

use crate::db::users as db_users;
use crate::error::AppError;
use crate::models::user::{AccessDetails, Credentials, User};

/// 새 계정을 만듭니다. `admin_users`에 이름이 있으면 관리자 권한을 줍니다.
pub async fn create_user(
    pool: &SqlitePool,
    credentials: &Credentials,
    admin_users: &[String],
) -> Result<User, AppError> {
    credentials.validate().map_err(AppError::BadRequest)?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(credentials.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let is_admin = admin_users.iter().any(|name| name == &credentials.username);
    let user_id = uuid::Uuid::now_v7().to_string();
    let user =
        db_users::create_user(pool, &user_id, &credentials.username, &password_hash, is_admin)
            .await?;

    tracing::info!(
        "Created user [username={}, is_admin={}]",
        user.username,
        user.is_admin
    );
    Ok(user)
}

/// 없는 사용자는 `NotFound`, 비밀번호 불일치는 `Unauthorized`.
pub async fn authenticate(pool: &SqlitePool, credentials: &Credentials) -> Result<User, AppError> {
    let user = db_users::find_by_username(pool, &credentials.username)
        .await?
        .ok_or(AppError::NotFound)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(credentials.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid username or password".to_string()))?;

    Ok(user)
}

pub async fn validate_user(
    pool: &SqlitePool,
    credentials: &Credentials,
) -> Result<AccessDetails, AppError> {
    let user = authenticate(pool, credentials).await?;
    Ok(AccessDetails {
        username: user.username,
        is_admin: user.is_admin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn created_user_can_be_validated() {
        let pool = test_pool().await;
        let user = create_user(&pool, &creds("TheBill", "hunter2hunter2"), &[])
            .await
            .unwrap();
        assert!(user.password_hash.starts_with("$argon2id$"));

        let details = validate_user(&pool, &creds("TheBill", "hunter2hunter2"))
            .await
            .unwrap();
        assert_eq!(
            details,
            AccessDetails {
                username: "TheBill".into(),
                is_admin: false
            }
        );
    }

    #[tokio::test]
    async fn admin_list_grants_admin() {
        let pool = test_pool().await;
        let user = create_user(&pool, &creds("root", "hunter2hunter2"), &["root".to_string()])
            .await
            .unwrap();
        assert!(user.is_admin);
    }

    #[tokio::test]
    async fn invalid_credentials_are_bad_request() {
        let pool = test_pool().await;
        let err = create_user(&pool, &creds("ab", "hunter2hunter2"), &[]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let pool = test_pool().await;
        create_user(&pool, &creds("TheBill", "hunter2hunter2"), &[]).await.unwrap();
        let err = create_user(&pool, &creds("TheBill", "another-password"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_differ() {
        let pool = test_pool().await;
        create_user(&pool, &creds("TheBill", "hunter2hunter2"), &[]).await.unwrap();

        assert!(matches!(
            validate_user(&pool, &creds("Nobody", "hunter2hunter2")).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            validate_user(&pool, &creds("TheBill", "wrong-password")).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
