//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 각 하위 모듈:
//! - `repository`: `Repository<T>` 트레이트와 메모리 구현
//! - `movies`: `movies` 테이블 저장소
//! - `tvshows`: `tvshows` 테이블 저장소
//! - `users`: 사용자와 refresh 토큰 쿼리

pub mod movies;
pub mod repository;
pub mod tvshows;
pub mod users;

pub use movies::SqliteMovieRepository;
pub use repository::Repository;
#[cfg(test)]
pub use repository::InMemoryRepository;
pub use tvshows::SqliteShowRepository;

use crate::error::AppError;

/// UNIQUE 제약 위반은 409로, 나머지는 그대로 DB 에러로 바꿉니다.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: String) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::Conflict(message);
        }
    }
    AppError::Database(err)
}

/// 마이그레이션이 적용된 메모리 DB. 연결이 하나뿐이라 모든 쿼리가 같은 데이터를 봅니다.
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}
