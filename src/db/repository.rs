//! # 저장소(Repository) 추상화
//!
//! 재조정 서비스는 어떤 저장소를 쓰는지 알 필요가 없습니다.
//! `Repository<T>` 트레이트만 보고 조회/삽입/수정을 합니다.
//!
//! - 운영: `SqliteMovieRepository`, `SqliteShowRepository` (sqlx)
//! - 테스트: `InMemoryRepository<T>` (`#[cfg(test)]` 전용)
//!
//! "없음"은 에러가 아니라 `Ok(None)`입니다. 재조정 서비스는 이것을 보고 삽입을 결정합니다.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::MediaRecord;

#[async_trait]
pub trait Repository<T: MediaRecord>: Send + Sync {
    /// 자연 키(영화 제목, 쇼 이름)로 조회
    async fn find_by_natural_key(&self, key: &str) -> Result<Option<T>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, AppError>;

    /// 새 레코드를 저장하고 id를 반환합니다. `record.id()`는 이미 채워져 있어야 합니다.
    async fn insert(&self, record: &T) -> Result<String, AppError>;

    /// 같은 id의 레코드를 덮어씁니다.
    async fn update(&self, record: &T) -> Result<(), AppError>;

    async fn find_all(&self) -> Result<Vec<T>, AppError>;
}

#[cfg(test)]
pub use memory::InMemoryRepository;
