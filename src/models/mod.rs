//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `media`: 영화(Movie), TV 쇼(TvShow)와 `MediaRecord` 트레이트
//! - `report`: 재조정(reconcile) 실행 결과
//! - `user`: 사용자, 자격 증명, 토큰 관련 구조체
//!
//! 미디어 모델과 실행 결과는 `pub use X::*;`로 재공개하여 `crate::models::Movie`처럼
//! 짧게 접근합니다. 사용자 관련 구조체는 `crate::models::user::User`처럼 모듈 경로로 씁니다.

pub mod media;
pub mod report;
pub mod user;

pub use media::*;
pub use report::*;
