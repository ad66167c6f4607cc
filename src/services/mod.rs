//! # 서비스 계층
//!
//! 라우트 핸들러와 저장소 사이의 비즈니스 로직입니다.
//! - `scanner`, `title`, `metadata`, `reconcile`: 미디어 카탈로그 재조정
//! - `episodes`: 저장된 TV 쇼 디렉토리의 시즌/에피소드 목록
//! - `users`, `tokens`: 계정과 JWT 토큰

pub mod episodes;
pub mod metadata;
pub mod reconcile;
pub mod scanner;
pub mod title;
pub mod tokens;
pub mod users;
