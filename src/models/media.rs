//! # 미디어 모델 정의
//!
//! 카탈로그에 저장되는 영화(`Movie`)와 TV 쇼(`TvShow`) 구조체입니다.
//! 둘 다 `MediaRecord` 트레이트를 구현하여 재조정(reconcile) 서비스와
//! 저장소(repository)가 같은 코드로 다룰 수 있습니다.
//!
//! ## 식별자
//! - `id`: 저장 시 부여되는 대리 키(surrogate key, UUIDv7)
//! - 자연 키(natural key): 영화는 `title`, TV 쇼는 `name`.
//!   "이미 존재하는가?"는 오직 자연 키로만 판단합니다.

use serde::{Deserialize, Serialize};

/// 재조정 대상이 되는 레코드의 공통 인터페이스
pub trait MediaRecord: Clone + Send + Sync + 'static {
    /// 대리 키 (아직 저장되지 않았으면 빈 문자열)
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    /// 중복 판단 기준이 되는 자연 키
    fn natural_key(&self) -> &str;
}

/// 영화 엔티티: DB의 `movies` 테이블 한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: String,
    pub tmdb_id: i64,
    pub imdb_id: String,
    /// 자연 키 (UNIQUE)
    pub title: String,
    pub original_title: String,
    pub original_language: String,
    /// 줄거리
    pub overview: String,
    /// 장르 이름 목록. DB에는 JSON 배열 문자열로 저장됩니다.
    #[sqlx(json)]
    pub genres: Vec<String>,
    pub rating: f64,
    pub vote_count: i64,
    /// 상영 시간 (분)
    pub runtime: i64,
    pub release_date: String,
    pub poster_path: String,
    pub backdrop_path: String,
    /// 로컬 파일 경로 (예: "/media/movies/Heat.1995.mkv")
    pub dir_path: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl MediaRecord for Movie {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn natural_key(&self) -> &str {
        &self.title
    }
}

/// TV 쇼 엔티티: DB의 `tvshows` 테이블 한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TvShow {
    pub id: String,
    pub tvmaze_id: i64,
    /// 자연 키 (UNIQUE)
    pub name: String,
    pub language: String,
    #[sqlx(json)]
    pub genres: Vec<String>,
    pub runtime: i64,
    /// 첫 방영일 (예: "2005-03-24")
    pub premiered: String,
    pub rating: f64,
    pub poster_url: String,
    /// TVmaze가 돌려주는 HTML 요약문
    pub summary: String,
    /// 쇼 디렉토리 경로 (예: "/media/tv/The_Office")
    pub dir_path: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl MediaRecord for TvShow {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn natural_key(&self) -> &str {
        &self.name
    }
}

/// `POST /movies/update/all`, `POST /tvshows/update/all` 요청 본문
#[derive(Debug, Deserialize)]
pub struct UpdateAllRequest {
    /// 메타데이터 언어 (예: "en", "pl"). 없으면 "en".
    #[serde(default)]
    pub language: Option<String>,
}

/// 시즌 디렉토리 하나와 그 안의 에피소드 파일 이름들
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Season {
    /// 시즌 디렉토리 이름 (예: "Season 1")
    pub name: String,
    pub episodes: Vec<String>,
}

/// `POST /tvshows/get` 요청 본문
#[derive(Debug, Deserialize)]
pub struct ShowNameRequest {
    pub name: String,
}
