//! # TVmaze 클라이언트
//!
//! - `GET /search/shows?q=..` → 첫 번째 검색 결과의 쇼
//! - `GET /shows/{id}` → 쇼 상세 정보
//!
//! API 키와 언어 파라미터가 없습니다. 값이 빠진 필드가 많아서 DTO는 대부분 Option입니다.

use serde::Deserialize;
use std::sync::Arc;

use super::{build_url, decode_ok, HttpTransport, MetadataError};

#[derive(Debug, Clone, Deserialize)]
pub struct TvMazeSearchHit {
    pub show: TvMazeShow,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TvMazeRating {
    #[serde(default)]
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TvMazeImage {
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvMazeShow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub premiered: Option<String>,
    #[serde(default)]
    pub rating: Option<TvMazeRating>,
    #[serde(default)]
    pub image: Option<TvMazeImage>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl TvMazeShow {
    pub fn rating_average(&self) -> f64 {
        self.rating.as_ref().and_then(|r| r.average).unwrap_or_default()
    }

    /// 원본 크기 포스터, 없으면 medium 크기
    pub fn poster_url(&self) -> Option<String> {
        let image = self.image.as_ref()?;
        image.original.clone().or_else(|| image.medium.clone())
    }
}

#[derive(Clone)]
pub struct TvMazeClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl TvMazeClient {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
        }
    }

    pub async fn search_by_title(&self, name: &str) -> Result<TvMazeShow, MetadataError> {
        let url = build_url(&self.base_url, "search/shows", &[("q", name)])?;

        let response = self.transport.get(url.as_str()).await?;
        let hits: Vec<TvMazeSearchHit> = decode_ok(response)?;

        hits.into_iter()
            .next()
            .map(|hit| hit.show)
            .ok_or_else(|| {
                tracing::debug!("TVmaze returned no results for [name={}]", name);
                MetadataError::NotFound(name.to_string())
            })
    }

    pub async fn fetch_by_id(&self, id: i64) -> Result<TvMazeShow, MetadataError> {
        let url = build_url(&self.base_url, &format!("shows/{id}"), &[])?;
        let response = self.transport.get(url.as_str()).await?;
        decode_ok(response)
    }
}
