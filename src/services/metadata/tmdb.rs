//! # TMDb 클라이언트
//!
//! - `GET /search/movie?api_key=..&query=..&language=..` → 첫 번째 검색 결과
//! - `GET /movie/{id}?api_key=..&language=..` → 영화 상세 정보

use serde::Deserialize;
use std::sync::Arc;

use super::{build_url, decode_ok, HttpTransport, MetadataError};

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbSearchResult>,
}

/// `/search/movie` 결과 한 건
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResult {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

/// `/movie/{id}` 상세 응답. TMDb는 값이 없을 때 `null`을 주기 때문에 대부분 Option입니다.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

#[derive(Clone)]
pub struct TmdbClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, api_key: &str) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// 제목으로 검색하여 첫 번째 결과를 반환합니다. 결과가 없으면 `NotFound`.
    pub async fn search_by_title(
        &self,
        title: &str,
        lang: &str,
    ) -> Result<TmdbSearchResult, MetadataError> {
        let url = build_url(
            &self.base_url,
            "search/movie",
            &[("api_key", &self.api_key), ("query", title), ("language", lang)],
        )?;

        let response = self.transport.get(url.as_str()).await?;
        let search: TmdbSearchResponse = decode_ok(response)?;

        let first = search.results.into_iter().next().ok_or_else(|| {
            tracing::debug!("TMDb returned no results for [title={}]", title);
            MetadataError::NotFound(title.to_string())
        })?;

        tracing::debug!(
            "TMDb matched [query={}] to [title={}, id={}]",
            title,
            first.title,
            first.id
        );
        Ok(first)
    }

    pub async fn fetch_by_id(&self, id: i64, lang: &str) -> Result<TmdbMovie, MetadataError> {
        let url = build_url(
            &self.base_url,
            &format!("movie/{id}"),
            &[("api_key", &self.api_key), ("language", lang)],
        )?;

        let response = self.transport.get(url.as_str()).await?;
        decode_ok(response)
    }
}
