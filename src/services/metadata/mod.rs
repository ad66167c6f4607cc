//! # 외부 메타데이터 클라이언트
//!
//! TMDb(영화)와 TVmaze(TV 쇼) API를 호출합니다.
//! 실제 HTTP 호출은 `HttpTransport` 트레이트 뒤에 숨겨져 있어서
//! 테스트에서는 가짜(fake) 전송 계층으로 바꿔 끼울 수 있습니다.
//!
//! ## 에러 구분
//! - `Transport`: 서비스에 닿지 못함 (연결 실패, 타임아웃)
//! - `UnexpectedStatus`: 200이 아닌 응답 (재시도 없음)
//! - `Decode`: 응답은 왔지만 JSON이 기대한 형태가 아님
//! - `NotFound`: 검색 결과가 0건

pub mod tmdb;
pub mod transport;
pub mod tvmaze;

pub use tmdb::TmdbClient;
pub use transport::{HttpTransport, ReqwestTransport, TransportResponse};
pub use tvmaze::TvMazeClient;

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetadataError {
    #[error("Unable to find any results for {0}")]
    NotFound(String),

    #[error("Metadata service unreachable: {0}")]
    Transport(String),

    #[error("Unable to decode metadata response: {0}")]
    Decode(String),

    #[error("Wrong status code; wanted {expected}, got {got}")]
    UnexpectedStatus { expected: u16, got: u16 },
}

/// 200 응답만 받아들이고 본문 전체를 `T`로 디코딩합니다.
pub(crate) fn decode_ok<T: DeserializeOwned>(response: TransportResponse) -> Result<T, MetadataError> {
    if response.status != 200 {
        return Err(MetadataError::UnexpectedStatus {
            expected: 200,
            got: response.status,
        });
    }
    serde_json::from_str(&response.body).map_err(|e| MetadataError::Decode(e.to_string()))
}

pub(crate) fn build_url(
    base_url: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<reqwest::Url, MetadataError> {
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'));
    let parsed = if params.is_empty() {
        reqwest::Url::parse(&raw)
    } else {
        reqwest::Url::parse_with_params(&raw, params)
    };
    parsed.map_err(|e| MetadataError::Transport(format!("invalid url {raw}: {e}")))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_ok_rejects_non_200() {
        let response = TransportResponse {
            status: 401,
            body: "{}".into(),
        };
        let err = decode_ok::<serde_json::Value>(response).unwrap_err();
        assert_eq!(err, MetadataError::UnexpectedStatus { expected: 200, got: 401 });
    }

    #[test]
    fn decode_ok_separates_garbage_from_transport_errors() {
        let response = TransportResponse {
            status: 200,
            body: "<html>".into(),
        };
        let err = decode_ok::<serde_json::Value>(response).unwrap_err();
        assert!(matches!(err, MetadataError::Decode(_)));
    }

    #[test]
    fn build_url_encodes_query() {
        let url = build_url("https://api.tvmaze.com/", "/search/shows", &[("q", "The Office & Co")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.tvmaze.com/search/shows?q=The+Office+%26+Co"
        );
    }
}
