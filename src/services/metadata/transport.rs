//! # HTTP 전송 계층
//!
//! TMDb/TVmaze 클라이언트는 `HttpTransport` 트레이트만 알고, 실제 요청은
//! `ReqwestTransport`가 보냅니다. 응답 본문은 상태 코드와 함께 문자열로 넘겨주고,
//! 상태 코드 검사와 JSON 디코딩은 각 클라이언트(`decode_ok`)가 합니다.

use async_trait::async_trait;
use std::time::Duration;

use super::MetadataError;

/// 외부 GET 요청 한 번의 상태 코드와 본문 전체
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// 메타데이터 클라이언트가 쓰는 HTTP 추상화. 테스트에서는 가짜 구현으로 바꿉니다.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, MetadataError>;
}

/// `reqwest` 기반 실제 전송 계층
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("xmedia/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MetadataError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, MetadataError> {
        // without_url(): TMDb API 키가 쿼리 문자열에 들어 있으므로 로그에 URL을 남기지 않음
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MetadataError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| MetadataError::Transport(e.without_url().to_string()))?;

        Ok(TransportResponse { status, body })
    }
}
