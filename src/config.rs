//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수 또는 JSON 설정 파일에서 서버 설정값을 읽어옵니다.
//! 설정은 `main()`에서 한 번 만들어진 뒤 `AppState`와 각 서비스 생성자로
//! 전달됩니다. 전역(global) 설정 변수는 없습니다.
//!
//! 설정 항목 (환경변수 이름):
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `ACCESS_SECRET` / `REFRESH_SECRET`: access / refresh 토큰 서명 키 (필수,
//!   둘 다 없으면 `JWT_SECRET` 하나로 대체)
//! - `HOST`, `PORT`: 서버 바인딩 주소
//! - `TMDB_API_KEY`, `TMDB_BASE_URL`, `TVMAZE_BASE_URL`: 메타데이터 API
//! - `MOVIE_DIRECTORIES`, `TVSHOW_DIRECTORIES`: 스캔할 루트 디렉토리 목록
//!   (쉼표 또는 콜론으로 구분)
//! - `MOVIE_EXTENSIONS`: 영화 파일 확장자 목록 (기본값 `.mp4,.mkv`)
//! - `EPISODE_EXTENSIONS`: 에피소드 목록에 포함할 확장자 (기본값 `.mp4,.mkv`)
//! - `MAX_CONCURRENT_LOOKUPS`: 재조정 시 동시에 실행할 작업 수 (기본값 8)
//! - `HTTP_TIMEOUT_SECS`: 외부 API 요청 타임아웃 (기본값 10초)
//! - `ADMIN_USERS`: 가입 시 관리자 권한을 받을 사용자 이름 목록
//!
//! `CONFIG_FILE` 환경변수가 있으면 같은 항목을 JSON 파일에서 읽습니다.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 설정 로딩 실패 원인
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 애플리케이션 전체 설정을 담는 구조체
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/xmedia.db")
    pub database_url: String,
    /// access 토큰 서명/검증 키
    pub access_secret: String,
    /// refresh 토큰 서명/검증 키
    pub refresh_secret: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tmdb_api_key: String,
    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,
    #[serde(default = "default_tvmaze_base_url")]
    pub tvmaze_base_url: String,
    /// 영화 파일을 찾을 루트 디렉토리들
    #[serde(default)]
    pub movie_directories: Vec<PathBuf>,
    /// TV 쇼 폴더들이 들어 있는 루트 디렉토리들
    #[serde(default)]
    pub tvshow_directories: Vec<PathBuf>,
    #[serde(default = "default_video_extensions")]
    pub movie_extensions: Vec<String>,
    /// 시즌 디렉토리에서 에피소드로 인정할 확장자
    #[serde(default = "default_video_extensions")]
    pub episode_extensions: Vec<String>,
    /// 재조정(reconcile) 작업의 동시 실행 상한
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// 이 이름으로 가입하면 `is_admin = true`
    #[serde(default)]
    pub admin_users: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tvmaze_base_url() -> String {
    "https://api.tvmaze.com".to_string()
}

fn default_video_extensions() -> Vec<String> {
    vec![".mp4".to_string(), ".mkv".to_string()]
}

fn default_max_concurrent_lookups() -> usize {
    8
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl Config {
    /// `CONFIG_FILE`이 있으면 파일에서, 없으면 환경변수에서 설정을 읽습니다.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var("CONFIG_FILE") {
            Ok(path) => Self::from_file(path),
            Err(_) => Self::from_env(),
        }
    }

    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 서명 키는 필수입니다. 숫자 항목이 숫자가 아니면
    /// `ConfigError::Invalid`를 반환합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET").ok();
        let access_secret = env::var("ACCESS_SECRET")
            .ok()
            .or_else(|| jwt_secret.clone())
            .ok_or(ConfigError::Missing("ACCESS_SECRET"))?;
        let refresh_secret = env::var("REFRESH_SECRET")
            .ok()
            .or(jwt_secret)
            .ok_or(ConfigError::Missing("REFRESH_SECRET"))?;

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            access_secret,
            refresh_secret,
            host: env::var("HOST").unwrap_or_else(|_| default_host()),
            port: parse_var("PORT", default_port())?,
            tmdb_api_key: env::var("TMDB_API_KEY").unwrap_or_default(),
            tmdb_base_url: env::var("TMDB_BASE_URL").unwrap_or_else(|_| default_tmdb_base_url()),
            tvmaze_base_url: env::var("TVMAZE_BASE_URL")
                .unwrap_or_else(|_| default_tvmaze_base_url()),
            movie_directories: env::var("MOVIE_DIRECTORIES")
                .map(|v| split_list(&v).into_iter().map(PathBuf::from).collect())
                .unwrap_or_default(),
            tvshow_directories: env::var("TVSHOW_DIRECTORIES")
                .map(|v| split_list(&v).into_iter().map(PathBuf::from).collect())
                .unwrap_or_default(),
            movie_extensions: env::var("MOVIE_EXTENSIONS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| default_video_extensions()),
            episode_extensions: env::var("EPISODE_EXTENSIONS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| default_video_extensions()),
            max_concurrent_lookups: parse_var(
                "MAX_CONCURRENT_LOOKUPS",
                default_max_concurrent_lookups(),
            )?,
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", default_http_timeout_secs())?,
            admin_users: env::var("ADMIN_USERS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
        };

        config.validated()
    }

    /// JSON 설정 파일에서 설정을 읽습니다.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.access_secret.is_empty() {
            return Err(ConfigError::Missing("ACCESS_SECRET"));
        }
        if self.refresh_secret.is_empty() {
            return Err(ConfigError::Missing("REFRESH_SECRET"));
        }
        if self.max_concurrent_lookups == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_CONCURRENT_LOOKUPS",
                value: "0".to_string(),
            });
        }
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

/// "a, b:c" → ["a", "b", "c"]
fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', ':'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
