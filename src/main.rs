//! # xmedia 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 설정 로딩 (환경변수 또는 `CONFIG_FILE`)
//! 4. SQLite 연결 풀 생성과 마이그레이션
//! 5. 메타데이터 클라이언트(TMDb, TVmaze)와 카탈로그 재조정 서비스 생성
//! 6. API 라우터 설정 후 HTTP 서버 시작

// ── 모듈 선언 ──
mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use anyhow::Result;
use config::Config;
use db::{Repository, SqliteMovieRepository, SqliteShowRepository};
use models::{Movie, TvShow};
use routes::AppState;
use services::metadata::{HttpTransport, ReqwestTransport, TmdbClient, TvMazeClient};
use services::reconcile::{MovieCatalog, Reconciler, ShowCatalog};
use services::tokens::TokenSecrets;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG로 레벨을 제어하고, LOG_FORMAT=json이면 한 줄짜리 JSON 로그를 출력합니다.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "xmedia=debug,tower_http=debug,axum=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // ── 3단계: 설정 로딩 ──
    let config = Config::load()?;
    tracing::info!("Starting xmedia server on {}:{}", config.host, config.port);
    if config.tmdb_api_key.is_empty() {
        tracing::warn!("TMDB_API_KEY is not set; movie lookups will be rejected by TMDb");
    }

    // ── 4단계: SQLite 연결 풀 생성 ──
    // 데이터베이스 파일이 없으면 새로 만듭니다.
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(connect_options)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 5단계: 메타데이터 클라이언트와 재조정 서비스 ──
    // 두 클라이언트가 같은 reqwest 커넥션 풀을 공유합니다.
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(Duration::from_secs(
        config.http_timeout_secs,
    ))?);
    let tmdb = TmdbClient::new(transport.clone(), &config.tmdb_base_url, &config.tmdb_api_key);
    let tvmaze = TvMazeClient::new(transport, &config.tvmaze_base_url);

    let movie_repo: Arc<dyn Repository<Movie>> = Arc::new(SqliteMovieRepository::new(pool.clone()));
    let show_repo: Arc<dyn Repository<TvShow>> = Arc::new(SqliteShowRepository::new(pool.clone()));

    let movies = Reconciler::new(
        MovieCatalog::new(
            tmdb,
            config.movie_directories.clone(),
            config.movie_extensions.clone(),
            movie_repo.clone(),
        ),
        config.max_concurrent_lookups,
    );
    let shows = Reconciler::new(
        ShowCatalog::new(tvmaze, config.tvshow_directories.clone(), show_repo.clone()),
        config.max_concurrent_lookups,
    );
    tracing::info!(
        "Watching {} movie and {} tv show directories",
        config.movie_directories.len(),
        config.tvshow_directories.len()
    );

    // ── 6단계: 애플리케이션 상태(State)와 라우터 ──
    let state = AppState {
        pool,
        secrets: TokenSecrets {
            access: config.access_secret.clone(),
            refresh: config.refresh_secret.clone(),
        },
        admin_users: Arc::new(config.admin_users.clone()),
        episode_extensions: Arc::new(config.episode_extensions.clone()),
        movies,
        shows,
        movie_repo,
        show_repo,
    };
    let app = routes::router(state);

    // ── 7단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
