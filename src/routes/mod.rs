//! # 라우트 핸들러 모듈
//!
//! 각 하위 모듈:
//! - `auth`: 토큰 발급, 검증, 갱신, 로그아웃
//! - `users`: 계정 생성, 자격 증명 확인
//! - `movies`: 영화 카탈로그 (재조정, 조회)
//! - `tvshows`: TV 쇼 카탈로그 (재조정, 조회, 에피소드 목록)
//! - `health`: 서버 상태 확인 (헬스체크)
//!
//! 모든 경로는 `/api/v1` 아래에 붙습니다.

pub mod auth;
pub mod health;
pub mod movies;
pub mod tvshows;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::Repository;
use crate::models::{Movie, TvShow};
use crate::services::reconcile::{MovieCatalog, Reconciler, ShowCatalog};
use crate::services::tokens::TokenSecrets;

/// 모든 핸들러가 공유하는 상태. 복제해도 내부 자원(풀, Arc)은 공유됩니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub secrets: TokenSecrets,
    /// 가입 시 관리자가 되는 사용자 이름
    pub admin_users: Arc<Vec<String>>,
    /// 에피소드 목록에 포함할 파일 확장자
    pub episode_extensions: Arc<Vec<String>>,
    pub movies: Reconciler<MovieCatalog>,
    pub shows: Reconciler<ShowCatalog>,
    pub movie_repo: Arc<dyn Repository<Movie>>,
    pub show_repo: Arc<dyn Repository<TvShow>>,
}

/// `/api/v1` 아래에 모든 엔드포인트를 붙인 라우터
pub fn router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/user/create", post(users::create_user))
        .route("/user/validate", post(users::validate_user));

    let auth_routes = Router::new()
        .route("/auth/token/generate", post(auth::generate_tokens))
        .route("/auth/token/validate", post(auth::validate_token))
        .route("/auth/token/refresh", post(auth::refresh_tokens))
        .route("/auth/logout", post(auth::logout));

    let api_routes = Router::new()
        .merge(user_routes)
        .merge(auth_routes)
        .route("/movies/update/all", post(movies::update_all_movies))
        .route("/movies/all", get(movies::list_movies))
        .route("/movies/{id}", get(movies::get_movie))
        .route("/tvshows/update/all", post(tvshows::update_all_shows))
        .route("/tvshows/all", get(tvshows::list_shows))
        .route("/tvshows/get", post(tvshows::get_show_by_name))
        .route("/tvshows/{id}", get(tvshows::get_show))
        .route("/tvshows/{id}/episodes", get(tvshows::list_episodes))
        .route("/health", get(health::health_check))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, SqliteMovieRepository, SqliteShowRepository};
    use crate::services::metadata::{fake::FakeTransport, TmdbClient, TvMazeClient};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt;

    const HEAT_SEARCH: &str = r#"{"results": [{"id": 949, "title": "Heat"}]}"#;
    const HEAT_DETAIL: &str = r#"{"id": 949, "title": "Heat", "genres": [{"id": 80, "name": "Crime"}], "runtime": 170}"#;

    const OFFICE_SEARCH: &str = r#"[{"score": 1.0, "show": {"id": 526, "name": "The Office"}}]"#;
    const OFFICE_DETAIL: &str = r#"{"id": 526, "name": "The Office", "genres": ["Comedy"]}"#;

    async fn test_app(movie_root: Option<PathBuf>) -> Router {
        app_with_roots(movie_root, None).await
    }

    async fn app_with_roots(movie_root: Option<PathBuf>, show_root: Option<PathBuf>) -> Router {
        let pool = test_pool().await;
        let transport = Arc::new(
            FakeTransport::new()
                .route("/search/movie", 200, HEAT_SEARCH)
                .route("/movie/949", 200, HEAT_DETAIL)
                .route("/search/shows", 200, OFFICE_SEARCH)
                .route("/shows/526", 200, OFFICE_DETAIL),
        );
        let movie_repo: Arc<dyn Repository<Movie>> = Arc::new(SqliteMovieRepository::new(pool.clone()));
        let show_repo: Arc<dyn Repository<TvShow>> = Arc::new(SqliteShowRepository::new(pool.clone()));

        let movies = MovieCatalog::new(
            TmdbClient::new(transport.clone(), "https://tmdb.test/3", "key"),
            movie_root.into_iter().collect(),
            vec![".mkv".into()],
            movie_repo.clone(),
        );
        let shows = ShowCatalog::new(
            TvMazeClient::new(transport, "https://api.tvmaze.test"),
            show_root.into_iter().collect(),
            show_repo.clone(),
        );

        router(AppState {
            pool,
            secrets: TokenSecrets {
                access: "access".into(),
                refresh: "refresh".into(),
            },
            admin_users: Arc::new(vec!["root".into()]),
            episode_extensions: Arc::new(vec![".mkv".into(), ".mp4".into()]),
            movies: Reconciler::new(movies, 2),
            shows: Reconciler::new(shows, 2),
            movie_repo,
            show_repo,
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn signup_and_login(app: &Router, username: &str) -> Value {
        let creds = json!({ "username": username, "password": "hunter2hunter2" });
        let (status, _) = send(app, post_json("/api/v1/user/create", creds.clone(), None)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, pair) = send(app, post_json("/api/v1/auth/token/generate", creds, None)).await;
        assert_eq!(status, StatusCode::OK);
        pair
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = test_app(None).await;
        let (status, body) = send(&app, get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn user_create_rejects_bad_input() {
        let app = test_app(None).await;

        let (status, body) = send(
            &app,
            post_json("/api/v1/user/create", json!({ "username": "ab", "password": "x" }), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");

        let (status, _) = send(
            &app,
            post_json("/api/v1/user/create", json!({ "username": "TheBill" }), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_user_is_conflict() {
        let app = test_app(None).await;
        let creds = json!({ "username": "TheBill", "password": "hunter2hunter2" });
        send(&app, post_json("/api/v1/user/create", creds.clone(), None)).await;

        let (status, _) = send(&app, post_json("/api/v1/user/create", creds, None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn token_lifecycle() {
        let app = test_app(None).await;
        let pair = signup_and_login(&app, "TheBill").await;
        let access = pair["access_token"].as_str().unwrap();
        let refresh = pair["refresh_token"].as_str().unwrap();

        let (status, details) = send(
            &app,
            post_json("/api/v1/auth/token/validate", json!({ "token": access }), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(details, json!({ "username": "TheBill", "is_admin": false }));

        let (status, _) = send(
            &app,
            post_json("/api/v1/auth/token/refresh", json!({ "token": refresh }), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            post_json("/api/v1/auth/token/refresh", json!({ "token": refresh }), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = test_app(None).await;
        signup_and_login(&app, "TheBill").await;

        let (status, _) = send(
            &app,
            post_json(
                "/api/v1/auth/token/generate",
                json!({ "username": "TheBill", "password": "wrong-password" }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn reconciliation_requires_admin() {
        let app = test_app(None).await;

        let (status, _) = send(
            &app,
            post_json("/api/v1/movies/update/all", json!({ "language": "en" }), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let pair = signup_and_login(&app, "TheBill").await;
        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/movies/update/all",
                json!({ "language": "en" }),
                pair["access_token"].as_str(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "forbidden");
    }

    #[tokio::test]
    async fn admin_reconciles_and_lists_movies() {
        let dir = tempfile::tempdir().unwrap();
        let heat = dir.path().join("Heat.1995.mkv");
        std::fs::write(&heat, b"").unwrap();
        let app = test_app(Some(dir.path().into())).await;
        let pair = signup_and_login(&app, "root").await;

        let (status, report) = send(
            &app,
            post_json(
                "/api/v1/movies/update/all",
                json!({ "language": "en" }),
                pair["access_token"].as_str(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["errors"], json!({}));
        let heat_key = heat.to_string_lossy().to_string();
        assert_eq!(report["updated_movies"][heat_key.as_str()], "Heat");

        let (status, list) = send(&app, get("/api/v1/movies/all")).await;
        assert_eq!(status, StatusCode::OK);
        let movies = list["movies"].as_array().unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0]["genres"], json!(["Crime"]));

        let id = movies[0]["id"].as_str().unwrap();
        let (status, movie) = send(&app, get(&format!("/api/v1/movies/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(movie["title"], "Heat");
    }

    #[tokio::test]
    async fn reconciled_show_lists_seasons_and_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let show_dir = dir.path().join("The_Office");
        std::fs::create_dir_all(show_dir.join("Season 1")).unwrap();
        std::fs::create_dir_all(show_dir.join("Season 2")).unwrap();
        std::fs::write(show_dir.join("Season 1").join("S01E01.mkv"), b"").unwrap();
        std::fs::write(show_dir.join("Season 1").join("S01E01.srt"), b"").unwrap();
        let app = app_with_roots(None, Some(dir.path().into())).await;
        let pair = signup_and_login(&app, "root").await;

        let (status, report) = send(
            &app,
            post_json("/api/v1/tvshows/update/all", json!({}), pair["access_token"].as_str()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["errors"], json!({}));

        let (_, list) = send(&app, get("/api/v1/tvshows/all")).await;
        let id = list["tv_shows"][0]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get(&format!("/api/v1/tvshows/{id}/episodes"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "name": "The Office",
                "seasons": [
                    { "name": "Season 1", "episodes": ["S01E01.mkv"] },
                    { "name": "Season 2", "episodes": [] }
                ]
            })
        );

        std::fs::remove_dir_all(&show_dir).unwrap();
        let (status, body) = send(&app, get(&format!("/api/v1/tvshows/{id}/episodes"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = test_app(None).await;

        let (status, _) = send(&app, get("/api/v1/movies/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get("/api/v1/tvshows/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get("/api/v1/tvshows/nope/episodes")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            post_json("/api/v1/tvshows/get", json!({ "name": "Lost" }), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_catalogs_list_empty_arrays() {
        let app = test_app(None).await;

        let (_, movies) = send(&app, get("/api/v1/movies/all")).await;
        assert_eq!(movies, json!({ "movies": [] }));

        let (_, shows) = send(&app, get("/api/v1/tvshows/all")).await;
        assert_eq!(shows, json!({ "tv_shows": [] }));
    }
}
