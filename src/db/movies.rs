//! # 영화 저장소 (SQLite)
//!
//! `movies` 테이블에 대한 `Repository<Movie>` 구현입니다.
//! `genres`는 JSON 배열 문자열(`["Action","Crime"]`)로 저장하고,
//! 읽을 때는 `#[sqlx(json)]`가 `Vec<String>`으로 되돌려 줍니다.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::SqlitePool;

use super::{map_unique_violation, Repository};
use crate::error::AppError;
use crate::models::Movie;

const MOVIE_COLUMNS: &str = r#"
    id, tmdb_id, imdb_id, title, original_title, original_language, overview, genres,
    rating, vote_count, runtime, release_date, poster_path, backdrop_path, dir_path,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct SqliteMovieRepository {
    pool: SqlitePool,
}

impl SqliteMovieRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Movie> for SqliteMovieRepository {
    async fn find_by_natural_key(&self, title: &str) -> Result<Option<Movie>, AppError> {
        let movie = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE title = ?"
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movie)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Movie>, AppError> {
        let movie = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movie)
    }

    async fn insert(&self, movie: &Movie) -> Result<String, AppError> {
        sqlx::query(
            r#"
            INSERT INTO movies (
                id, tmdb_id, imdb_id, title, original_title, original_language, overview,
                genres, rating, vote_count, runtime, release_date, poster_path, backdrop_path,
                dir_path
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&movie.id)
        .bind(movie.tmdb_id)
        .bind(&movie.imdb_id)
        .bind(&movie.title)
        .bind(&movie.original_title)
        .bind(&movie.original_language)
        .bind(&movie.overview)
        .bind(Json(&movie.genres))
        .bind(movie.rating)
        .bind(movie.vote_count)
        .bind(movie.runtime)
        .bind(&movie.release_date)
        .bind(&movie.poster_path)
        .bind(&movie.backdrop_path)
        .bind(&movie.dir_path)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("Movie {} already exists", movie.title)))?;

        Ok(movie.id.clone())
    }

    async fn update(&self, movie: &Movie) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE movies SET
                tmdb_id = ?, imdb_id = ?, title = ?, original_title = ?, original_language = ?,
                overview = ?, genres = ?, rating = ?, vote_count = ?, runtime = ?,
                release_date = ?, poster_path = ?, backdrop_path = ?, dir_path = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(movie.tmdb_id)
        .bind(&movie.imdb_id)
        .bind(&movie.title)
        .bind(&movie.original_title)
        .bind(&movie.original_language)
        .bind(&movie.overview)
        .bind(Json(&movie.genres))
        .bind(movie.rating)
        .bind(movie.vote_count)
        .bind(movie.runtime)
        .bind(&movie.release_date)
        .bind(&movie.poster_path)
        .bind(&movie.backdrop_path)
        .bind(&movie.dir_path)
        .bind(&movie.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("Movie {} already exists", movie.title)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Movie>, AppError> {
        let movies = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY title"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(movies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn heat(id: &str) -> Movie {
        Movie {
            id: id.into(),
            tmdb_id: 949,
            imdb_id: "tt0113277".into(),
            title: "Heat".into(),
            original_title: "Heat".into(),
            original_language: "en".into(),
            overview: "Obsessive master thief...".into(),
            genres: vec!["Action".into(), "Crime".into()],
            rating: 7.9,
            vote_count: 420,
            runtime: 170,
            release_date: "1995-12-15".into(),
            poster_path: "/heat.jpg".into(),
            backdrop_path: String::new(),
            dir_path: "/media/movies/Heat.1995.mkv".into(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[tokio::test]
    async fn insert_and_find_round_trips_genres() {
        let repo = SqliteMovieRepository::new(test_pool().await);
        let id = repo.insert(&heat("m1")).await.unwrap();
        assert_eq!(id, "m1");

        let stored = repo.find_by_natural_key("Heat").await.unwrap().unwrap();
        assert_eq!(stored.genres, vec!["Action", "Crime"]);
        assert_eq!(stored.runtime, 170);
        assert!(!stored.created_at.is_empty());
        assert_eq!(repo.find_by_id("m1").await.unwrap().unwrap().title, "Heat");
    }

    #[tokio::test]
    async fn duplicate_title_is_conflict() {
        let repo = SqliteMovieRepository::new(test_pool().await);
        repo.insert(&heat("m1")).await.unwrap();

        let err = repo.insert(&heat("m2")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_keeps_id() {
        let repo = SqliteMovieRepository::new(test_pool().await);
        repo.insert(&heat("m1")).await.unwrap();

        let mut changed = heat("m1");
        changed.dir_path = "/media/movies/Heat.mkv".into();
        repo.update(&changed).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "m1");
        assert_eq!(all[0].dir_path, "/media/movies/Heat.mkv");
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let repo = SqliteMovieRepository::new(test_pool().await);
        let err = repo.update(&heat("missing")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
