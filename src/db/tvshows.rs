//! # TV 쇼 저장소 (SQLite)

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::SqlitePool;

use super::{map_unique_violation, Repository};
use crate::error::AppError;
use crate::models::TvShow;

const SHOW_COLUMNS: &str = r#"
    id, tvmaze_id, name, language, genres, runtime, premiered, rating, poster_url, summary,
    dir_path, created_at, updated_at
"#;

/// `tvshows` 테이블에 대한 `Repository<TvShow>` 구현
#[derive(Clone)]
pub struct SqliteShowRepository {
    pool: SqlitePool,
}

impl SqliteShowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<TvShow> for SqliteShowRepository {
    async fn find_by_natural_key(&self, name: &str) -> Result<Option<TvShow>, AppError> {
        let show = sqlx::query_as::<_, TvShow>(&format!(
            "SELECT {SHOW_COLUMNS} FROM tvshows WHERE name = ?"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(show)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TvShow>, AppError> {
        let show = sqlx::query_as::<_, TvShow>(&format!(
            "SELECT {SHOW_COLUMNS} FROM tvshows WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(show)
    }

    async fn insert(&self, show: &TvShow) -> Result<String, AppError> {
        sqlx::query(
            r#"
            INSERT INTO tvshows (
                id, tvmaze_id, name, language, genres, runtime, premiered, rating,
                poster_url, summary, dir_path
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&show.id)
        .bind(show.tvmaze_id)
        .bind(&show.name)
        .bind(&show.language)
        .bind(Json(&show.genres))
        .bind(show.runtime)
        .bind(&show.premiered)
        .bind(show.rating)
        .bind(&show.poster_url)
        .bind(&show.summary)
        .bind(&show.dir_path)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("TV show {} already exists", show.name)))?;

        Ok(show.id.clone())
    }

    async fn update(&self, show: &TvShow) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE tvshows SET
                tvmaze_id = ?, name = ?, language = ?, genres = ?, runtime = ?, premiered = ?,
                rating = ?, poster_url = ?, summary = ?, dir_path = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(show.tvmaze_id)
        .bind(&show.name)
        .bind(&show.language)
        .bind(Json(&show.genres))
        .bind(show.runtime)
        .bind(&show.premiered)
        .bind(show.rating)
        .bind(&show.poster_url)
        .bind(&show.summary)
        .bind(&show.dir_path)
        .bind(&show.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("TV show {} already exists", show.name)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<TvShow>, AppError> {
        let shows = sqlx::query_as::<_, TvShow>(&format!(
            "SELECT {SHOW_COLUMNS} FROM tvshows ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(shows)
    }
}
