//! # 재조정(Reconciliation) 서비스
//!
//! 설정된 미디어 디렉토리를 스캔하고, 각 항목의 제목으로 외부 메타데이터를
//! 조회한 뒤 자연 키 기준으로 저장소에 삽입하거나 갱신합니다.
//!
//! ## 처리 흐름
//! 1. 루트마다 스캔. 실패하면 `errors[루트]`에 기록하고 다음 루트로
//! 2. 경로마다 제목 정규화. 실패하면 `errors[경로]`
//! 3. 남은 항목마다 tokio 태스크 생성 (세마포어로 동시 실행 수 제한)
//!    - 제목으로 id 검색. 실패하면 `errors[제목]`
//!    - id로 상세 조회 후 레코드 생성. 실패하면 `errors[경로]`
//!    - upsert. 저장소 접근은 실행 단위 뮤텍스로 직렬화
//! 4. 각 태스크는 결과를 mpsc 채널로 보내고, 수집 태스크만 결과 맵을 소유합니다.
//!
//! 실행 전체는 실패하지 않습니다. 앞에서 저장된 항목은 뒤의 실패와 무관하게 남습니다.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinHandle;

use crate::db::Repository;
use crate::error::AppError;
use crate::models::{MediaRecord, Movie, ReconciliationReport, TvShow};
use crate::services::metadata::{MetadataError, TmdbClient, TvMazeClient};
use crate::services::scanner::{list_entries, normalize_root, ScanFilter};
use crate::services::title::{self, TitleError};

/// 영화와 TV 쇼 재조정의 차이를 감추는 트레이트
#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    type Item: MediaRecord;

    /// 로그에 쓰는 이름 ("movie", "tv show")
    fn kind(&self) -> &'static str;

    fn roots(&self) -> &[PathBuf];

    fn scan_filter(&self) -> ScanFilter;

    fn normalize(&self, path: &str) -> Result<String, TitleError>;

    async fn resolve_id(&self, title: &str, language: &str) -> Result<i64, MetadataError>;

    async fn fetch_record(
        &self,
        id: i64,
        language: &str,
        path: &str,
    ) -> Result<Self::Item, MetadataError>;

    fn repository(&self) -> Arc<dyn Repository<Self::Item>>;
}

/// TMDb에서 영화 정보를 가져오는 카탈로그
pub struct MovieCatalog {
    tmdb: TmdbClient,
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    repo: Arc<dyn Repository<Movie>>,
}

impl MovieCatalog {
    pub fn new(
        tmdb: TmdbClient,
        roots: Vec<PathBuf>,
        extensions: Vec<String>,
        repo: Arc<dyn Repository<Movie>>,
    ) -> Self {
        Self {
            tmdb,
            roots,
            extensions,
            repo,
        }
    }
}

#[async_trait]
impl Catalog for MovieCatalog {
    type Item = Movie;

    fn kind(&self) -> &'static str {
        "movie"
    }

    fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn scan_filter(&self) -> ScanFilter {
        ScanFilter::Extensions(self.extensions.clone())
    }

    fn normalize(&self, path: &str) -> Result<String, TitleError> {
        title::movie_title(path)
    }

    async fn resolve_id(&self, title: &str, language: &str) -> Result<i64, MetadataError> {
        Ok(self.tmdb.search_by_title(title, language).await?.id)
    }

    async fn fetch_record(&self, id: i64, language: &str, path: &str) -> Result<Movie, MetadataError> {
        let detail = self.tmdb.fetch_by_id(id, language).await?;
        if detail.title.trim().is_empty() {
            return Err(MetadataError::Decode(format!("TMDb movie {id} has no title")));
        }

        Ok(Movie {
            id: String::new(),
            tmdb_id: detail.id,
            imdb_id: detail.imdb_id.unwrap_or_default(),
            title: detail.title,
            original_title: detail.original_title.unwrap_or_default(),
            original_language: detail.original_language.unwrap_or_default(),
            overview: detail.overview.unwrap_or_default(),
            genres: detail.genres.into_iter().map(|g| g.name).collect(),
            rating: detail.vote_average.unwrap_or_default(),
            vote_count: detail.vote_count.unwrap_or_default(),
            runtime: detail.runtime.unwrap_or_default(),
            release_date: detail.release_date.unwrap_or_default(),
            poster_path: detail.poster_path.unwrap_or_default(),
            backdrop_path: detail.backdrop_path.unwrap_or_default(),
            dir_path: path.to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        })
    }

    fn repository(&self) -> Arc<dyn Repository<Movie>> {
        self.repo.clone()
    }
}

/// TVmaze에서 TV 쇼 정보를 가져오는 카탈로그. TVmaze는 언어 파라미터가 없습니다.
pub struct ShowCatalog {
    tvmaze: TvMazeClient,
    roots: Vec<PathBuf>,
    repo: Arc<dyn Repository<TvShow>>,
}

impl ShowCatalog {
    pub fn new(tvmaze: TvMazeClient, roots: Vec<PathBuf>, repo: Arc<dyn Repository<TvShow>>) -> Self {
        Self {
            tvmaze,
            roots,
            repo,
        }
    }
}

#[async_trait]
impl Catalog for ShowCatalog {
    type Item = TvShow;

    fn kind(&self) -> &'static str {
        "tv show"
    }

    fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn scan_filter(&self) -> ScanFilter {
        ScanFilter::Directories
    }

    fn normalize(&self, path: &str) -> Result<String, TitleError> {
        title::show_name(path)
    }

    async fn resolve_id(&self, name: &str, _language: &str) -> Result<i64, MetadataError> {
        Ok(self.tvmaze.search_by_title(name).await?.id)
    }

    async fn fetch_record(&self, id: i64, _language: &str, path: &str) -> Result<TvShow, MetadataError> {
        let show = self.tvmaze.fetch_by_id(id).await?;
        if show.name.trim().is_empty() {
            return Err(MetadataError::Decode(format!("TVmaze show {id} has no name")));
        }

        let rating = show.rating_average();
        let poster_url = show.poster_url().unwrap_or_default();
        Ok(TvShow {
            id: String::new(),
            tvmaze_id: show.id,
            name: show.name,
            language: show.language.unwrap_or_default(),
            genres: show.genres,
            runtime: show.runtime.unwrap_or_default(),
            premiered: show.premiered.unwrap_or_default(),
            rating,
            poster_url,
            summary: show.summary.unwrap_or_default(),
            dir_path: path.to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        })
    }

    fn repository(&self) -> Arc<dyn Repository<TvShow>> {
        self.repo.clone()
    }
}

#[derive(Debug)]
enum Outcome {
    Saved { path: String, title: String },
    Failed { key: String, message: String },
}

impl Outcome {
    fn failed(key: impl Into<String>, error: impl ToString) -> Self {
        Outcome::Failed {
            key: key.into(),
            message: error.to_string(),
        }
    }
}

struct Candidate {
    path: String,
    title: String,
}

pub struct Reconciler<C> {
    catalog: Arc<C>,
    max_concurrent: usize,
}

impl<C> Clone for Reconciler<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            max_concurrent: self.max_concurrent,
        }
    }
}

impl<C: Catalog> Reconciler<C> {
    pub fn new(catalog: C, max_concurrent: usize) -> Self {
        Self {
            catalog: Arc::new(catalog),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 모든 루트를 재조정하고 경로별 결과를 돌려줍니다.
    pub async fn reconcile_all(&self, language: &str) -> ReconciliationReport {
        let kind = self.catalog.kind();
        let mut report = ReconciliationReport::default();

        let candidates = self.collect_candidates(&mut report).await;
        tracing::info!(
            "Reconciling {} {} candidates [language={}]",
            candidates.len(),
            kind,
            language
        );

        // 수집 태스크가 report를 넘겨받아 끝까지 혼자 소유합니다.
        let (tx, rx) = mpsc::channel::<Outcome>(64);
        let collector = tokio::spawn(collect(rx, report));

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let upsert_lock = Arc::new(Mutex::new(()));
        let mut handles: Vec<(String, JoinHandle<()>)> = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    let _ = tx.send(Outcome::failed(candidate.path, e)).await;
                    continue;
                }
            };

            let path = candidate.path.clone();
            let catalog = self.catalog.clone();
            let upsert_lock = upsert_lock.clone();
            let language = language.to_string();
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                let outcome = process(catalog.as_ref(), &upsert_lock, candidate, &language).await;
                drop(permit);
                let _ = tx.send(outcome).await;
            });
            handles.push((path, handle));
        }

        for (path, handle) in handles {
            if let Err(e) = handle.await {
                tracing::error!("{} task for {} did not finish: {}", kind, path, e);
                let _ = tx
                    .send(Outcome::failed(path, format!("task failed: {e}")))
                    .await;
            }
        }
        drop(tx);

        match collector.await {
            Ok(report) => {
                tracing::info!(
                    "Finished {} reconciliation: {} updated, {} errors",
                    kind,
                    report.updated.len(),
                    report.errors.len()
                );
                report
            }
            Err(e) => {
                tracing::error!("{} result collector failed: {}", kind, e);
                let mut report = ReconciliationReport::default();
                report.record_error("collector", e);
                report
            }
        }
    }

    /// 스캔과 정규화 단계. 실패한 루트/경로는 report에 기록하고 건너뜁니다.
    async fn collect_candidates(&self, report: &mut ReconciliationReport) -> Vec<Candidate> {
        let filter = self.catalog.scan_filter();
        let mut candidates = Vec::new();

        for root in self.catalog.roots() {
            let entries = match list_entries(root, &filter).await {
                Ok(entries) => entries,
                Err(e) => {
                    let root = normalize_root(root);
                    tracing::warn!("Skipping {} root {}: {}", self.catalog.kind(), root.display(), e);
                    report.record_error(root.to_string_lossy(), e);
                    continue;
                }
            };

            for entry in entries {
                let path = entry.to_string_lossy().to_string();
                match self.catalog.normalize(&path) {
                    Ok(title) => candidates.push(Candidate { path, title }),
                    Err(e) => {
                        tracing::debug!("Unable to derive a title from {}: {}", path, e);
                        report.record_error(path, e);
                    }
                }
            }
        }
        candidates
    }
}

async fn collect(mut rx: mpsc::Receiver<Outcome>, mut report: ReconciliationReport) -> ReconciliationReport {
    while let Some(outcome) = rx.recv().await {
        match outcome {
            Outcome::Saved { path, title } => report.record_success(path, title),
            Outcome::Failed { key, message } => report.record_error(key, message),
        }
    }
    report
}

async fn process<C: Catalog>(
    catalog: &C,
    upsert_lock: &Mutex<()>,
    candidate: Candidate,
    language: &str,
) -> Outcome {
    let Candidate { path, title } = candidate;

    let id = match catalog.resolve_id(&title, language).await {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!("Unable to find {} [title={}]: {}", catalog.kind(), title, e);
            return Outcome::failed(title, e);
        }
    };

    let record = match catalog.fetch_record(id, language, &path).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!(
                "Unable to get {} details [id={}, language={}]: {}",
                catalog.kind(),
                id,
                language,
                e
            );
            return Outcome::failed(path, e);
        }
    };

    let repo = catalog.repository();
    match upsert(repo.as_ref(), upsert_lock, record, catalog.kind()).await {
        Ok(stored) => Outcome::Saved {
            path,
            title: stored.natural_key().to_string(),
        },
        Err(e) => Outcome::failed(path, e),
    }
}

/// 자연 키로 찾아서 없으면 새 id로 삽입, 있으면 기존 id를 유지하고 갱신합니다.
async fn upsert<T: MediaRecord>(
    repo: &dyn Repository<T>,
    upsert_lock: &Mutex<()>,
    mut record: T,
    kind: &str,
) -> Result<T, AppError> {
    let _guard = upsert_lock.lock().await;

    match repo.find_by_natural_key(record.natural_key()).await? {
        Some(existing) => {
            record.set_id(existing.id().to_string());
            repo.update(&record).await?;
            tracing::info!("Successfully updated {} [{}]", kind, record.natural_key());
        }
        None => {
            record.set_id(uuid::Uuid::now_v7().to_string());
            repo.insert(&record).await?;
            tracing::info!("Successfully saved new {} [{}]", kind, record.natural_key());
        }
    }
    Ok(record)
}
