//! # 디렉토리 스캐너
//!
//! 설정된 루트 디렉토리 한 곳의 항목을 나열합니다. 하위 디렉토리로
//! 재귀하지 않습니다.
//!
//! - 영화: 지정한 확장자를 가진 일반 파일만
//! - TV 쇼: 예약된 이름(`sub`, `scripts`)이 아닌 하위 디렉토리만

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 자막/스크립트 폴더 이름. 쇼나 시즌으로 취급하지 않습니다.
pub const RESERVED_DIR_NAMES: &[&str] = &["sub", "scripts"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Directory {0} does not exist")]
    NotFound(String),

    #[error("{0} is not a directory")]
    NotADirectory(String),

    #[error("Unable to read directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// 어떤 항목을 결과에 포함할지 결정하는 필터
#[derive(Debug, Clone)]
pub enum ScanFilter {
    /// 확장자가 일치하는 일반 파일 (대소문자 무시, 앞의 `.`은 생략 가능)
    Extensions(Vec<String>),
    /// 예약 이름이 아닌 하위 디렉토리 (쇼 폴더, 시즌 폴더)
    Directories,
}

impl ScanFilter {
    fn matches(&self, name: &str, is_dir: bool) -> bool {
        match self {
            ScanFilter::Extensions(extensions) => {
                !is_dir && has_extension(name, extensions)
            }
            ScanFilter::Directories => {
                is_dir && !RESERVED_DIR_NAMES.contains(&name)
            }
        }
    }
}

fn has_extension(name: &str, extensions: &[String]) -> bool {
    let lower = name.to_lowercase();
    extensions.iter().any(|ext| {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        !ext.is_empty() && lower.ends_with(&format!(".{ext}"))
    })
}

/// 끝의 경로 구분자를 제거합니다. 루트("/") 자체는 그대로 둡니다.
pub fn normalize_root(root: &Path) -> PathBuf {
    let raw = root.to_string_lossy();
    let trimmed = raw.trim_end_matches(std::path::MAIN_SEPARATOR);
    if trimmed.is_empty() {
        root.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}

/// 루트 디렉토리의 항목 중 필터에 맞는 경로 목록을 반환합니다.
///
/// 숨김 항목(`.`으로 시작)은 건너뜁니다. 결과는 경로 순으로 정렬되지만
/// 호출자는 순서에 의존하면 안 됩니다.
///
/// # 에러
/// - 루트가 없으면 `ScanError::NotFound`
/// - 루트가 파일이면 `ScanError::NotADirectory`
/// - 읽기 실패 시 `ScanError::Io`
pub async fn list_entries(root: &Path, filter: &ScanFilter) -> Result<Vec<PathBuf>, ScanError> {
    let root = normalize_root(root);
    let root_str = root.to_string_lossy().to_string();

    let metadata = match tokio::fs::metadata(&root).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ScanError::NotFound(root_str));
        }
        Err(source) => return Err(ScanError::Io { path: root_str, source }),
    };
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root_str));
    }

    let io_err = |source| ScanError::Io {
        path: root_str.clone(),
        source,
    };

    let mut read_dir = tokio::fs::read_dir(&root).await.map_err(io_err)?;
    let mut entries = Vec::new();

    while let Some(entry) = read_dir.next_entry().await.map_err(io_err)? {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }

        // 심볼릭 링크를 따라가므로 링크된 쇼 폴더도 디렉토리로 셉니다
        let is_dir = match tokio::fs::metadata(entry.path()).await {
            Ok(meta) => meta.is_dir(),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry {}: {}", entry.path().display(), e);
                continue;
            }
        };

        if filter.matches(&name, is_dir) {
            entries.push(entry.path());
        }
    }

    entries.sort();
    tracing::debug!("Found {} entries in {}", entries.len(), root_str);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn video_filter() -> ScanFilter {
        ScanFilter::Extensions(vec![".mkv".to_string(), ".mp4".to_string()])
    }

    #[tokio::test]
    async fn extension_filter_keeps_only_videos() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Heat.1995.mkv"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let files = list_entries(dir.path(), &video_filter()).await.unwrap();
        assert_eq!(files, vec![dir.path().join("Heat.1995.mkv")]);
    }

    #[tokio::test]
    async fn extension_filter_ignores_case_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Alien.1979.MP4"), b"").unwrap();
        fs::create_dir(dir.path().join("Fake.mkv")).unwrap();

        let files = list_entries(dir.path(), &video_filter()).await.unwrap();
        assert_eq!(files, vec![dir.path().join("Alien.1979.MP4")]);
    }

    #[tokio::test]
    async fn hidden_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"").unwrap();
        fs::write(dir.path().join(".b.mp4"), b"").unwrap();
        fs::create_dir(dir.path().join(".trash")).unwrap();
        fs::create_dir(dir.path().join("Season 1")).unwrap();

        let files = list_entries(dir.path(), &video_filter()).await.unwrap();
        assert_eq!(files, vec![dir.path().join("a.mp4")]);

        let dirs = list_entries(dir.path(), &ScanFilter::Directories).await.unwrap();
        assert_eq!(dirs, vec![dir.path().join("Season 1")]);
    }

    #[tokio::test]
    async fn errors_name_the_normalized_root() {
        let dir = tempfile::tempdir().unwrap();
        let with_slash = PathBuf::from(format!("{}/", dir.path().display()));

        let err = list_entries(&with_slash.join("missing/"), &video_filter())
            .await
            .unwrap_err();
        let expected = dir.path().join("missing").to_string_lossy().to_string();
        assert_eq!(err.to_string(), format!("Directory {expected} does not exist"));
    }

    #[tokio::test]
    async fn show_filter_skips_files_and_reserved_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("The_Office")).unwrap();
        fs::create_dir(dir.path().join("Breaking.Bad")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::create_dir(dir.path().join("scripts")).unwrap();
        fs::write(dir.path().join("readme.txt"), b"").unwrap();

        let dirs = list_entries(dir.path(), &ScanFilter::Directories)
            .await
            .unwrap();
        assert_eq!(
            dirs,
            vec![dir.path().join("Breaking.Bad"), dir.path().join("The_Office")]
        );
    }

    #[tokio::test]
    async fn trailing_separator_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Heat.mkv"), b"").unwrap();
        let with_slash = PathBuf::from(format!("{}/", dir.path().display()));

        let files = list_entries(&with_slash, &video_filter()).await.unwrap();
        assert_eq!(files, vec![dir.path().join("Heat.mkv")]);
    }

    #[tokio::test]
    async fn missing_root_is_an_error() {
        let err = list_entries(Path::new("./no-such-dir/"), &ScanFilter::Directories)
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound(_)));
    }

    #[tokio::test]
    async fn file_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("movie.mkv");
        fs::write(&file, b"").unwrap();

        let err = list_entries(&file, &ScanFilter::Directories).await.unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[tokio::test]
    async fn empty_match_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"").unwrap();

        let files = list_entries(dir.path(), &ScanFilter::Extensions(vec![".te".into()]))
            .await
            .unwrap();
        assert!(files.is_empty());
    }
}
