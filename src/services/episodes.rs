//! # 에피소드 목록
//!
//! 저장된 TV 쇼의 디렉토리(`dir_path`)를 읽어 시즌과 에피소드 파일을 나열합니다.
//! 메타데이터 API는 호출하지 않고 디스크만 봅니다.
//!
//! ```text
//! /media/tv/The_Office/
//! ├── Season 1/
//! │   ├── S01E01.mkv
//! │   └── S01E02.mp4
//! ├── Season 2/
//! └── sub/            ← 예약 이름, 시즌이 아님
//! ```
//!
//! - 시즌: 쇼 디렉토리 바로 아래의 하위 디렉토리 (숨김, `sub`, `scripts` 제외)
//! - 에피소드: 시즌 디렉토리 안에서 확장자가 일치하는 파일의 이름
//! - 에피소드가 없는 시즌도 빈 목록으로 포함됩니다

use std::path::Path;

use crate::models::Season;
use crate::services::scanner::{list_entries, ScanError, ScanFilter};

/// 쇼 디렉토리의 시즌 목록을 이름 순으로 반환합니다.
///
/// # 에러
/// 쇼 디렉토리나 시즌 디렉토리를 읽지 못하면 그대로 `ScanError`를 반환합니다.
pub async fn list_seasons(show_dir: &Path, extensions: &[String]) -> Result<Vec<Season>, ScanError> {
    let season_dirs = list_entries(show_dir, &ScanFilter::Directories).await?;
    let episode_filter = ScanFilter::Extensions(extensions.to_vec());

    let mut seasons = Vec::with_capacity(season_dirs.len());
    for season_dir in season_dirs {
        let episodes = list_entries(&season_dir, &episode_filter)
            .await?
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect();

        seasons.push(Season {
            name: file_name(&season_dir),
            episodes,
        });
    }

    tracing::debug!(
        "Found {} seasons in {}",
        seasons.len(),
        show_dir.display()
    );
    Ok(seasons)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn videos() -> Vec<String> {
        vec![".mkv".to_string(), ".mp4".to_string()]
    }

    #[tokio::test]
    async fn seasons_list_their_video_files() {
        let dir = tempfile::tempdir().unwrap();
        let s1 = dir.path().join("Season 1");
        let s2 = dir.path().join("Season 2");
        fs::create_dir(&s1).unwrap();
        fs::create_dir(&s2).unwrap();
        fs::write(s1.join("S01E02.mp4"), b"").unwrap();
        fs::write(s1.join("S01E01.mkv"), b"").unwrap();
        fs::write(s1.join("S01E01.srt"), b"").unwrap();
        fs::write(s2.join("S02E01.MKV"), b"").unwrap();

        let seasons = list_seasons(dir.path(), &videos()).await.unwrap();

        assert_eq!(
            seasons,
            vec![
                Season {
                    name: "Season 1".into(),
                    episodes: vec!["S01E01.mkv".into(), "S01E02.mp4".into()],
                },
                Season {
                    name: "Season 2".into(),
                    episodes: vec!["S02E01.MKV".into()],
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_season_is_kept_and_loose_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Specials")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("pilot.mkv"), b"").unwrap();

        let seasons = list_seasons(dir.path(), &videos()).await.unwrap();

        assert_eq!(
            seasons,
            vec![Season {
                name: "Specials".into(),
                episodes: vec![],
            }]
        );
    }

    #[tokio::test]
    async fn missing_show_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_seasons(&dir.path().join("gone"), &videos())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound(_)));
    }
}
