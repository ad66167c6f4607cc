//! # 제목 정규화 (Title Normalizer)
//!
//! 파일/디렉토리 이름에서 메타데이터 검색에 쓸 제목을 만듭니다.
//!
//! - 영화: 릴리스 이름(`Heat.1995.1080p.BluRay.x264-NSB.mkv`)에서 연도,
//!   해상도, 소스, 코덱, 릴리스 그룹을 잘라내고 남은 앞부분을 제목으로 사용
//! - TV 쇼: 디렉토리 이름의 `.`, `,`, `_`를 공백으로 바꿈
//!
//! 빈 입력이나 정리 후 빈 제목은 `TitleError::Empty`입니다.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TitleError {
    #[error("Unable to derive a title from an empty name")]
    Empty,

    #[error("Path {0} has no final component")]
    NoFileName(String),
}

static LEADING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[\[\(\{][^\]\)\}]*[\]\)\}][\s._\-]*").expect("valid leading tag regex")
});

static VIDEO_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(mkv|mp4|avi|mov|wmv|flv|webm|m4v|mpg|mpeg|m2ts)$")
        .expect("valid extension regex")
});

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:19|20)\d{2}$").expect("valid year regex"));

/// 해상도, 소스, 코덱, 오디오 토큰. 하나라도 나오면 그 앞에서 제목이 끝납니다.
static QUALITY_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:
            \d{3,4}[pi] | 4k | uhd | hdr | hdr10 | sdr
          | blu-?ray | bdrip | brrip | web-?dl | webrip | hdrip | dvdrip | dvdscr | hdtv | hdcam
          | [xh]\.?26[45] | hevc | avc | xvid | divx | 10bit
          | aac | aac2 | ac3 | dts | dd5 | flac | atmos | truehd | remux
        )$",
    )
    .expect("valid quality token regex")
});

/// 판본/플래그 단어. 제목에도 흔히 쓰이므로 연도나 품질 토큰 뒤에서만 자릅니다.
static EDITION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:
            extended | unrated | remastered | proper | repack | limited | internal
          | multi | subbed | dubbed
        )$",
    )
    .expect("valid edition token regex")
});

fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | '_' | '[' | ']' | '(' | ')' | '{' | '}')
}

/// "path/name" → "name", "path/name/" → "name"
fn last_component(path: &str) -> Result<&str, TitleError> {
    if path.trim().is_empty() {
        return Err(TitleError::Empty);
    }
    let trimmed = path.trim_end_matches(['/', '\\']);
    let name = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    if name.trim().is_empty() {
        return Err(TitleError::NoFileName(path.to_string()));
    }
    Ok(name)
}

/// 단어와 그 시작 위치(바이트 오프셋)
fn words(name: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut word_start = None;

    for (i, c) in name.char_indices().chain(std::iter::once((name.len(), ' '))) {
        if is_word_separator(c) {
            if let Some(start) = word_start.take() {
                words.push((start, &name[start..i]));
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    words
}

/// 제목이 끝나는 위치. 첫 단어는 항상 제목에 남습니다.
///
/// - 연도가 여러 개면 마지막 연도에서 자릅니다 (`Blade.Runner.2049.2017`)
/// - 품질 토큰은 처음 나온 곳에서 자릅니다
/// - 판본 단어는 연도나 품질 토큰이 이미 나온 뒤에만 자릅니다 (`The.Proper.Goodbye.2019`)
fn release_cutoff(name: &str) -> Option<usize> {
    let mut last_year = None;
    let mut first_quality = None;
    let mut first_edition = None;
    let mut seen_release_info = false;

    for (start, word) in words(name).into_iter().skip(1) {
        if YEAR.is_match(word) {
            last_year = Some(start);
            seen_release_info = true;
        } else if QUALITY_TOKEN.is_match(word) {
            first_quality.get_or_insert(start);
            seen_release_info = true;
        } else if seen_release_info && EDITION_TOKEN.is_match(word) {
            first_edition.get_or_insert(start);
        }
    }

    [last_year, first_quality, first_edition]
        .into_iter()
        .flatten()
        .min()
}

fn tidy(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| if is_word_separator(c) { ' ' } else { c })
        .collect();
    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || c == '-')
        .to_string()
}

/// 영화 파일 경로에서 검색용 제목을 만듭니다.
///
/// ```text
/// "/media/Heat.1995.NSB.mp4"                                  → "Heat"
/// "/media/Heat.1995.NSB.mp4/"                                 → "Heat"
/// "/media/The Godfather 1972 H264 DVDRip Useless-Info.avi"    → "The Godfather"
/// "/media/[Useless.info]_The.Movie.Title.2005.Useless.avi"    → "The Movie Title"
/// ```
pub fn movie_title(path: &str) -> Result<String, TitleError> {
    let name = last_component(path)?;
    let stripped = VIDEO_EXTENSION.replace(name, "");
    let untagged = LEADING_TAG.replace(&stripped, "");
    let name: &str = &untagged;

    let head = match release_cutoff(name) {
        Some(cut) => &name[..cut],
        None => name,
    };

    let title = tidy(head);
    if title.is_empty() {
        return Err(TitleError::Empty);
    }
    Ok(title)
}

/// TV 쇼 디렉토리 경로에서 쇼 이름을 만듭니다.
///
/// `"/media/tv/The_Office/"` → `"The Office"`
pub fn show_name(path: &str) -> Result<String, TitleError> {
    let name = last_component(path)?;
    let replaced: String = name
        .chars()
        .map(|c| if matches!(c, '.' | ',' | '_') { ' ' } else { c })
        .collect();

    let name = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(TitleError::Empty);
    }
    Ok(name)
}
