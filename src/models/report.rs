//! # 재조정 결과

use std::collections::BTreeMap;

/// 재조정 한 번의 실행 결과. 저장하지 않고 응답으로만 돌려줍니다.
///
/// - `updated`: 파일 경로 → 저장된 제목
/// - `errors`: 루트 디렉토리, 경로 또는 정규화된 제목 → 실패 메시지
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationReport {
    pub updated: BTreeMap<String, String>,
    pub errors: BTreeMap<String, String>,
}

impl ReconciliationReport {
    pub fn record_success(&mut self, path: impl Into<String>, title: impl Into<String>) {
        self.updated.insert(path.into(), title.into());
    }

    pub fn record_error(&mut self, key: impl Into<String>, message: impl ToString) {
        self.errors.insert(key.into(), message.to_string());
    }
}
