//! 스캔 리포트 -- 매칭된 이벤트 행과 처리 이벤트 수
//!
//! 리포트는 드라이버만 작성하고, 렌더링이 시작된 뒤에는 읽기 전용입니다.
//! 열 구성은 모든 출력 형식에서 동일합니다 ([`COLUMNS`]).

use logchop_core::event::{Event, fields, select_user};
use logchop_core::pipeline::RuleHit;
use logchop_core::types::SourceKind;
use serde::{Deserialize, Serialize};

/// 리포트 열 이름 (순서 고정)
pub const COLUMNS: [&str; 11] = [
    "Timestamp",
    "User",
    "Exe",
    "Terminal",
    "Pid",
    "Hostname",
    "Message",
    "Tags",
    "Author",
    "ID",
    "Title",
];

/// 매칭된 이벤트 하나에 대한 리포트 행
///
/// 이벤트에 없는 필드는 빈 문자열입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportRow {
    pub timestamp: String,
    pub user: String,
    pub exe: String,
    pub terminal: String,
    pub pid: String,
    pub hostname: String,
    pub message: String,
    /// 규칙 태그를 `-`로 연결한 값
    pub tags: String,
    pub author: String,
    #[serde(rename = "ID")]
    pub id: String,
    pub title: String,
}

impl ReportRow {
    /// 이벤트와 첫 번째 규칙 hit로 행을 생성합니다.
    pub fn from_match(event: &dyn Event, hit: &RuleHit) -> Self {
        let field = |name: &str| event.select(name).unwrap_or_default().to_owned();
        Self {
            timestamp: field(fields::TIMESTAMP),
            user: select_user(event).unwrap_or_default().to_owned(),
            exe: field(fields::EXE),
            terminal: field(fields::TERMINAL),
            pid: field(fields::PID),
            hostname: field(fields::HOSTNAME),
            message: field(fields::MESSAGE),
            tags: hit.joined_tags(),
            author: hit.author.clone(),
            id: hit.id.clone(),
            title: hit.title.clone(),
        }
    }

    /// [`COLUMNS`] 순서의 셀 값
    pub fn cells(&self) -> [&str; 11] {
        [
            &self.timestamp,
            &self.user,
            &self.exe,
            &self.terminal,
            &self.pid,
            &self.hostname,
            &self.message,
            &self.tags,
            &self.author,
            &self.id,
            &self.title,
        ]
    }
}

/// 한 번의 스캔 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    source: SourceKind,
    rows: Vec<ReportRow>,
    events_processed: u64,
}

impl Report {
    /// 빈 리포트를 생성합니다.
    pub fn new(source: SourceKind) -> Self {
        Self {
            source,
            rows: Vec::new(),
            events_processed: 0,
        }
    }

    /// 스캔한 소스 종류
    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// 매칭된 행 (이벤트 순서)
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// 처리한 이벤트 수 (매칭 여부 무관)
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub(crate) fn record_event(&mut self) {
        self.events_processed += 1;
    }

    pub(crate) fn push_row(&mut self, row: ReportRow) {
        self.rows.push(row);
    }
}
