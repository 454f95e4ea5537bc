//! auditd 감사 로그 어댑터
//!
//! 한 줄에 하나의 레코드가 있는 감사 로그를 읽어 [`AuditEvent`]를 생성합니다.
//!
//! # 레코드 형식
//! ```text
//! type=SYSCALL msg=audit(1690000000.123:456): arch=c000003e syscall=59 AUID=1000 exe="/bin/ls"
//! ```
//!
//! - `type=`으로 시작하지 않는 라인은 건너뜁니다.
//! - 공백으로 토큰을 나누고 첫 번째 `=`에서 키와 값을 분리합니다. `=`가 없는 토큰은 무시합니다.
//! - 큰따옴표로 감싼 값은 따옴표를 유지합니다.
//! - `msg=audit(<초>.<소수>:<시리얼>):` 값은 `timestamp`(RFC 3339 UTC)와 `serial` 필드로 대체됩니다.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use logchop_core::event::{Event, fields};
use logchop_core::metrics::{LABEL_SOURCE, LINES_SKIPPED_TOTAL};
use regex::Regex;
use tracing::debug;

use super::LineReader;
use crate::error::LogPipelineError;

/// 레코드 라인 접두사
const RECORD_PREFIX: &str = "type=";

/// `msg` 값에서 감사 타임스탬프를 추출하는 정규식
const AUDIT_STAMP_PATTERN: &str = r"^audit\((\d+)\.(\d+):(\d+)\)";

/// auditd 레코드 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// `type` 필드 값 (예: `SYSCALL`, `USER_LOGIN`)
    pub kind: String,
    /// 레코드의 모든 `key=value` 토큰
    pub fields: BTreeMap<String, String>,
    /// `msg=audit(...)`에서 추출한 시각
    pub timestamp: Option<DateTime<Utc>>,
}

impl Event for AuditEvent {
    fn keywords(&self) -> Vec<&str> {
        std::iter::once(self.kind.as_str())
            .chain(self.fields.values().map(String::as_str))
            .collect()
    }

    fn select(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// auditd 레코드 파서
///
/// 타임스탬프 정규식은 생성 시 한 번만 컴파일합니다.
#[derive(Debug, Clone)]
pub struct AuditdParser {
    stamp: Regex,
}

impl AuditdParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            stamp: Regex::new(AUDIT_STAMP_PATTERN)?,
        })
    }

    /// 한 라인을 파싱합니다. 레코드가 아니거나 필드가 없으면 `None`을 반환합니다.
    pub fn parse_line(&self, line: &str) -> Option<AuditEvent> {
        if !line.starts_with(RECORD_PREFIX) {
            return None;
        }

        let mut fields = BTreeMap::new();
        let mut timestamp = None;

        for token in line.split_whitespace() {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };

            if key == "msg" && value.starts_with("audit(") {
                if let Some((ts, serial)) = self.parse_stamp(value) {
                    fields.insert(
                        fields::TIMESTAMP.to_owned(),
                        ts.to_rfc3339_opts(SecondsFormat::Secs, true),
                    );
                    fields.insert("serial".to_owned(), serial.to_owned());
                    timestamp = Some(ts);
                    continue;
                }
                debug!(value, "unrecognized audit stamp, keeping raw msg");
            }

            fields.insert(key.to_owned(), value.to_owned());
        }

        if fields.is_empty() {
            return None;
        }

        let kind = fields.get("type").cloned().unwrap_or_default();
        Some(AuditEvent {
            kind,
            fields,
            timestamp,
        })
    }

    /// `audit(<secs>.<frac>:<serial>)`에서 UTC 시각과 시리얼을 추출합니다.
    fn parse_stamp<'a>(&self, value: &'a str) -> Option<(DateTime<Utc>, &'a str)> {
        let caps = self.stamp.captures(value)?;
        let secs: i64 = caps.get(1)?.as_str().parse().ok()?;
        let serial = caps.get(3)?.as_str();
        let ts = DateTime::from_timestamp(secs, 0)?;
        Some((ts, serial))
    }
}

/// auditd 감사 로그 리더
///
/// 라인 단위로 지연 파싱하며, I/O 에러가 발생하면 에러를 한 번 반환하고 종료합니다.
pub struct AuditdReader<R> {
    lines: LineReader<R>,
    parser: AuditdParser,
    finished: bool,
}

impl AuditdReader<BufReader<File>> {
    /// 감사 로그 파일을 엽니다.
    pub fn open(path: &Path) -> Result<Self, LogPipelineError> {
        let file = File::open(path).map_err(|e| LogPipelineError::SourceOpen {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> AuditdReader<R> {
    /// 임의의 버퍼 리더에서 감사 레코드를 읽습니다.
    pub fn new(reader: R) -> Result<Self, LogPipelineError> {
        Ok(Self {
            lines: LineReader::new(reader),
            parser: AuditdParser::new()?,
            finished: false,
        })
    }
}

impl<R: BufRead> Iterator for AuditdReader<R> {
    type Item = Result<AuditEvent, LogPipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.lines.next_line() {
                Ok(Some((line_no, line))) => match self.parser.parse_line(&line) {
                    Some(event) => return Some(Ok(event)),
                    None => {
                        debug!(line = line_no, "skipping non-record audit line");
                        metrics::counter!(LINES_SKIPPED_TOTAL, LABEL_SOURCE => "auditd")
                            .increment(1);
                    }
                },
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
