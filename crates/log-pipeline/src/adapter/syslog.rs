//! syslog 텍스트 로그 어댑터
//!
//! `/var/log/syslog`, `/var/log/messages` 같은 라인 기반 syslog 파일을 읽어
//! [`SyslogEvent`]를 생성합니다.
//!
//! # 타임스탬프 인식 순서
//! 1. BSD 헤더: `Oct 12 10:00:00` (연도 없음, 기준 연도와 UTC로 해석)
//! 2. RFC 3339 / ISO 8601: `2024-10-12T10:00:00.123+02:00` (rsyslog 기본 형식).
//!    콜론 없는 오프셋(`+0200`)도 허용하며 `+02:00`으로 정규화해 해석합니다.
//!
//! 둘 다 인식하지 못한 라인은 스캔 전체를 중단시킵니다.
//!
//! # 본문 분리
//! 타임스탬프 이후 나머지를 공백 기준 5개 구간으로 나눕니다 (마지막 구간은 나머지 전부).
//! ```text
//! <facility>: <severity> <무시> <무시> <message...>
//! ```
//! 5개 미만이면 해당 라인만 건너뜁니다.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDateTime, SecondsFormat, Utc};
use logchop_core::event::{Event, fields};
use logchop_core::metrics::{LABEL_SOURCE, LINES_SKIPPED_TOTAL};
use regex::Regex;
use tracing::debug;

use super::LineReader;
use crate::error::LogPipelineError;

/// BSD syslog 타임스탬프 (RFC 3164)
const BSD_TIMESTAMP_PATTERN: &str = r"^([a-zA-Z]{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2})";

/// ISO 8601 타임스탬프 (rsyslog `RSYSLOG_FileFormat`)
const ISO_TIMESTAMP_PATTERN: &str = r"^((-?(?:[1-9][0-9]*)?[0-9]{4})-(1[0-2]|0[1-9])-(3[01]|0[1-9]|[12][0-9])T(2[0-3]|[01][0-9]):([0-5][0-9]):([0-5][0-9])(\.[0-9]+)?(Z|[+-](?:2[0-3]|[01][0-9]):?[0-5][0-9])?)";

/// 타임스탬프 이후 분리할 구간 수
const SEGMENT_COUNT: usize = 5;

/// syslog 라인 하나에서 얻은 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogEvent {
    /// facility (끝의 `:` 제거)
    pub facility: String,
    /// severity 토큰
    pub severity: String,
    /// 메시지 본문 (앞뒤 공백 제거)
    pub message: String,
    /// 해석된 시각. 해석할 수 없는 날짜(예: 평년의 2월 29일)는 `None`
    pub timestamp: Option<DateTime<Utc>>,
    /// `timestamp` 필드 값: 정규화된 RFC 3339, 해석 실패 시 원문
    pub timestamp_text: String,
}

impl Event for SyslogEvent {
    fn keywords(&self) -> Vec<&str> {
        vec![&self.facility, &self.severity, &self.message]
    }

    fn select(&self, name: &str) -> Option<&str> {
        match name {
            "facility" => Some(&self.facility),
            "severity" => Some(&self.severity),
            fields::MESSAGE => Some(&self.message),
            fields::TIMESTAMP => Some(&self.timestamp_text),
            _ => None,
        }
    }
}

/// 한 라인의 파싱 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// 이벤트 생성
    Event(SyslogEvent),
    /// 타임스탬프는 있으나 5개 구간으로 나눌 수 없음
    Skipped,
    /// 인식 가능한 타임스탬프 없음
    NoTimestamp,
}

/// syslog 라인 파서
#[derive(Debug, Clone)]
pub struct SyslogParser {
    bsd: Regex,
    iso: Regex,
    /// BSD 타임스탬프에 적용할 연도
    reference_year: i32,
}

impl SyslogParser {
    /// 현재 UTC 연도를 기준 연도로 하는 파서를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            bsd: Regex::new(BSD_TIMESTAMP_PATTERN)?,
            iso: Regex::new(ISO_TIMESTAMP_PATTERN)?,
            reference_year: Utc::now().year(),
        })
    }

    /// BSD 타임스탬프에 적용할 연도를 설정합니다.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// 한 라인을 파싱합니다.
    pub fn parse_line(&self, line: &str) -> ParsedLine {
        let (raw_ts, timestamp, rest) = if let Some(m) = self.bsd.find(line) {
            (m.as_str(), self.parse_bsd(m.as_str()), &line[m.end()..])
        } else if let Some(m) = self.iso.find(line) {
            (m.as_str(), Self::parse_iso(m.as_str()), &line[m.end()..])
        } else {
            return ParsedLine::NoTimestamp;
        };

        let Some(segments) = split_segments(rest, SEGMENT_COUNT) else {
            return ParsedLine::Skipped;
        };

        let timestamp_text = match timestamp {
            Some(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            None => raw_ts.to_owned(),
        };

        ParsedLine::Event(SyslogEvent {
            facility: segments[0].trim_end_matches(':').to_owned(),
            severity: segments[1].to_owned(),
            message: segments[4].trim().to_owned(),
            timestamp,
            timestamp_text,
        })
    }

    /// `Mon dd hh:mm:ss`를 기준 연도의 UTC 시각으로 해석합니다.
    fn parse_bsd(&self, raw: &str) -> Option<DateTime<Utc>> {
        let mut parts = raw.split_whitespace();
        let (month, day, time) = (parts.next()?, parts.next()?, parts.next()?);
        let normalized = format!("{} {month} {day:0>2} {time}", self.reference_year);
        NaiveDateTime::parse_from_str(&normalized, "%Y %b %d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// ISO 8601 타임스탬프를 해석합니다. 오프셋이 없으면 UTC로 간주합니다.
    fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&with_offset_colon(raw)) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// `+hhmm` 형식의 끝 오프셋을 `+hh:mm`으로 바꿉니다. 그 외에는 그대로 반환합니다.
fn with_offset_colon(raw: &str) -> Cow<'_, str> {
    let Some(split) = raw.len().checked_sub(5) else {
        return Cow::Borrowed(raw);
    };
    match (raw.get(..split), raw.get(split..)) {
        (Some(head), Some(offset))
            if offset.starts_with(['+', '-'])
                && offset[1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            Cow::Owned(format!("{head}{}:{}", &offset[..3], &offset[3..]))
        }
        _ => Cow::Borrowed(raw),
    }
}

/// 공백 기준으로 `count`개 구간으로 나눕니다. 마지막 구간은 나머지 전부입니다.
fn split_segments(s: &str, count: usize) -> Option<Vec<&str>> {
    let mut segments = Vec::with_capacity(count);
    let mut rest = s.trim_start();
    while segments.len() + 1 < count {
        let end = rest.find(char::is_whitespace)?;
        segments.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    if rest.is_empty() {
        return None;
    }
    segments.push(rest);
    Some(segments)
}

/// syslog 파일 리더
///
/// 타임스탬프가 없는 라인을 만나면 경로와 라인 번호를 담은
/// `TimestampNotFound` 에러를 반환하고 종료합니다.
pub struct SyslogReader<R> {
    lines: LineReader<R>,
    parser: SyslogParser,
    path: String,
    finished: bool,
}

impl SyslogReader<BufReader<File>> {
    /// syslog 파일을 엽니다.
    pub fn open(path: &Path) -> Result<Self, LogPipelineError> {
        let file = File::open(path).map_err(|e| LogPipelineError::SourceOpen {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::new(BufReader::new(file), path.display().to_string())
    }
}

impl<R: BufRead> SyslogReader<R> {
    /// 임의의 버퍼 리더에서 syslog 라인을 읽습니다. `path`는 에러 메시지에 사용됩니다.
    pub fn new(reader: R, path: impl Into<String>) -> Result<Self, LogPipelineError> {
        Ok(Self {
            lines: LineReader::new(reader),
            parser: SyslogParser::new()?,
            path: path.into(),
            finished: false,
        })
    }

    /// 파서를 교체합니다 (기준 연도 고정 등).
    pub fn with_parser(mut self, parser: SyslogParser) -> Self {
        self.parser = parser;
        self
    }
}

impl<R: BufRead> Iterator for SyslogReader<R> {
    type Item = Result<SyslogEvent, LogPipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let (line_no, line) = match self.lines.next_line() {
                Ok(Some(next)) => next,
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match self.parser.parse_line(&line) {
                ParsedLine::Event(event) => return Some(Ok(event)),
                ParsedLine::Skipped => {
                    debug!(path = %self.path, line = line_no, "syslog line has fewer than five segments, skipping");
                    metrics::counter!(LINES_SKIPPED_TOTAL, LABEL_SOURCE => "syslog").increment(1);
                }
                ParsedLine::NoTimestamp => {
                    self.finished = true;
                    return Some(Err(LogPipelineError::TimestampNotFound {
                        path: self.path.clone(),
                        line: line_no,
                    }));
                }
            }
        }
    }
}
