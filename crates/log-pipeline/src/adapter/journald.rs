//! systemd 저널 어댑터
//!
//! 저널 핸들을 열어 처음으로 이동한 뒤 끝까지 순회하며 [`JournaldEvent`]를 생성합니다.
//!
//! 저널 접근은 [`Journal`] trait 뒤에 있습니다.
//! - [`JournalctlJournal`]: `journalctl --output=json --no-pager` 자식 프로세스의 출력을 읽음
//! - [`MemoryJournal`]: 테스트 및 벤치마크용 메모리 저널
//!
//! 열기/이동/읽기 실패는 치명적이며, 저널 끝은 정상 종료입니다.

use std::io::BufReader;
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};

use chrono::{DateTime, SecondsFormat, Utc};
use logchop_core::event::{Event, fields};
use logchop_core::metrics::{LABEL_SOURCE, LINES_SKIPPED_TOTAL};
use serde_json::Value;
use tracing::debug;

use super::LineReader;
use crate::error::LogPipelineError;

/// journald 이벤트의 종류 값
pub const JOURNALD_KIND: &str = "journald";

/// 저널 엔트리 필드: 메시지
const FIELD_MESSAGE: &str = "MESSAGE";
/// 저널 엔트리 필드: 실시간 타임스탬프 (epoch 이후 마이크로초)
const FIELD_REALTIME: &str = "__REALTIME_TIMESTAMP";

/// 저널 엔트리 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// `MESSAGE` 필드. 없으면 `None`
    pub message: Option<String>,
    /// 실시간 타임스탬프 (마이크로초)
    pub realtime_usec: u64,
}

/// 저널 핸들
pub trait Journal {
    /// 저널의 가장 오래된 엔트리로 이동합니다.
    fn seek_head(&mut self) -> Result<(), LogPipelineError>;

    /// 다음 엔트리를 반환합니다. 끝에 도달하면 `None`입니다.
    fn next_entry(&mut self) -> Result<Option<JournalEntry>, LogPipelineError>;
}

/// 메모리 저널
#[derive(Debug, Clone, Default)]
pub struct MemoryJournal {
    entries: Vec<JournalEntry>,
    position: usize,
}

impl MemoryJournal {
    /// 엔트리 목록으로 저널을 생성합니다.
    pub fn new(entries: Vec<JournalEntry>) -> Self {
        Self {
            entries,
            position: 0,
        }
    }
}

impl Journal for MemoryJournal {
    fn seek_head(&mut self) -> Result<(), LogPipelineError> {
        self.position = 0;
        Ok(())
    }

    fn next_entry(&mut self) -> Result<Option<JournalEntry>, LogPipelineError> {
        let entry = self.entries.get(self.position).cloned();
        if entry.is_some() {
            self.position += 1;
        }
        Ok(entry)
    }
}

/// `journalctl` 기반 로컬 저널
///
/// 자식 프로세스는 핸들이 drop될 때 종료되고 회수됩니다.
pub struct JournalctlJournal {
    bin: PathBuf,
    child: Option<Child>,
    stdout: Option<LineReader<BufReader<ChildStdout>>>,
}

impl JournalctlJournal {
    /// `journalctl` 실행 파일 경로로 핸들을 생성합니다. 프로세스는 `seek_head`에서 시작합니다.
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            child: None,
            stdout: None,
        }
    }

    fn spawn(&mut self) -> Result<(), LogPipelineError> {
        self.terminate();

        let mut child = Command::new(&self.bin)
            .args(["--output=json", "--no-pager"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                LogPipelineError::Journal(format!(
                    "failed to start {}: {e}",
                    self.bin.display()
                ))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            LogPipelineError::Journal("failed to capture journalctl stdout".to_owned())
        })?;

        debug!(bin = %self.bin.display(), pid = child.id(), "journalctl started");
        self.stdout = Some(LineReader::new(BufReader::new(stdout)));
        self.child = Some(child);
        Ok(())
    }

    /// 종료 상태를 확인합니다. 비정상 종료는 읽기 실패로 취급합니다.
    fn finish(&mut self) -> Result<(), LogPipelineError> {
        self.stdout = None;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| LogPipelineError::Journal(format!("failed to wait for journalctl: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(LogPipelineError::Journal(format!(
                "{} exited with {status}",
                self.bin.display()
            )))
        }
    }

    fn terminate(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            // 이미 종료된 경우 kill 실패는 무시
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Journal for JournalctlJournal {
    fn seek_head(&mut self) -> Result<(), LogPipelineError> {
        self.spawn()
    }

    fn next_entry(&mut self) -> Result<Option<JournalEntry>, LogPipelineError> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Err(LogPipelineError::Journal(
                "journal read before seek".to_owned(),
            ));
        };

        match stdout.next_line()? {
            Some((line_no, line)) => parse_entry(&line)
                .map(Some)
                .map_err(|reason| LogPipelineError::Journal(format!("entry {line_no}: {reason}"))),
            None => {
                self.finish()?;
                Ok(None)
            }
        }
    }
}

impl Drop for JournalctlJournal {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// `journalctl --output=json` 한 줄을 엔트리로 변환합니다.
///
/// `MESSAGE`는 문자열, 바이트 배열(비 UTF-8 페이로드), `null` 중 하나입니다.
pub fn parse_entry(line: &str) -> Result<JournalEntry, String> {
    let value: Value = serde_json::from_str(line).map_err(|e| format!("invalid JSON: {e}"))?;

    let realtime_usec = value
        .get(FIELD_REALTIME)
        .and_then(|v| match v {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        })
        .ok_or_else(|| format!("missing or invalid {FIELD_REALTIME}"))?;

    let message = match value.get(FIELD_MESSAGE) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => {
            let bytes: Vec<u8> = items
                .iter()
                .filter_map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect();
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => None,
    };

    Ok(JournalEntry {
        message,
        realtime_usec,
    })
}

/// journald 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournaldEvent {
    /// 메시지 본문
    pub message: String,
    /// 실시간 타임스탬프 (마이크로초)
    pub realtime_usec: u64,
    /// 해석된 시각
    pub timestamp: Option<DateTime<Utc>>,
    timestamp_text: String,
    realtime_text: String,
}

impl JournaldEvent {
    /// 메시지와 실시간 타임스탬프로 이벤트를 생성합니다.
    pub fn new(message: String, realtime_usec: u64) -> Self {
        let timestamp = i64::try_from(realtime_usec)
            .ok()
            .and_then(DateTime::from_timestamp_micros);
        let timestamp_text = timestamp
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .unwrap_or_default();
        Self {
            message,
            realtime_usec,
            timestamp,
            timestamp_text,
            realtime_text: realtime_usec.to_string(),
        }
    }
}

impl Event for JournaldEvent {
    fn keywords(&self) -> Vec<&str> {
        vec![&self.message]
    }

    fn select(&self, name: &str) -> Option<&str> {
        match name {
            fields::MESSAGE => Some(&self.message),
            fields::TIMESTAMP if self.timestamp.is_some() => Some(&self.timestamp_text),
            "realtime_usec" => Some(&self.realtime_text),
            _ => None,
        }
    }
}

/// journald 리더
pub struct JournaldReader<J> {
    journal: J,
    finished: bool,
}

impl<J: Journal> JournaldReader<J> {
    /// 저널의 처음으로 이동한 리더를 생성합니다.
    pub fn new(mut journal: J) -> Result<Self, LogPipelineError> {
        journal.seek_head()?;
        Ok(Self {
            journal,
            finished: false,
        })
    }
}

impl<J: Journal> Iterator for JournaldReader<J> {
    type Item = Result<JournaldEvent, LogPipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.journal.next_entry() {
                Ok(Some(JournalEntry {
                    message: Some(message),
                    realtime_usec,
                })) => return Some(Ok(JournaldEvent::new(message, realtime_usec))),
                Ok(Some(entry)) => {
                    debug!(realtime_usec = entry.realtime_usec, "journal entry without MESSAGE, skipping");
                    metrics::counter!(LINES_SKIPPED_TOTAL, LABEL_SOURCE => JOURNALD_KIND).increment(1);
                }
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
