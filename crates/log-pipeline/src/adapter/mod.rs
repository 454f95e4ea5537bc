//! 로그 소스 어댑터 -- 원본 로그를 [`Event`](logchop_core::Event) 시퀀스로 변환합니다.
//!
//! 각 어댑터는 `Iterator<Item = Result<E, LogPipelineError>>`를 구현합니다.
//! 시퀀스는 유한하고 한 번만 순회할 수 있으며, 치명적 에러를 반환한 뒤에는 종료됩니다.
//!
//! - [`auditd`]: `type=` 레코드 라인
//! - [`journald`]: systemd 저널 엔트리
//! - [`syslog`]: BSD / ISO 8601 타임스탬프 라인

pub mod auditd;
pub mod journald;
pub mod syslog;

use std::io::BufRead;

use crate::error::LogPipelineError;

pub use auditd::{AuditEvent, AuditdParser, AuditdReader};
pub use journald::{
    JOURNALD_KIND, Journal, JournalEntry, JournalctlJournal, JournaldEvent, JournaldReader,
    MemoryJournal,
};
pub use syslog::{ParsedLine, SyslogEvent, SyslogParser, SyslogReader};

/// 라인 리더 -- 바이트 단위로 읽어 UTF-8이 아닌 라인도 손실 변환합니다.
///
/// 감사 로그와 syslog는 잘못된 UTF-8 바이트를 포함할 수 있으므로
/// `BufRead::lines()` 대신 사용합니다.
pub(crate) struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(512),
            line_no: 0,
        }
    }

    /// 다음 라인과 1부터 시작하는 라인 번호를 반환합니다. 줄바꿈 문자는 제거됩니다.
    pub(crate) fn next_line(&mut self) -> Result<Option<(usize, String)>, LogPipelineError> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }
        Ok(Some((
            self.line_no,
            String::from_utf8_lossy(&self.buf).into_owned(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn line_reader_strips_line_endings() {
        let mut reader = LineReader::new(Cursor::new("a\r\nb\nc"));
        assert_eq!(reader.next_line().unwrap(), Some((1, "a".to_owned())));
        assert_eq!(reader.next_line().unwrap(), Some((2, "b".to_owned())));
        assert_eq!(reader.next_line().unwrap(), Some((3, "c".to_owned())));
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn line_reader_decodes_invalid_utf8_lossily() {
        let mut reader = LineReader::new(Cursor::new(b"ok \xff\xfe end\n".to_vec()));
        let (_, line) = reader.next_line().unwrap().unwrap();
        assert!(line.starts_with("ok "));
        assert!(line.ends_with(" end"));
    }

    #[test]
    fn line_reader_counts_empty_lines() {
        let mut reader = LineReader::new(Cursor::new("\n\nx\n"));
        assert_eq!(reader.next_line().unwrap(), Some((1, String::new())));
        assert_eq!(reader.next_line().unwrap(), Some((2, String::new())));
        assert_eq!(reader.next_line().unwrap(), Some((3, "x".to_owned())));
    }
}
