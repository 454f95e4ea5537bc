//! 결과 싱크 -- 리포트를 표, CSV, JSON으로 렌더링합니다.
//!
//! 세 형식 모두 같은 행을 같은 순서로 열거하며 열 구성은 [`COLUMNS`]로 고정됩니다.
//!
//! - 표: 헤더, 행, `Processed N <source> events` 요약
//! - CSV: 헤더 행이 항상 먼저 출력됨
//! - JSON: 열 이름을 키로 하는 객체 배열, 2칸 들여쓰기 (행이 없으면 `[]`)

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogPipelineError;
use crate::report::{COLUMNS, Report};

/// 표 셀 최대 너비 (초과 시 말줄임)
const MAX_CELL_WIDTH: usize = 64;

/// 리포트 출력 형식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 사람이 읽는 표 (기본값)
    #[default]
    Table,
    /// RFC 4180 CSV
    Csv,
    /// JSON 배열
    Json,
}

impl OutputFormat {
    /// 형식 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid output format '{other}' (expected: table, csv, json)"
            )),
        }
    }
}

/// 리포트를 CSV 문서로 렌더링합니다.
pub fn render_csv(report: &Report) -> Result<String, LogPipelineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(COLUMNS)
        .map_err(|e| LogPipelineError::Render(format!("csv header: {e}")))?;
    for row in report.rows() {
        writer
            .write_record(row.cells())
            .map_err(|e| LogPipelineError::Render(format!("csv row: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LogPipelineError::Render(format!("csv flush: {e}")))?;
    String::from_utf8(bytes).map_err(|e| LogPipelineError::Render(format!("csv utf-8: {e}")))
}

/// 리포트를 JSON 문서로 렌더링합니다.
pub fn render_json(report: &Report) -> Result<String, LogPipelineError> {
    serde_json::to_string_pretty(report.rows())
        .map_err(|e| LogPipelineError::Render(format!("json: {e}")))
}

/// 리포트를 표로 렌더링합니다.
pub fn render_table(report: &Report, w: &mut dyn Write) -> Result<(), LogPipelineError> {
    let rows: Vec<[String; 11]> = report
        .rows()
        .iter()
        .map(|row| row.cells().map(table_cell))
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_table_line(w, &COLUMNS.map(str::to_owned), &widths)?;
    let separator = widths.map(|width| "-".repeat(width));
    write_table_line(w, &separator, &widths)?;
    for row in &rows {
        write_table_line(w, row, &widths)?;
    }

    writeln!(w)?;
    writeln!(
        w,
        "Processed {} {} events",
        report.events_processed(),
        report.source()
    )?;
    Ok(())
}

/// 리포트를 지정한 형식으로 렌더링해 쓰기 대상에 출력합니다.
pub fn render(
    report: &Report,
    format: OutputFormat,
    w: &mut dyn Write,
) -> Result<(), LogPipelineError> {
    match format {
        OutputFormat::Table => render_table(report, w),
        OutputFormat::Csv => {
            w.write_all(render_csv(report)?.as_bytes())?;
            Ok(())
        }
        OutputFormat::Json => {
            writeln!(w, "{}", render_json(report)?)?;
            Ok(())
        }
    }
}

fn write_table_line(
    w: &mut dyn Write,
    cells: &[String; 11],
    widths: &[usize; 11],
) -> std::io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(w, "{}", line.trim_end())
}

/// 제어 문자를 공백으로 바꾸고 너무 긴 값은 자릅니다.
fn table_cell(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if cleaned.chars().count() <= MAX_CELL_WIDTH {
        return cleaned;
    }
    let mut truncated: String = cleaned.chars().take(MAX_CELL_WIDTH - 3).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportRow;
    use logchop_core::types::SourceKind;

    fn report_with_rows(rows: Vec<ReportRow>) -> Report {
        let mut report = Report::new(SourceKind::Auditd);
        for row in rows {
            report.record_event();
            report.push_row(row);
        }
        report.record_event();
        report
    }

    fn row(id: &str, message: &str) -> ReportRow {
        ReportRow {
            timestamp: "2023-07-22T04:26:40Z".to_owned(),
            user: "1000".to_owned(),
            exe: "\"/bin/ls\"".to_owned(),
            message: message.to_owned(),
            tags: "attack.t1059-linux".to_owned(),
            author: "tester".to_owned(),
            id: id.to_owned(),
            title: format!("{id} title"),
            ..ReportRow::default()
        }
    }

    #[test]
    fn output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn empty_report_renders_headers_and_empty_array() {
        let report = Report::new(SourceKind::Syslog);

        let csv = render_csv(&report).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("Timestamp,User,Exe,Terminal,Pid,Hostname,Message,Tags,Author,ID,Title"));

        assert_eq!(render_json(&report).unwrap(), "[]");

        let mut table = Vec::new();
        render_table(&report, &mut table).unwrap();
        let table = String::from_utf8(table).unwrap();
        assert!(table.contains("Timestamp"));
        assert!(table.contains("Processed 0 syslog events"));
    }

    #[test]
    fn csv_quotes_fields_with_commas_and_quotes() {
        let report = report_with_rows(vec![row("r1", "a, \"quoted\" message")]);
        let csv = render_csv(&report).unwrap();
        assert!(csv.contains("\"a, \"\"quoted\"\" message\""));
        assert!(csv.contains("\"\"\"/bin/ls\"\"\""));
    }

    #[test]
    fn json_uses_column_keys_and_two_space_indent() {
        let report = report_with_rows(vec![row("r1", "hello")]);
        let json = render_json(&report).unwrap();
        assert!(json.contains("\n    \"ID\": \"r1\""));

        let parsed: Vec<ReportRow> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report.rows());
    }

    #[test]
    fn table_lists_rows_and_summary() {
        let report = report_with_rows(vec![row("r1", "first"), row("r2", "second")]);
        let mut out = Vec::new();
        render_table(&report, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("r1 title"));
        assert!(out.contains("r2 title"));
        assert!(out.contains("attack.t1059-linux"));
        assert!(out.trim_end().ends_with("Processed 3 auditd events"));
    }

    #[test]
    fn long_cells_are_truncated_in_table() {
        let cell = table_cell(&"x".repeat(200));
        assert_eq!(cell.chars().count(), MAX_CELL_WIDTH);
        assert!(cell.ends_with("..."));
        assert_eq!(table_cell("tab\there"), "tab here");
    }

    #[test]
    fn all_formats_enumerate_same_rows() {
        let report = report_with_rows(vec![row("r1", "one"), row("r2", "two")]);

        let csv = render_csv(&report).unwrap();
        let json: Vec<ReportRow> = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(csv.lines().count() - 1, report.rows().len());
        assert_eq!(json.len(), report.rows().len());
        for (json_row, row) in json.iter().zip(report.rows()) {
            assert_eq!(json_row.tags, row.tags);
        }
    }
}
