//! logchop 로그 파이프라인
//!
//! auditd, journald, syslog 로그를 [`Event`](logchop_core::Event)로 정규화하고
//! 룰셋으로 평가한 뒤 표/CSV/JSON 리포트로 렌더링합니다.
//!
//! # 모듈 구성
//!
//! - [`locator`]: 소스 종류별 물리 로그 탐색 (auditd.conf, syslog 후보, 로컬 저널)
//! - [`adapter`]: auditd / journald / syslog 어댑터 (지연 이벤트 시퀀스)
//! - [`rule`]: YAML 기반 탐지 규칙 엔진 (룰 엔진 포트의 기본 구현)
//! - [`pipeline`]: 룰 매칭 드라이버 및 스캔 오케스트레이션
//! - [`report`]: 리포트 행과 열 구성
//! - [`sink`]: 표, CSV, JSON 렌더링
//! - [`config`]: 스캔 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! LogLocator -> RawSource -> Adapter -> Events -> drive(Ruleset) -> Report -> Sink
//!     |                        |                      |                      |
//! auditd.conf /          auditd/journald/        first hit per         table/csv/json
//! syslog candidates      syslog parsers          matching event
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod locator;
pub mod pipeline;
pub mod report;
pub mod rule;
pub mod sink;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{ScanPipeline, ScanPipelineBuilder, drive, scan_source};

// 설정
pub use config::{ScanConfig, ScanConfigBuilder};

// 에러
pub use error::LogPipelineError;

// 소스 탐색
pub use locator::{LogLocator, RawSource};

// 어댑터
pub use adapter::{
    AuditEvent, AuditdReader, Journal, JournalEntry, JournalctlJournal, JournaldEvent,
    JournaldReader, MemoryJournal, SyslogEvent, SyslogParser, SyslogReader,
};

// 규칙 엔진
pub use rule::{DetectionRule, RuleLoader, YamlRuleEngine, YamlRuleset};

// 리포트 및 싱크
pub use report::{COLUMNS, Report, ReportRow};
pub use sink::{OutputFormat, render, render_csv, render_json, render_table};
