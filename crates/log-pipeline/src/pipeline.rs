//! 스캔 오케스트레이션 -- 룰셋 로드, 소스 탐색, 어댑터 열기, 매칭 드라이버
//!
//! # 흐름
//! ```text
//! RuleEngine::load -> LogLocator::locate -> Adapter::open -> drive -> Report
//! ```
//!
//! 룰셋은 소스를 열기 전에 로드하므로 룰 로딩 실패 시 어떤 이벤트도 처리되지 않습니다.
//! [`drive`]는 세 어댑터 모두에 공통으로 사용되는 단일 드라이버입니다.

use std::path::{Path, PathBuf};
use std::time::Instant;

use logchop_core::event::Event;
use logchop_core::metrics::{
    EVENTS_MATCHED_TOTAL, EVENTS_PROCESSED_TOTAL, LABEL_SOURCE, SCAN_DURATION_SECONDS,
};
use logchop_core::pipeline::{RuleEngine, Ruleset};
use logchop_core::types::SourceKind;
use tracing::{debug, info};

use crate::adapter::{
    AuditdReader, Journal, JournalctlJournal, JournaldReader, SyslogParser, SyslogReader,
};
use crate::config::ScanConfig;
use crate::error::LogPipelineError;
use crate::locator::{LogLocator, RawSource};
use crate::report::{Report, ReportRow};

/// 이벤트 시퀀스를 룰셋으로 평가해 리포트를 만듭니다.
///
/// - 매칭된 이벤트마다 첫 번째 hit로 행을 추가합니다.
/// - `progress`는 이벤트마다(매칭 여부 무관) 누적 처리 수와 함께 한 번 호출됩니다.
/// - 어댑터 에러는 즉시 스캔을 중단합니다.
pub fn drive<S, E, I>(
    ruleset: &S,
    source: SourceKind,
    events: I,
    progress: &mut dyn FnMut(u64),
) -> Result<Report, LogPipelineError>
where
    S: Ruleset + ?Sized,
    E: Event,
    I: IntoIterator<Item = Result<E, LogPipelineError>>,
{
    let mut report = Report::new(source);

    for event in events {
        let event = event?;
        report.record_event();
        metrics::counter!(EVENTS_PROCESSED_TOTAL, LABEL_SOURCE => source.as_str()).increment(1);

        if let Some(result) = ruleset.evaluate(&event) {
            let hit = result.first();
            debug!(rule_id = %hit.id, hits = result.hits().len(), "event matched");
            metrics::counter!(EVENTS_MATCHED_TOTAL, LABEL_SOURCE => source.as_str()).increment(1);
            report.push_row(ReportRow::from_match(&event, hit));
        }

        progress(report.events_processed());
    }

    Ok(report)
}

/// 스캔 파이프라인 -- 설정된 소스 하나를 한 번 스캔합니다.
///
/// # 사용 예시
/// ```ignore
/// use logchop_log_pipeline::{ScanPipelineBuilder, YamlRuleEngine};
///
/// let pipeline = ScanPipelineBuilder::new().config(config).build()?;
/// let report = pipeline.run(&YamlRuleEngine::new(), &mut |_| {})?;
/// ```
pub struct ScanPipeline {
    config: ScanConfig,
    locator: LogLocator,
}

impl ScanPipeline {
    /// 스캔 설정
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// 룰셋 로드 → 소스 탐색 → 열기 → 드라이브 순서로 스캔을 실행합니다.
    pub fn run<R: RuleEngine>(
        &self,
        engine: &R,
        progress: &mut dyn FnMut(u64),
    ) -> Result<Report, LogPipelineError> {
        let started = Instant::now();
        let ruleset = self.load_ruleset(engine)?;

        let raw = self
            .locator
            .locate(self.config.target, self.config.file.as_deref())?;
        info!(kind = %self.config.target, source = %raw.describe(), "scanning log source");

        let report = self.scan_source(&ruleset, raw, progress)?;
        self.finish(&report, started);
        Ok(report)
    }

    /// 저널 핸들을 직접 지정해 journald 스캔을 실행합니다.
    pub fn run_journal<R: RuleEngine, J: Journal>(
        &self,
        engine: &R,
        journal: J,
        progress: &mut dyn FnMut(u64),
    ) -> Result<Report, LogPipelineError> {
        let started = Instant::now();
        let ruleset = self.load_ruleset(engine)?;
        let report = drive(
            &ruleset,
            SourceKind::Journald,
            JournaldReader::new(journal)?,
            progress,
        )?;
        self.finish(&report, started);
        Ok(report)
    }

    /// 규칙 디렉토리를 로드합니다. 실패하면 스캔 전체가 중단됩니다.
    fn load_ruleset<R: RuleEngine>(&self, engine: &R) -> Result<R::Ruleset, LogPipelineError> {
        let ruleset = engine.load(&self.config.rules_dir)?;
        info!(
            dir = %self.config.rules_dir.display(),
            rules = ruleset.rule_count(),
            "ruleset loaded"
        );
        Ok(ruleset)
    }

    /// 해석된 소스에 맞는 어댑터를 열어 드라이버에 연결합니다.
    fn scan_source<S: Ruleset>(
        &self,
        ruleset: &S,
        raw: RawSource,
        progress: &mut dyn FnMut(u64),
    ) -> Result<Report, LogPipelineError> {
        match raw {
            RawSource::AuditLog(path) => drive(
                ruleset,
                SourceKind::Auditd,
                AuditdReader::open(&path)?,
                progress,
            ),
            RawSource::SyslogFile(path) => {
                let reader = SyslogReader::open(&path)?.with_parser(self.syslog_parser()?);
                drive(ruleset, SourceKind::Syslog, reader, progress)
            }
            RawSource::Journal => {
                let journal = JournalctlJournal::new(&self.config.sources.journalctl_bin);
                drive(
                    ruleset,
                    SourceKind::Journald,
                    JournaldReader::new(journal)?,
                    progress,
                )
            }
        }
    }

    fn syslog_parser(&self) -> Result<SyslogParser, LogPipelineError> {
        let parser = SyslogParser::new()?;
        Ok(match self.config.reference_year {
            Some(year) => parser.with_reference_year(year),
            None => parser,
        })
    }

    fn finish(&self, report: &Report, started: Instant) {
        let elapsed = started.elapsed();
        metrics::histogram!(SCAN_DURATION_SECONDS, LABEL_SOURCE => report.source().as_str())
            .record(elapsed.as_secs_f64());
        info!(
            source = %report.source(),
            events = report.events_processed(),
            matches = report.rows().len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan completed"
        );
    }
}

/// 스캔 파이프라인 빌더
pub struct ScanPipelineBuilder {
    config: ScanConfig,
    locator: Option<LogLocator>,
}

impl ScanPipelineBuilder {
    /// 기본 설정으로 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
            locator: None,
        }
    }

    /// 스캔 설정을 지정합니다.
    pub fn config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// 소스 탐색기를 교체합니다. 지정하지 않으면 설정의 `sources`로 생성합니다.
    pub fn locator(mut self, locator: LogLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// 설정을 검증하고 파이프라인을 생성합니다.
    pub fn build(self) -> Result<ScanPipeline, LogPipelineError> {
        self.config.validate()?;
        let locator = self
            .locator
            .unwrap_or_else(|| LogLocator::from_config(&self.config.sources));
        Ok(ScanPipeline {
            config: self.config,
            locator,
        })
    }
}

impl Default for ScanPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 소스 종류, 명시 파일, 규칙 디렉토리만으로 기본 설정 스캔을 실행합니다.
pub fn scan_source<R: RuleEngine>(
    engine: &R,
    kind: SourceKind,
    explicit_file: Option<&Path>,
    rules_dir: &Path,
    progress: &mut dyn FnMut(u64),
) -> Result<Report, LogPipelineError> {
    let config = ScanConfig {
        target: kind,
        file: explicit_file.map(PathBuf::from),
        rules_dir: rules_dir.to_path_buf(),
        ..ScanConfig::default()
    };
    ScanPipelineBuilder::new()
        .config(config)
        .build()?
        .run(engine, progress)
}
