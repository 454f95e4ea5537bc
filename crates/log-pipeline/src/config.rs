//! 스캔 설정
//!
//! [`ScanConfig`]는 core의 [`LogchopConfig`](logchop_core::config::LogchopConfig)를
//! 기반으로 한 번의 스캔에 필요한 값을 모읍니다. CLI 인자는 빌더로 덮어씁니다.
//!
//! # 사용 예시
//! ```ignore
//! use logchop_core::config::LogchopConfig;
//! use logchop_log_pipeline::config::ScanConfigBuilder;
//!
//! let core_config = LogchopConfig::default();
//! let config = ScanConfigBuilder::from_core(&core_config)?
//!     .target(SourceKind::Auditd)
//!     .build()?;
//! ```

use std::path::PathBuf;

use logchop_core::config::{LogchopConfig, SourcesConfig};
use logchop_core::types::SourceKind;

use crate::error::LogPipelineError;
use crate::sink::OutputFormat;

/// 한 번의 스캔 설정
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// 스캔할 소스 종류
    pub target: SourceKind,
    /// 명시적으로 지정한 로그 파일
    pub file: Option<PathBuf>,
    /// YAML 규칙 디렉토리
    pub rules_dir: PathBuf,
    /// 리포트 출력 형식
    pub output: OutputFormat,
    /// 소스 탐색 설정
    pub sources: SourcesConfig,
    /// BSD syslog 타임스탬프에 적용할 연도 (기본값: 현재 UTC 연도)
    pub reference_year: Option<i32>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from_core_parts(&LogchopConfig::default(), OutputFormat::Table)
    }
}

impl ScanConfig {
    /// core 설정에서 스캔 설정을 생성합니다.
    pub fn from_core(core: &LogchopConfig) -> Result<Self, LogPipelineError> {
        let output = core
            .output
            .format
            .parse::<OutputFormat>()
            .map_err(|reason| LogPipelineError::Config {
                field: "output.format".to_owned(),
                reason,
            })?;
        Ok(Self::from_core_parts(core, output))
    }

    fn from_core_parts(core: &LogchopConfig, output: OutputFormat) -> Self {
        Self {
            target: SourceKind::Syslog,
            file: None,
            rules_dir: PathBuf::from(&core.rules.dir),
            output,
            sources: core.sources.clone(),
            reference_year: None,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if self.rules_dir.as_os_str().is_empty() {
            return Err(LogPipelineError::Config {
                field: "rules.dir".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.target == SourceKind::Journald {
            if let Some(file) = &self.file {
                return Err(LogPipelineError::UnsupportedCombination(format!(
                    "target journald does not accept a file ({})",
                    file.display()
                )));
            }
        }

        if self.sources.syslog_paths.is_empty() {
            return Err(LogPipelineError::Config {
                field: "sources.syslog_paths".to_owned(),
                reason: "at least one candidate path is required".to_owned(),
            });
        }

        Ok(())
    }
}

/// 스캔 설정 빌더
#[derive(Default)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    /// 기본값으로 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// core 설정을 시작점으로 하는 빌더를 생성합니다.
    pub fn from_core(core: &LogchopConfig) -> Result<Self, LogPipelineError> {
        Ok(Self {
            config: ScanConfig::from_core(core)?,
        })
    }

    /// 스캔할 소스 종류를 설정합니다.
    pub fn target(mut self, target: SourceKind) -> Self {
        self.config.target = target;
        self
    }

    /// 명시적 로그 파일을 설정합니다.
    pub fn file(mut self, file: Option<PathBuf>) -> Self {
        self.config.file = file;
        self
    }

    /// 규칙 디렉토리를 설정합니다.
    pub fn rules_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.rules_dir = dir.into();
        self
    }

    /// 출력 형식을 설정합니다.
    pub fn output(mut self, output: OutputFormat) -> Self {
        self.config.output = output;
        self
    }

    /// 소스 탐색 설정을 교체합니다.
    pub fn sources(mut self, sources: SourcesConfig) -> Self {
        self.config.sources = sources;
        self
    }

    /// BSD syslog 기준 연도를 설정합니다.
    pub fn reference_year(mut self, year: i32) -> Self {
        self.config.reference_year = Some(year);
        self
    }

    /// 설정을 검증하고 `ScanConfig`를 생성합니다.
    pub fn build(self) -> Result<ScanConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
