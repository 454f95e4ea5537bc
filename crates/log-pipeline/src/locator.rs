//! 로그 소스 탐색 -- 소스 종류별로 읽을 물리 로그를 결정합니다.
//!
//! # 소스별 정책
//! - auditd: 명시 경로 -> `auditd.conf`의 `log_file` -> 기본 경로
//! - syslog: 명시 경로 -> 후보 경로 중 존재하는 첫 파일 (`/var/log/syslog`, `/var/log/messages`)
//! - journald: 경로 없음, 로컬 저널 핸들. 파일 지정은 지원하지 않는 조합으로 거부
//!
//! 후보가 모두 없을 때의 실패는 이 레이어에서 검사하지 않고 열기 시점에 드러납니다.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use logchop_core::config::SourcesConfig;
use logchop_core::types::SourceKind;
use tracing::{debug, warn};

use crate::error::LogPipelineError;

/// 해석된 로그 소스 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSource {
    /// auditd 감사 로그 파일
    AuditLog(PathBuf),
    /// 라인 기반 syslog 파일
    SyslogFile(PathBuf),
    /// 로컬 systemd 저널
    Journal,
}

impl RawSource {
    /// 사람이 읽을 수 있는 소스 설명 (로그 및 진단 메시지용)
    pub fn describe(&self) -> String {
        match self {
            Self::AuditLog(path) | Self::SyslogFile(path) => path.display().to_string(),
            Self::Journal => "local journal".to_owned(),
        }
    }
}

/// 로그 소스 탐색기
#[derive(Debug, Clone)]
pub struct LogLocator {
    /// auditd 데몬 설정 파일
    auditd_config: PathBuf,
    /// `log_file` 옵션이 없을 때 사용할 감사 로그
    auditd_default_log: PathBuf,
    /// syslog 후보 경로 (순서대로 시도)
    syslog_candidates: Vec<PathBuf>,
}

impl LogLocator {
    /// core 설정의 `[sources]` 섹션에서 탐색기를 생성합니다.
    pub fn from_config(config: &SourcesConfig) -> Self {
        Self {
            auditd_config: PathBuf::from(&config.auditd_config),
            auditd_default_log: PathBuf::from(&config.auditd_default_log),
            syslog_candidates: config.syslog_paths.iter().map(PathBuf::from).collect(),
        }
    }

    /// auditd 설정 파일 경로를 변경합니다.
    pub fn with_auditd_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.auditd_config = path.into();
        self
    }

    /// auditd 기본 감사 로그 경로를 변경합니다.
    pub fn with_auditd_default_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.auditd_default_log = path.into();
        self
    }

    /// syslog 후보 경로를 변경합니다.
    pub fn with_syslog_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.syslog_candidates = candidates;
        self
    }

    /// 소스 종류와 선택적 명시 경로로부터 읽을 소스를 결정합니다.
    ///
    /// # Errors
    /// - 명시 경로가 존재하지 않는 경우 `SourceNotFound`
    /// - journald에 명시 경로를 준 경우 `UnsupportedCombination`
    pub fn locate(
        &self,
        kind: SourceKind,
        explicit: Option<&Path>,
    ) -> Result<RawSource, LogPipelineError> {
        match kind {
            SourceKind::Auditd => {
                let path = match explicit {
                    Some(path) => Self::require_existing(path)?,
                    None => self.find_audit_log(),
                };
                Ok(RawSource::AuditLog(path))
            }
            SourceKind::Syslog => {
                let path = match explicit {
                    Some(path) => Self::require_existing(path)?,
                    None => self.find_syslog(),
                };
                Ok(RawSource::SyslogFile(path))
            }
            SourceKind::Journald => match explicit {
                Some(path) => Err(LogPipelineError::UnsupportedCombination(format!(
                    "target journald does not accept a file ({})",
                    path.display()
                ))),
                None => Ok(RawSource::Journal),
            },
        }
    }

    /// auditd.conf에서 `log_file` 값을 찾고, 없으면 기본 경로를 반환합니다.
    ///
    /// 설정 파일을 열 수 없는 경우에도 스캔을 실패시키지 않고 기본 경로를 사용합니다.
    pub fn find_audit_log(&self) -> PathBuf {
        let file = match File::open(&self.auditd_config) {
            Ok(file) => file,
            Err(e) => {
                warn!(
                    path = %self.auditd_config.display(),
                    error = %e,
                    "cannot open auditd config, using default audit log"
                );
                return self.auditd_default_log.clone();
            }
        };

        match Self::parse_log_file_option(BufReader::new(file)) {
            Some(path) => PathBuf::from(path),
            None => {
                debug!(
                    path = %self.auditd_config.display(),
                    "log_file not set in auditd config, using default"
                );
                self.auditd_default_log.clone()
            }
        }
    }

    /// 후보 중 존재하는 첫 syslog 파일을 반환합니다. 없으면 마지막 후보를 반환합니다.
    pub fn find_syslog(&self) -> PathBuf {
        self.syslog_candidates
            .iter()
            .find(|path| path.exists())
            .or_else(|| self.syslog_candidates.last())
            .cloned()
            .unwrap_or_default()
    }

    /// `key = value` 형식의 auditd 설정에서 `log_file` 값을 추출합니다.
    fn parse_log_file_option(reader: impl BufRead) -> Option<String> {
        reader
            .lines()
            .map_while(Result::ok)
            .find_map(|line| {
                let line = line.trim();
                if line.starts_with('#') {
                    return None;
                }
                let (key, value) = line.split_once('=')?;
                let value = value.trim();
                (key.trim() == "log_file" && !value.is_empty()).then(|| value.to_owned())
            })
    }

    fn require_existing(path: &Path) -> Result<PathBuf, LogPipelineError> {
        std::fs::metadata(path).map_err(|_| LogPipelineError::SourceNotFound {
            path: path.display().to_string(),
        })?;
        Ok(path.to_path_buf())
    }
}

impl Default for LogLocator {
    fn default() -> Self {
        Self::from_config(&SourcesConfig::default())
    }
}
