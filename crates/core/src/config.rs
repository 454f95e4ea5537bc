//! 설정 관리 -- logchop.toml 파싱 및 런타임 설정
//!
//! [`LogchopConfig`]는 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGCHOP_RULES_DIR=/etc/logchop/rules` 형식)
//! 3. 설정 파일 (`logchop.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), logchop_core::error::LogchopError> {
//! use logchop_core::config::LogchopConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogchopConfig::load("logchop.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogchopConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogchopError};

/// logchop 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogchopConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 소스 탐색 설정
    #[serde(default)]
    pub sources: SourcesConfig,
    /// 탐지 규칙 설정
    #[serde(default)]
    pub rules: RulesConfig,
    /// 리포트 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
}

impl LogchopConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LogchopError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에 환경변수 오버라이드를 적용해 반환합니다.
    ///
    /// 기본 경로의 설정 파일은 선택 사항이므로 CLI가 사용합니다.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, LogchopError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LogchopError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogchopError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogchopError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogchopError> {
        toml::from_str(toml_str).map_err(|e| {
            LogchopError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGCHOP_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "LOGCHOP_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGCHOP_GENERAL_LOG_FORMAT");

        override_string(
            &mut self.sources.auditd_config,
            "LOGCHOP_SOURCES_AUDITD_CONFIG",
        );
        override_string(
            &mut self.sources.auditd_default_log,
            "LOGCHOP_SOURCES_AUDITD_DEFAULT_LOG",
        );
        override_csv(&mut self.sources.syslog_paths, "LOGCHOP_SOURCES_SYSLOG_PATHS");
        override_string(
            &mut self.sources.journalctl_bin,
            "LOGCHOP_SOURCES_JOURNALCTL_BIN",
        );

        override_string(&mut self.rules.dir, "LOGCHOP_RULES_DIR");

        override_string(&mut self.output.format, "LOGCHOP_OUTPUT_FORMAT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogchopError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.sources.syslog_paths.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "sources.syslog_paths".to_owned(),
                reason: "at least one candidate path is required".to_owned(),
            }
            .into());
        }

        if self.sources.auditd_default_log.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "sources.auditd_default_log".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.rules.dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "rules.dir".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        let valid_outputs = ["table", "csv", "json"];
        if !valid_outputs.contains(&self.output.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "output.format".to_owned(),
                reason: format!("must be one of: {}", valid_outputs.join(", ")),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 로그 소스 탐색 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// auditd 데몬 설정 파일 경로
    pub auditd_config: String,
    /// auditd.conf에 `log_file`이 없을 때 사용할 감사 로그 경로
    pub auditd_default_log: String,
    /// syslog 후보 경로 (앞에서부터 존재하는 첫 파일 사용)
    pub syslog_paths: Vec<String>,
    /// journalctl 실행 파일
    pub journalctl_bin: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            auditd_config: "/etc/audit/auditd.conf".to_owned(),
            auditd_default_log: "/var/log/audit/audit.log".to_owned(),
            syslog_paths: vec!["/var/log/syslog".to_owned(), "/var/log/messages".to_owned()],
            journalctl_bin: "journalctl".to_owned(),
        }
    }
}

/// 탐지 규칙 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// YAML 규칙 디렉토리
    pub dir: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            dir: "rules/linux/builtin/syslog".to_owned(),
        }
    }
}

/// 리포트 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 출력 형식 (table, csv, json)
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "table".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        if val.trim().is_empty() {
            warn!(env_key, "empty value in env var, ignoring");
            return;
        }
        *target = val;
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = LogchopConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.sources.auditd_config, "/etc/audit/auditd.conf");
        assert_eq!(
            config.sources.syslog_paths,
            vec!["/var/log/syslog", "/var/log/messages"]
        );
        assert_eq!(config.output.format, "table");
    }

    #[test]
    fn default_config_passes_validation() {
        LogchopConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = LogchopConfig::parse("").unwrap();
        assert_eq!(config.rules.dir, "rules/linux/builtin/syslog");
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let config = LogchopConfig::parse(
            r#"
[rules]
dir = "/etc/logchop/rules"

[sources]
syslog_paths = ["/tmp/custom.log"]
"#,
        )
        .unwrap();
        assert_eq!(config.rules.dir, "/etc/logchop/rules");
        assert_eq!(config.sources.syslog_paths, vec!["/tmp/custom.log"]);
        assert_eq!(config.sources.journalctl_bin, "journalctl");
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = LogchopConfig::parse("[general\nlog_level = ");
        assert!(matches!(
            result,
            Err(LogchopError::Config(ConfigError::ParseFailed { .. }))
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = LogchopConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("general.log_level"));
    }

    #[test]
    fn validate_rejects_invalid_output_format() {
        let mut config = LogchopConfig::default();
        config.output.format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }

    #[test]
    fn validate_rejects_empty_syslog_candidates() {
        let mut config = LogchopConfig::default();
        config.sources.syslog_paths.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_LOGCHOP_STR", "overridden") };
        override_string(&mut val, "TEST_LOGCHOP_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_LOGCHOP_STR") };
    }

    #[test]
    #[serial]
    fn env_override_blank_string_keeps_original() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_LOGCHOP_BLANK", "  ") };
        override_string(&mut val, "TEST_LOGCHOP_BLANK");
        assert_eq!(val, "original");
        unsafe { std::env::remove_var("TEST_LOGCHOP_BLANK") };
    }

    #[test]
    #[serial]
    fn env_override_csv() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_LOGCHOP_CSV", "/var/log/a, /var/log/b,") };
        override_csv(&mut val, "TEST_LOGCHOP_CSV");
        assert_eq!(val, vec!["/var/log/a", "/var/log/b"]);
        unsafe { std::env::remove_var("TEST_LOGCHOP_CSV") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_LOGCHOP_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = LogchopConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = LogchopConfig::parse(&toml_str).unwrap();
        assert_eq!(config.sources.syslog_paths, parsed.sources.syslog_paths);
        assert_eq!(config.rules.dir, parsed.rules.dir);
    }

    #[test]
    fn from_file_not_found() {
        let result = LogchopConfig::from_file("/nonexistent/path/logchop.toml");
        assert!(matches!(
            result,
            Err(LogchopError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    #[serial]
    fn load_or_default_without_file_uses_defaults() {
        let config = LogchopConfig::load_or_default("/nonexistent/path/logchop.toml").unwrap();
        assert_eq!(config.output.format, "table");
    }
}
