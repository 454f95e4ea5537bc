//! 에러 타입 -- 도메인별 에러 정의

/// logchop 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogchopError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 소스 탐색/열기 에러
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// 탐지 규칙 에러
    #[error("rule error: {0}")]
    Rule(#[from] RuleError),

    /// 파싱 에러 (스캔 중단)
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 로그 소스 에러
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// 명시적으로 지정한 로그 파일이 없음
    #[error("log source not found: {path}")]
    NotFound { path: String },

    /// 로그 소스를 열 수 없음
    #[error("failed to open log source {path}: {reason}")]
    Open { path: String, reason: String },

    /// 저널 열기/탐색/읽기 실패
    #[error("journal error: {0}")]
    Journal(String),

    /// 지원하지 않는 소스/옵션 조합 (예: journald + 파일 지정)
    #[error("unsupported combination: {0}")]
    UnsupportedCombination(String),
}

/// 탐지 규칙 에러
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// 규칙 디렉토리 로딩 실패
    #[error("failed to load ruleset from {path}: {reason}")]
    Load { path: String, reason: String },

    /// 규칙 유효성 검증 실패
    #[error("invalid rule '{rule_id}': {reason}")]
    Invalid { rule_id: String, reason: String },
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 타임스탬프를 인식할 수 없어 라인을 분리할 수 없음
    #[error("{path}:{line}: no recognizable timestamp")]
    TimestampNotFound { path: String, line: usize },

    /// 기타 파싱 실패
    #[error("{format}: {reason}")]
    Failed { format: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_not_found_mentions_path() {
        let err: LogchopError = SourceError::NotFound {
            path: "/var/log/missing.log".to_owned(),
        }
        .into();
        assert!(err.to_string().contains("/var/log/missing.log"));
        assert!(matches!(err, LogchopError::Source(SourceError::NotFound { .. })));
    }

    #[test]
    fn timestamp_not_found_display() {
        let err = ParseError::TimestampNotFound {
            path: "/var/log/syslog".to_owned(),
            line: 7,
        };
        assert_eq!(err.to_string(), "/var/log/syslog:7: no recognizable timestamp");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LogchopError = io_err.into();
        assert!(matches!(err, LogchopError::Io(_)));
    }
}
