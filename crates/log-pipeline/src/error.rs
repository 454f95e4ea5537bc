//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 소스 탐색, 어댑터, 룰 로딩, 리포트 렌더링 중 발생하는
//! 모든 에러를 표현합니다. `From<LogPipelineError> for LogchopError` 변환이
//! 구현되어 있어 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.
//!
//! 라인 단위로 허용되는 실패(토큰 분리 실패, 5필드 분리 실패)는 어댑터 내부에서
//! 처리되며 이 타입으로 표면화되지 않습니다.

use logchop_core::error::{
    ConfigError, LogchopError, ParseError, RuleError, SourceError,
};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// syslog 라인에서 타임스탬프를 찾지 못함 (스캔 중단)
    #[error("timestamp not found: {path}:{line}")]
    TimestampNotFound {
        /// 로그 파일 경로
        path: String,
        /// 1부터 시작하는 라인 번호
        line: usize,
    },

    /// 명시적으로 지정한 로그 소스가 존재하지 않음
    #[error("log source not found: {path}")]
    SourceNotFound {
        /// 로그 파일 경로
        path: String,
    },

    /// 로그 소스 열기 실패
    #[error("failed to open log source {path}: {reason}")]
    SourceOpen {
        /// 로그 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 저널 열기/탐색/읽기 실패
    #[error("journal error: {0}")]
    Journal(String),

    /// 지원하지 않는 소스/옵션 조합
    #[error("unsupported combination: {0}")]
    UnsupportedCombination(String),

    /// 룰 파일 로딩 실패
    #[error("rule load error: {path}: {reason}")]
    RuleLoad {
        /// 룰 파일 또는 디렉토리 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 룰 유효성 검증 실패
    #[error("rule validation error: rule '{rule_id}': {reason}")]
    RuleValidation {
        /// 문제가 된 룰 ID
        rule_id: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 룰 매칭 중 에러 (컴파일되지 않은 정규식 등)
    #[error("rule match error: {0}")]
    RuleMatch(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 리포트 렌더링 실패 (CSV/JSON)
    #[error("render error: {0}")]
    Render(String),

    /// 룰 엔진 포트에서 전달된 에러
    #[error(transparent)]
    Engine(#[from] LogchopError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<LogPipelineError> for LogchopError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::TimestampNotFound { path, line } => {
                LogchopError::Parse(ParseError::TimestampNotFound { path, line })
            }
            LogPipelineError::SourceNotFound { path } => {
                LogchopError::Source(SourceError::NotFound { path })
            }
            LogPipelineError::SourceOpen { path, reason } => {
                LogchopError::Source(SourceError::Open { path, reason })
            }
            LogPipelineError::Journal(reason) => LogchopError::Source(SourceError::Journal(reason)),
            LogPipelineError::UnsupportedCombination(reason) => {
                LogchopError::Source(SourceError::UnsupportedCombination(reason))
            }
            LogPipelineError::RuleLoad { path, reason } => {
                LogchopError::Rule(RuleError::Load { path, reason })
            }
            LogPipelineError::RuleValidation { rule_id, reason } => {
                LogchopError::Rule(RuleError::Invalid { rule_id, reason })
            }
            LogPipelineError::Config { field, reason } => {
                LogchopError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::Engine(inner) => inner,
            LogPipelineError::Io(e) => LogchopError::Io(e),
            other @ (LogPipelineError::RuleMatch(_)
            | LogPipelineError::Render(_)
            | LogPipelineError::Regex(_)) => LogchopError::Parse(ParseError::Failed {
                format: "pipeline".to_owned(),
                reason: other.to_string(),
            }),
        }
    }
}
