//! CLI-specific error types and exit code mapping

use logchop_core::error::LogchopError;
use logchop_log_pipeline::LogPipelineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Log source missing, unreadable, or not valid for the target.
    #[error("log source error: {0}")]
    Source(String),

    /// Rule directory could not be loaded or contains invalid rules.
    #[error("rule error: {0}")]
    Rule(String),

    /// A log line could not be parsed and the scan was aborted.
    #[error("parse error: {0}")]
    Parse(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                         |
    /// |------|-------------------------------------------------|
    /// | 0    | Success                                         |
    /// | 1    | General / command error                         |
    /// | 2    | Configuration error                             |
    /// | 3    | Log source unavailable or unsupported target    |
    /// | 4    | Rule load failure                               |
    /// | 5    | Scan aborted on an unparsable line              |
    /// | 10   | IO error                                        |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Source(_) => 3,
            Self::Rule(_) => 4,
            Self::Parse(_) => 5,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<LogchopError> for CliError {
    fn from(e: LogchopError) -> Self {
        match e {
            LogchopError::Config(inner) => Self::Config(inner.to_string()),
            LogchopError::Source(inner) => Self::Source(inner.to_string()),
            LogchopError::Rule(inner) => Self::Rule(inner.to_string()),
            LogchopError::Parse(inner) => Self::Parse(inner.to_string()),
            LogchopError::Io(inner) => Self::Io(inner),
        }
    }
}

impl From<LogPipelineError> for CliError {
    fn from(e: LogPipelineError) -> Self {
        match e {
            LogPipelineError::Engine(inner) => inner.into(),
            LogPipelineError::Io(inner) => Self::Io(inner),
            LogPipelineError::Config { .. } => Self::Config(e.to_string()),
            LogPipelineError::SourceNotFound { .. }
            | LogPipelineError::SourceOpen { .. }
            | LogPipelineError::Journal(_)
            | LogPipelineError::UnsupportedCombination(_) => Self::Source(e.to_string()),
            LogPipelineError::RuleLoad { .. } | LogPipelineError::RuleValidation { .. } => {
                Self::Rule(e.to_string())
            }
            LogPipelineError::TimestampNotFound { .. } => Self::Parse(e.to_string()),
            LogPipelineError::RuleMatch(_)
            | LogPipelineError::Render(_)
            | LogPipelineError::Regex(_) => Self::Command(e.to_string()),
        }
    }
}
