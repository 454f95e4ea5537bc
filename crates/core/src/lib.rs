//! logchop 공통 크레이트
//!
//! 로그 소스 어댑터, 룰 엔진, CLI가 공유하는 타입과 trait을 정의합니다.
//!
//! - [`event`]: 룰 매처가 의존하는 이벤트 capability ([`Event`])
//! - [`pipeline`]: 룰 엔진 포트 ([`RuleEngine`], [`Ruleset`])
//! - [`config`]: `logchop.toml` 설정
//! - [`error`]: 도메인 에러 타입
//! - [`metrics`]: 메트릭 이름 상수
//! - [`types`]: 공통 도메인 타입

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, LogchopError, ParseError, RuleError, SourceError};

// 설정
pub use config::LogchopConfig;

// 이벤트
pub use event::Event;

// 파이프라인 trait
pub use pipeline::{MatchResult, RuleEngine, RuleHit, Ruleset};

// 도메인 타입
pub use types::SourceKind;
