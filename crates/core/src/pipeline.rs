//! 파이프라인 trait -- 룰 엔진 포트 정의
//!
//! 룰 매칭 엔진은 외부 협력자입니다. 코어는 [`RuleEngine`]과 [`Ruleset`]
//! 두 trait만 알고 있으므로 테스트에서는 스텁 엔진으로 대체할 수 있습니다.

use std::path::Path;

use crate::error::LogchopError;
use crate::event::Event;

/// 룰 엔진 -- 디렉토리에서 룰셋을 로드합니다.
pub trait RuleEngine {
    /// 로드된 룰셋 타입
    type Ruleset: Ruleset;

    /// 규칙 디렉토리를 로드합니다. 실패하면 스캔 전체가 중단됩니다.
    fn load(&self, dir: &Path) -> Result<Self::Ruleset, LogchopError>;
}

/// 로드된 룰셋 -- 이벤트 하나를 모든 규칙에 대해 평가합니다.
pub trait Ruleset {
    /// 하나 이상의 규칙이 매칭되면 `Some`을 반환합니다.
    fn evaluate(&self, event: &dyn Event) -> Option<MatchResult>;

    /// 로드된 규칙 수
    fn rule_count(&self) -> usize;
}

/// 규칙 하나의 매칭 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    /// 규칙 ID
    pub id: String,
    /// 규칙 제목
    pub title: String,
    /// 작성자
    pub author: String,
    /// 분류 태그
    pub tags: Vec<String>,
}

impl RuleHit {
    /// 태그를 `-`로 연결한 문자열을 반환합니다.
    pub fn joined_tags(&self) -> String {
        self.tags.join("-")
    }
}

/// 이벤트 하나에 대한 매칭 결과 -- 비어 있지 않은 hit 목록
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    hits: Vec<RuleHit>,
}

impl MatchResult {
    /// hit 목록이 비어 있으면 `None`을 반환합니다.
    pub fn new(hits: Vec<RuleHit>) -> Option<Self> {
        if hits.is_empty() {
            None
        } else {
            Some(Self { hits })
        }
    }

    /// 리포트에 사용되는 첫 번째 hit
    pub fn first(&self) -> &RuleHit {
        // new()에서 비어 있지 않음을 보장
        &self.hits[0]
    }

    /// 전체 hit 목록
    pub fn hits(&self) -> &[RuleHit] {
        &self.hits
    }
}
