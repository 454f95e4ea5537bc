//! 탐지 규칙 엔진 -- YAML 기반 이벤트 매칭
//!
//! core의 [`RuleEngine`](logchop_core::RuleEngine) / [`Ruleset`](logchop_core::Ruleset)
//! 포트를 구현하는 기본 엔진입니다. 간소화된 Sigma 스타일의 YAML 규칙을 로드하여
//! [`Event`]에 대한 패턴 매칭을 수행합니다.
//!
//! # 규칙 형식
//! ```yaml
//! id: ssh_invalid_user
//! title: SSH login with invalid user
//! author: logchop
//! status: enabled
//! detection:
//!   keywords:
//!     - invalid user
//!   conditions:
//!     - field: facility
//!       value: auth
//! tags:
//!   - attack.t1110
//! ```
//!
//! # 아키텍처
//! - [`YamlRuleEngine`]: 디렉토리에서 룰셋 로드
//! - [`YamlRuleset`]: 규칙 관리 및 매칭 코디네이터
//! - [`loader`]: YAML 파일 로딩 및 유효성 검증
//! - [`matcher`]: 조건 매칭 로직 (exact, contains, regex 등)
//! - [`types`]: 규칙 데이터 구조 정의

pub mod loader;
pub mod matcher;
pub mod types;

pub use loader::RuleLoader;
pub use matcher::RuleMatcher;
pub use types::{ConditionModifier, DetectionCondition, DetectionRule, FieldCondition, RuleStatus};

use std::collections::BTreeMap;
use std::path::Path;

use logchop_core::error::LogchopError;
use logchop_core::event::Event;
use logchop_core::metrics::RULES_LOADED;
use logchop_core::pipeline::{MatchResult, RuleEngine, RuleHit, Ruleset};

use crate::error::LogPipelineError;

/// YAML 규칙 엔진 -- 규칙 디렉토리를 [`YamlRuleset`]으로 로드합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlRuleEngine;

impl YamlRuleEngine {
    /// 새 엔진을 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl RuleEngine for YamlRuleEngine {
    type Ruleset = YamlRuleset;

    /// 컴파일할 수 없는 규칙(잘못된 정규식 등)은 경고 로그를 남기고 건너뜁니다.
    /// 디렉토리를 읽을 수 없거나 규칙 수 상한을 넘으면 실패합니다.
    fn load(&self, dir: &Path) -> Result<YamlRuleset, LogchopError> {
        let rules = RuleLoader::load_directory(dir)?;
        let mut ruleset = YamlRuleset::new();
        for rule in rules {
            let rule_id = rule.id.clone();
            if let Err(e) = ruleset.add_rule(rule) {
                tracing::warn!(rule_id = %rule_id, error = %e, "failed to compile rule, skipping");
            }
        }
        metrics::gauge!(RULES_LOADED).set(ruleset.rule_count() as f64);
        Ok(ruleset)
    }
}

/// 로드된 YAML 룰셋
///
/// 규칙은 ID 순으로 보관되므로 매칭 결과의 순서가 결정적입니다.
///
/// # 사용 예시
/// ```ignore
/// let ruleset = YamlRuleEngine::new().load(Path::new("rules/linux/builtin/syslog"))?;
/// if let Some(result) = ruleset.evaluate(&event) {
///     println!("{}", result.first().title);
/// }
/// ```
pub struct YamlRuleset {
    /// 규칙 목록 (ID -> 규칙)
    rules: BTreeMap<String, DetectionRule>,
    /// 컴파일된 매처
    matcher: RuleMatcher,
}

impl YamlRuleset {
    /// 빈 룰셋을 생성합니다.
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
            matcher: RuleMatcher::new(),
        }
    }

    /// 규칙 목록으로 룰셋을 생성합니다.
    pub fn from_rules(rules: Vec<DetectionRule>) -> Result<Self, LogPipelineError> {
        let mut ruleset = Self::new();
        for rule in rules {
            ruleset.add_rule(rule)?;
        }
        Ok(ruleset)
    }

    /// 단일 규칙을 추가합니다.
    pub fn add_rule(&mut self, rule: DetectionRule) -> Result<(), LogPipelineError> {
        rule.validate()?;
        if self.rules.contains_key(&rule.id) {
            return Err(LogPipelineError::RuleValidation {
                rule_id: rule.id,
                reason: "duplicate rule id".to_owned(),
            });
        }
        self.matcher.compile_rule(&rule)?;
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    /// 로드된 규칙 목록 (ID 순)
    pub fn rules(&self) -> impl Iterator<Item = &DetectionRule> {
        self.rules.values()
    }

    /// 이벤트에 매칭되는 모든 활성 규칙을 ID 순으로 반환합니다.
    pub fn matching_rules(
        &self,
        event: &dyn Event,
    ) -> Result<Vec<&DetectionRule>, LogPipelineError> {
        let mut matched = Vec::new();
        for rule in self.rules.values() {
            if rule.status == RuleStatus::Disabled {
                continue;
            }
            if self.matcher.matches(rule, event)? {
                matched.push(rule);
            }
        }
        Ok(matched)
    }

    fn to_hit(rule: &DetectionRule) -> RuleHit {
        RuleHit {
            id: rule.id.clone(),
            title: rule.title.clone(),
            author: rule.author.clone(),
            tags: rule.tags.clone(),
        }
    }
}

impl Default for YamlRuleset {
    fn default() -> Self {
        Self::new()
    }
}

impl Ruleset for YamlRuleset {
    fn evaluate(&self, event: &dyn Event) -> Option<MatchResult> {
        match self.matching_rules(event) {
            Ok(rules) => MatchResult::new(rules.into_iter().map(Self::to_hit).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "rule evaluation failed, treating event as unmatched");
                None
            }
        }
    }

    fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SyslogParser;
    use crate::adapter::syslog::ParsedLine;
    use tempfile::TempDir;

    fn sample_event() -> crate::adapter::SyslogEvent {
        let parser = SyslogParser::new().unwrap().with_reference_year(2024);
        match parser.parse_line("Oct 12 10:00:00 auth: warning host sshd Invalid user admin from 10.0.0.1") {
            ParsedLine::Event(event) => event,
            other => panic!("expected event, got {other:?}"),
        }
    }

    fn rule(id: &str, keyword: &str, status: RuleStatus) -> DetectionRule {
        DetectionRule {
            id: id.to_owned(),
            title: format!("{id} title"),
            description: String::new(),
            author: "tester".to_owned(),
            level: "medium".to_owned(),
            status,
            detection: DetectionCondition {
                keywords: vec![keyword.to_owned()],
                conditions: vec![],
            },
            tags: vec!["attack.t1110".to_owned(), "auth".to_owned()],
        }
    }

    #[test]
    fn ruleset_starts_empty() {
        let ruleset = YamlRuleset::new();
        assert_eq!(ruleset.rule_count(), 0);
        assert!(ruleset.evaluate(&sample_event()).is_none());
    }

    #[test]
    fn add_rule_compiles_and_counts() {
        let mut ruleset = YamlRuleset::new();
        ruleset
            .add_rule(rule("test_rule", "invalid user", RuleStatus::Enabled))
            .unwrap();
        assert_eq!(ruleset.rule_count(), 1);
        assert!(ruleset.evaluate(&sample_event()).is_some());
    }

    #[test]
    fn duplicate_rule_is_rejected() {
        let mut ruleset = YamlRuleset::new();
        ruleset.add_rule(rule("dup", "x", RuleStatus::Enabled)).unwrap();
        assert!(ruleset.add_rule(rule("dup", "y", RuleStatus::Enabled)).is_err());
    }

    #[test]
    fn hits_are_ordered_by_rule_id() {
        let ruleset = YamlRuleset::from_rules(vec![
            rule("zeta", "invalid", RuleStatus::Enabled),
            rule("alpha", "admin", RuleStatus::Enabled),
        ])
        .unwrap();

        let result = ruleset.evaluate(&sample_event()).unwrap();
        let ids: Vec<_> = result.hits().iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
        assert_eq!(result.first().joined_tags(), "attack.t1110-auth");
        assert_eq!(result.first().author, "tester");
    }

    #[test]
    fn disabled_rules_never_fire_and_test_rules_do() {
        let ruleset = YamlRuleset::from_rules(vec![
            rule("off", "invalid", RuleStatus::Disabled),
            rule("trial", "invalid", RuleStatus::Test),
        ])
        .unwrap();

        let result = ruleset.evaluate(&sample_event()).unwrap();
        assert_eq!(result.hits().len(), 1);
        assert_eq!(result.first().id, "trial");
        assert_eq!(ruleset.rule_count(), 2);
    }

    #[test]
    fn engine_loads_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("ssh.yml"),
            "id: ssh_invalid\ntitle: Invalid SSH user\ndetection:\n  keywords:\n    - invalid user\n",
        )
        .unwrap();

        let ruleset = YamlRuleEngine::new().load(dir.path()).unwrap();
        assert_eq!(ruleset.rule_count(), 1);
        assert!(ruleset.evaluate(&sample_event()).is_some());
    }

    #[test]
    fn engine_skips_rule_with_invalid_regex() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("a_good.yml"),
            "id: ssh_invalid\ntitle: Invalid SSH user\ndetection:\n  keywords:\n    - invalid user\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b_bad.yml"),
            "id: bad_regex\ntitle: Bad\ndetection:\n  conditions:\n    - field: message\n      modifier: regex\n      value: \"([\"\n",
        )
        .unwrap();

        let ruleset = YamlRuleEngine::new().load(dir.path()).unwrap();
        assert_eq!(ruleset.rule_count(), 1);
        let result = ruleset.evaluate(&sample_event()).unwrap();
        assert_eq!(result.first().id, "ssh_invalid");
    }

    #[test]
    fn engine_missing_directory_is_rule_error() {
        let err = YamlRuleEngine::new()
            .load(Path::new("/nonexistent/rules"))
            .err()
            .unwrap();
        assert!(matches!(err, LogchopError::Rule(_)));
    }
}
