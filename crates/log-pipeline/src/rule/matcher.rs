//! 규칙 매칭 로직 -- 조건 평가, 키워드 검색, 정규식 캐싱
//!
//! [`RuleMatcher`]는 규칙의 조건을 [`Event`]에 대해 평가합니다.
//! 정규식 패턴과 소문자 키워드는 규칙 로딩 시 한 번만 준비하여 캐싱합니다.

use std::collections::HashMap;

use logchop_core::event::Event;
use regex::Regex;

use super::types::{ConditionModifier, DetectionRule, FieldCondition};
use crate::error::LogPipelineError;

/// 규칙 매처 -- 조건 평가 및 정규식 캐싱
///
/// 규칙 로딩 시 정규식을 미리 컴파일하여 매칭 시 재컴파일 오버헤드를 제거합니다.
pub struct RuleMatcher {
    /// 컴파일된 정규식 캐시: (rule_id, condition_index) -> Regex
    regex_cache: HashMap<(String, usize), Regex>,
    /// 소문자로 변환한 키워드: rule_id -> keywords
    keyword_cache: HashMap<String, Vec<String>>,
}

impl RuleMatcher {
    /// 새 매처를 생성합니다.
    pub fn new() -> Self {
        Self {
            regex_cache: HashMap::new(),
            keyword_cache: HashMap::new(),
        }
    }

    /// 규칙의 정규식 조건을 미리 컴파일하고 키워드를 준비합니다.
    ///
    /// 규칙 추가 시 호출하여 정규식 패턴의 유효성을 검증하고 캐싱합니다.
    pub fn compile_rule(&mut self, rule: &DetectionRule) -> Result<(), LogPipelineError> {
        for (idx, condition) in rule.detection.conditions.iter().enumerate() {
            if condition.modifier == ConditionModifier::Regex {
                let regex =
                    Regex::new(&condition.value).map_err(|e| LogPipelineError::RuleValidation {
                        rule_id: rule.id.clone(),
                        reason: format!(
                            "invalid regex in condition[{idx}] for field '{}': {e}",
                            condition.field
                        ),
                    })?;
                self.regex_cache.insert((rule.id.clone(), idx), regex);
            }
        }

        if !rule.detection.keywords.is_empty() {
            self.keyword_cache.insert(
                rule.id.clone(),
                rule.detection
                    .keywords
                    .iter()
                    .map(|k| k.to_lowercase())
                    .collect(),
            );
        }
        Ok(())
    }

    /// 규칙이 이벤트에 매칭되는지 평가합니다.
    ///
    /// 모든 조건이 AND 결합이므로, 하나라도 실패하면 false를 반환합니다.
    /// 키워드가 있으면 그중 하나가 이벤트 키워드의 부분 문자열이어야 합니다 (대소문자 무시).
    pub fn matches(
        &self,
        rule: &DetectionRule,
        event: &dyn Event,
    ) -> Result<bool, LogPipelineError> {
        for (idx, condition) in rule.detection.conditions.iter().enumerate() {
            let matched = match event.select(&condition.field) {
                Some(value) => self.evaluate_condition(condition, value, &rule.id, idx)?,
                None => false, // 필드가 없으면 매칭 실패
            };

            if !matched {
                return Ok(false); // AND 로직: 하나라도 실패하면 전체 실패
            }
        }

        if rule.detection.keywords.is_empty() {
            return Ok(true);
        }

        let keywords = self.keyword_cache.get(&rule.id).ok_or_else(|| {
            LogPipelineError::RuleMatch(format!("keywords not compiled for rule '{}'", rule.id))
        })?;

        Ok(Self::any_keyword(keywords, event))
    }

    /// 이벤트 키워드 중 하나라도 규칙 키워드를 포함하는지 검사합니다.
    fn any_keyword(keywords: &[String], event: &dyn Event) -> bool {
        event.keywords().into_iter().any(|token| {
            let token = token.to_lowercase();
            keywords.iter().any(|k| token.contains(k.as_str()))
        })
    }

    /// 단일 조건을 평가합니다.
    fn evaluate_condition(
        &self,
        condition: &FieldCondition,
        field_value: &str,
        rule_id: &str,
        condition_idx: usize,
    ) -> Result<bool, LogPipelineError> {
        match condition.modifier {
            ConditionModifier::Exact => Ok(field_value == condition.value),

            ConditionModifier::Contains => Ok(field_value.contains(&condition.value)),

            ConditionModifier::StartsWith => Ok(field_value.starts_with(&condition.value)),

            ConditionModifier::EndsWith => Ok(field_value.ends_with(&condition.value)),

            ConditionModifier::Regex => {
                let regex = self
                    .regex_cache
                    .get(&(rule_id.to_owned(), condition_idx))
                    .ok_or_else(|| {
                        LogPipelineError::RuleMatch(format!(
                            "regex not compiled for rule '{rule_id}' condition[{condition_idx}]"
                        ))
                    })?;
                Ok(regex.is_match(field_value))
            }
        }
    }
}

impl Default for RuleMatcher {
    fn default() -> Self {
        Self::new()
    }
}
