#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use logchop_core::event::Event;
use logchop_log_pipeline::rule::{
    ConditionModifier, DetectionCondition, DetectionRule, FieldCondition, RuleMatcher, RuleStatus,
};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 규칙 조건 목록 (최대 8개로 제한)
    conditions: Vec<FuzzCondition>,
    /// 키워드 목록 (최대 4개로 제한)
    keywords: Vec<String>,
    /// 매칭 대상 이벤트 필드값
    fields: BTreeMap<FuzzField, String>,
}

#[derive(Arbitrary, Debug)]
struct FuzzCondition {
    field: FuzzField,
    modifier: FuzzModifier,
    value: String,
}

#[derive(Arbitrary, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum FuzzField {
    Message,
    Facility,
    Exe,
    Auid,
}

#[derive(Arbitrary, Debug)]
enum FuzzModifier {
    Exact,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
}

impl FuzzField {
    fn as_str(self) -> &'static str {
        match self {
            FuzzField::Message => "message",
            FuzzField::Facility => "facility",
            FuzzField::Exe => "exe",
            FuzzField::Auid => "AUID",
        }
    }
}

impl FuzzModifier {
    fn to_condition_modifier(&self) -> ConditionModifier {
        match self {
            FuzzModifier::Exact => ConditionModifier::Exact,
            FuzzModifier::Contains => ConditionModifier::Contains,
            FuzzModifier::StartsWith => ConditionModifier::StartsWith,
            FuzzModifier::EndsWith => ConditionModifier::EndsWith,
            FuzzModifier::Regex => ConditionModifier::Regex,
        }
    }
}

struct FuzzEvent(BTreeMap<FuzzField, String>);

impl Event for FuzzEvent {
    fn keywords(&self) -> Vec<&str> {
        self.0.values().map(String::as_str).collect()
    }

    fn select(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(field, _)| field.as_str() == name)
            .map(|(_, value)| value.as_str())
    }
}

fuzz_target!(|input: FuzzInput| {
    // 조건 수 제한 (성능)
    let conditions: Vec<FieldCondition> = input
        .conditions
        .iter()
        .take(8)
        .map(|c| FieldCondition {
            field: c.field.as_str().to_owned(),
            modifier: c.modifier.to_condition_modifier(),
            value: c.value.clone(),
        })
        .collect();
    let keywords: Vec<String> = input.keywords.into_iter().take(4).collect();

    let rule = DetectionRule {
        id: "fuzz_rule".to_owned(),
        title: "Fuzz Rule".to_owned(),
        description: String::new(),
        author: String::new(),
        level: String::new(),
        status: RuleStatus::Enabled,
        detection: DetectionCondition {
            keywords,
            conditions,
        },
        tags: Vec::new(),
    };

    let mut matcher = RuleMatcher::new();

    // compile_rule이 실패해도 크래시는 안 됨
    if matcher.compile_rule(&rule).is_err() {
        return;
    }

    // matches도 크래시 없이 Ok/Err 반환해야 함
    let _ = matcher.matches(&rule, &FuzzEvent(input.fields));
});
