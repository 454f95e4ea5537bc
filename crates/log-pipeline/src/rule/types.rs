//! 탐지 규칙 데이터 타입
//!
//! YAML 규칙 파일에서 역직렬화되는 구조체들을 정의합니다.

use serde::{Deserialize, Serialize};

use crate::error::LogPipelineError;

/// 규칙 ID 최대 길이
const MAX_RULE_ID_LEN: usize = 256;

/// 탐지 규칙 -- 하나의 YAML 규칙 파일에 대응합니다.
///
/// # YAML 스키마
/// ```yaml
/// id: ssh_invalid_user
/// title: SSH login with invalid user
/// description: Detects login attempts for unknown accounts
/// author: logchop
/// level: medium
/// status: enabled
/// detection:
///   keywords:
///     - invalid user
///   conditions:
///     - field: facility
///       modifier: exact
///       value: auth
/// tags:
///   - attack.credential_access
///   - attack.t1110
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRule {
    /// 규칙 고유 ID (디렉토리 내에서 유일해야 함)
    pub id: String,
    /// 규칙 제목 (리포트 `Title` 열)
    pub title: String,
    /// 규칙 설명
    #[serde(default)]
    pub description: String,
    /// 작성자 (리포트 `Author` 열)
    #[serde(default)]
    pub author: String,
    /// 심각도 레벨 (informational, low, medium, high, critical)
    #[serde(default)]
    pub level: String,
    /// 규칙 상태
    #[serde(default)]
    pub status: RuleStatus,
    /// 탐지 조건
    pub detection: DetectionCondition,
    /// 분류 태그
    #[serde(default)]
    pub tags: Vec<String>,
}

impl DetectionRule {
    /// 규칙의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if self.id.is_empty() {
            return Err(LogPipelineError::RuleValidation {
                rule_id: "(empty)".to_owned(),
                reason: "rule id must not be empty".to_owned(),
            });
        }

        if self.id.len() > MAX_RULE_ID_LEN {
            return Err(LogPipelineError::RuleValidation {
                rule_id: self.id.clone(),
                reason: format!("rule id must not exceed {MAX_RULE_ID_LEN} characters"),
            });
        }

        if self.title.is_empty() {
            return Err(LogPipelineError::RuleValidation {
                rule_id: self.id.clone(),
                reason: "rule title must not be empty".to_owned(),
            });
        }

        if self.detection.keywords.is_empty() && self.detection.conditions.is_empty() {
            return Err(LogPipelineError::RuleValidation {
                rule_id: self.id.clone(),
                reason: "detection must define keywords or conditions".to_owned(),
            });
        }

        if self.detection.keywords.iter().any(|k| k.is_empty()) {
            return Err(LogPipelineError::RuleValidation {
                rule_id: self.id.clone(),
                reason: "keywords must not be empty strings".to_owned(),
            });
        }

        if let Some(condition) = self.detection.conditions.iter().find(|c| c.field.is_empty()) {
            return Err(LogPipelineError::RuleValidation {
                rule_id: self.id.clone(),
                reason: format!("condition on value '{}' has an empty field", condition.value),
            });
        }

        Ok(())
    }
}

/// 규칙 상태
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// 활성화 (기본값)
    #[default]
    Enabled,
    /// 비활성화 (매칭하지 않음)
    Disabled,
    /// 테스트 중인 규칙 (매칭하고 리포트에 포함)
    Test,
}

/// 탐지 조건
///
/// `conditions`는 AND로 결합되고, `keywords`는 하나 이상 일치하면 됩니다.
/// 두 부분이 모두 만족해야 규칙이 매칭됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionCondition {
    /// 이벤트 키워드에 대한 대소문자 무시 부분 문자열 (OR 결합)
    #[serde(default)]
    pub keywords: Vec<String>,
    /// 필드 매칭 조건 목록 (AND 결합)
    #[serde(default)]
    pub conditions: Vec<FieldCondition>,
}

/// 필드 매칭 조건
///
/// 이벤트의 `select(field)` 값에 대한 매칭 조건을 나타냅니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldCondition {
    /// 대상 필드명 (facility, message, exe, AUID 등)
    pub field: String,
    /// 매칭 수정자
    #[serde(default)]
    pub modifier: ConditionModifier,
    /// 매칭할 값
    pub value: String,
}

/// 조건 수정자 -- 매칭 방식을 결정합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionModifier {
    /// 정확히 일치
    #[default]
    Exact,
    /// 부분 문자열 포함
    Contains,
    /// 접두사 일치
    StartsWith,
    /// 접미사 일치
    EndsWith,
    /// 정규식 매칭
    Regex,
}
