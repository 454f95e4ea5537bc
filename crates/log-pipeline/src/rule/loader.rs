//! 규칙 파일 로더 -- YAML 규칙 파일을 디스크에서 로드합니다.
//!
//! 규칙 디렉토리(하위 디렉토리 포함) 내의 `.yml`/`.yaml` 파일을 경로 순으로 스캔하고 파싱합니다.
//! 개별 파일 파싱 실패는 경고 로그를 남기고 건너뜁니다.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::LogPipelineError;

use super::types::DetectionRule;

/// 규칙 파일 로더 설정
const MAX_RULE_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB
const MAX_RULES_COUNT: usize = 10_000;

/// 규칙 파일 로더
pub struct RuleLoader;

impl RuleLoader {
    /// 디렉토리에서 모든 YAML 규칙 파일을 로드합니다.
    ///
    /// `.yml` 또는 `.yaml` 확장자를 가진 파일만 처리합니다.
    /// 개별 파일 로딩 실패는 경고 로그를 남기고 건너뜁니다.
    /// 규칙이 하나도 없는 디렉토리는 빈 목록을 반환합니다.
    ///
    /// # Errors
    /// - 디렉토리를 읽을 수 없는 경우
    /// - 규칙 수가 `MAX_RULES_COUNT`를 초과하는 경우
    pub fn load_directory(dir: impl AsRef<Path>) -> Result<Vec<DetectionRule>, LogPipelineError> {
        let dir = dir.as_ref();
        let files = Self::rule_files(dir)?;

        let mut rules = Vec::new();
        let mut seen_ids = HashSet::new();

        for path in files {
            match Self::load_file(&path) {
                Ok(rule) => {
                    // 중복 ID 검사
                    if !seen_ids.insert(rule.id.clone()) {
                        tracing::warn!(
                            rule_id = %rule.id,
                            path = %path.display(),
                            "duplicate rule id, skipping"
                        );
                        continue;
                    }
                    rules.push(rule);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load rule file, skipping"
                    );
                }
            }

            if rules.len() > MAX_RULES_COUNT {
                return Err(LogPipelineError::RuleLoad {
                    path: dir.display().to_string(),
                    reason: format!("too many rules: max {MAX_RULES_COUNT}"),
                });
            }
        }

        tracing::info!(
            dir = %dir.display(),
            count = rules.len(),
            "loaded detection rules"
        );

        Ok(rules)
    }

    /// 디렉토리(하위 디렉토리 포함)의 YAML 규칙 파일 경로를 경로 순으로 반환합니다.
    pub fn rule_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, LogPipelineError> {
        let mut files = Vec::new();
        Self::collect_yaml_files(dir.as_ref(), &mut files)?;
        files.sort();
        Ok(files)
    }

    /// 디렉토리를 재귀적으로 순회하며 YAML 파일 경로를 수집합니다.
    fn collect_yaml_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), LogPipelineError> {
        let entries = std::fs::read_dir(dir).map_err(|e| LogPipelineError::RuleLoad {
            path: dir.display().to_string(),
            reason: format!("failed to read directory: {e}"),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| LogPipelineError::RuleLoad {
                path: dir.display().to_string(),
                reason: format!("failed to read directory entry: {e}"),
            })?;
            let path = entry.path();

            if path.is_dir() {
                Self::collect_yaml_files(&path, files)?;
                continue;
            }

            // .yml / .yaml 확장자만 처리
            let is_yaml = path
                .extension()
                .is_some_and(|ext| ext == "yml" || ext == "yaml");
            if is_yaml {
                files.push(path);
            }
        }

        Ok(())
    }

    /// 단일 YAML 파일에서 규칙을 로드합니다.
    pub fn load_file(path: impl AsRef<Path>) -> Result<DetectionRule, LogPipelineError> {
        let path = path.as_ref();

        // 파일 크기 검증
        let metadata = std::fs::metadata(path).map_err(|e| LogPipelineError::RuleLoad {
            path: path.display().to_string(),
            reason: format!("failed to read file metadata: {e}"),
        })?;

        if metadata.len() > MAX_RULE_FILE_SIZE {
            return Err(LogPipelineError::RuleLoad {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_RULE_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| LogPipelineError::RuleLoad {
            path: path.display().to_string(),
            reason: format!("failed to read file: {e}"),
        })?;

        Self::parse_yaml(&content, &path.display().to_string())
    }

    /// YAML 문자열을 파싱하여 규칙을 생성합니다.
    pub fn parse_yaml(yaml_str: &str, source: &str) -> Result<DetectionRule, LogPipelineError> {
        let rule: DetectionRule =
            serde_yaml::from_str(yaml_str).map_err(|e| LogPipelineError::RuleLoad {
                path: source.to_owned(),
                reason: format!("YAML parse error: {e}"),
            })?;

        // 유효성 검증
        rule.validate()?;

        Ok(rule)
    }
}
