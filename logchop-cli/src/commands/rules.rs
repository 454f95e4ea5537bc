//! `logchop rules` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use logchop_core::config::LogchopConfig;
use logchop_log_pipeline::rule::{RuleLoader, RuleStatus, YamlRuleset};

use crate::cli::{RulesAction, RulesArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub fn execute(args: RulesArgs, config_path: &Path) -> Result<(), CliError> {
    let writer = OutputWriter::new(args.format);
    match args.action {
        RulesAction::List { path, status } => {
            let dir = resolve_dir(path, config_path)?;
            execute_list(&dir, status, &writer)
        }
        RulesAction::Validate { path } => {
            let dir = resolve_dir(path, config_path)?;
            execute_validate(&dir, &writer)
        }
    }
}

/// Use the explicit directory, falling back to `rules.dir` from config.
fn resolve_dir(path: Option<PathBuf>, config_path: &Path) -> Result<PathBuf, CliError> {
    match path {
        Some(path) => Ok(path),
        None => {
            let config = LogchopConfig::load_or_default(config_path)?;
            Ok(PathBuf::from(config.rules.dir))
        }
    }
}

fn status_name(status: &RuleStatus) -> &'static str {
    match status {
        RuleStatus::Enabled => "enabled",
        RuleStatus::Disabled => "disabled",
        RuleStatus::Test => "test",
    }
}

fn execute_list(
    dir: &Path,
    status_filter: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(rules_dir = %dir.display(), "loading detection rules");

    let report = list_rules(dir, status_filter.as_deref())?;
    writer.render(&report)
}

fn list_rules(dir: &Path, status_filter: Option<&str>) -> Result<RuleListReport, CliError> {
    if let Some(filter) = status_filter {
        if !["enabled", "disabled", "test"].contains(&filter) {
            return Err(CliError::Command(format!(
                "unknown status: {filter} (expected: enabled, disabled, test)"
            )));
        }
    }

    let mut rules: Vec<RuleEntry> = RuleLoader::load_directory(dir)?
        .into_iter()
        .filter(|r| status_filter.is_none_or(|filter| status_name(&r.status) == filter))
        .map(|r| RuleEntry {
            status: status_name(&r.status).to_owned(),
            id: r.id,
            title: r.title,
            level: r.level,
            author: r.author,
            tags: r.tags,
        })
        .collect();
    rules.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(RuleListReport {
        path: dir.display().to_string(),
        total: rules.len(),
        rules,
    })
}

fn execute_validate(dir: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %dir.display(), "validating detection rules");

    let report = validate_rules(dir)?;
    writer.render(&report)?;

    if report.invalid > 0 {
        return Err(CliError::Rule(format!(
            "{} of {} rule files are invalid",
            report.invalid, report.total_files
        )));
    }

    Ok(())
}

/// Load every rule file individually and collect per-file errors.
///
/// Regex conditions are compiled as part of validation. Duplicate ids are
/// reported against the later file.
fn validate_rules(dir: &Path) -> Result<RuleValidationReport, CliError> {
    let files = RuleLoader::rule_files(dir)?;

    let mut ruleset = YamlRuleset::new();
    let mut errors = Vec::new();

    for file in &files {
        let outcome = RuleLoader::load_file(file).and_then(|rule| ruleset.add_rule(rule));
        if let Err(e) = outcome {
            errors.push(RuleFileError {
                file: file.display().to_string(),
                error: e.to_string(),
            });
        }
    }

    Ok(RuleValidationReport {
        path: dir.display().to_string(),
        total_files: files.len(),
        valid: files.len() - errors.len(),
        invalid: errors.len(),
        errors,
    })
}

#[derive(Serialize)]
pub struct RuleListReport {
    pub path: String,
    pub total: usize,
    pub rules: Vec<RuleEntry>,
}

#[derive(Serialize)]
pub struct RuleEntry {
    pub id: String,
    pub title: String,
    pub level: String,
    pub status: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl Render for RuleListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Detection Rules in {} ({} total)",
            self.path.bold(),
            self.total.to_string().bold()
        )?;
        writeln!(w)?;
        writeln!(
            w,
            "{:<32} {:<36} {:<10} {:<10} Tags",
            "ID", "Title", "Level", "Status"
        )?;
        writeln!(w, "{}", "-".repeat(100))?;

        for r in &self.rules {
            let status_colored = match r.status.as_str() {
                "enabled" => r.status.green(),
                "disabled" => r.status.yellow(),
                _ => r.status.normal(),
            };

            writeln!(
                w,
                "{:<32} {:<36} {:<10} {:<10} {}",
                r.id,
                r.title,
                r.level,
                status_colored,
                r.tags.join(", ")
            )?;
        }

        Ok(())
    }
}

#[derive(Serialize)]
pub struct RuleValidationReport {
    pub path: String,
    pub total_files: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<RuleFileError>,
}

#[derive(Serialize)]
pub struct RuleFileError {
    pub file: String,
    pub error: String,
}

impl Render for RuleValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rule Validation: {}", self.path.bold())?;
        writeln!(
            w,
            "  Files: {} total, {} valid, {} invalid",
            self.total_files,
            self.valid.to_string().green(),
            if self.invalid > 0 {
                self.invalid.to_string().red()
            } else {
                self.invalid.to_string().normal()
            }
        )?;

        if !self.errors.is_empty() {
            writeln!(w)?;
            writeln!(w, "Errors:")?;
            for e in &self.errors {
                writeln!(w, "  {}: {}", e.file.red(), e.error)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_rule(dir: &Path, name: &str, id: &str, status: &str) {
        let yaml = format!(
            "id: {id}\ntitle: Rule {id}\nauthor: tester\nlevel: low\nstatus: {status}\ndetection:\n  keywords:\n    - sshd\ntags:\n  - t1\n"
        );
        fs::write(dir.join(name), yaml).expect("should write rule");
    }

    #[test]
    fn test_validate_counts_valid_and_invalid_files() {
        let dir = TempDir::new().expect("should create temp dir");
        write_rule(dir.path(), "a.yml", "rule_a", "enabled");
        write_rule(dir.path(), "b.yml", "rule_a", "enabled");
        fs::write(dir.path().join("c.yaml"), "not: [valid").expect("should write");
        fs::write(
            dir.path().join("d.yml"),
            "id: bad_regex\ntitle: Bad\ndetection:\n  conditions:\n    - field: message\n      modifier: regex\n      value: \"[unclosed\"\n",
        )
        .expect("should write");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("should write");

        let report = validate_rules(dir.path()).expect("directory exists");
        assert_eq!(report.total_files, 4);
        assert_eq!(report.valid, 1);
        assert_eq!(report.invalid, 3);
        assert!(report.errors.iter().any(|e| e.error.contains("duplicate")));
        assert!(report.errors.iter().any(|e| e.file.ends_with("d.yml")));
    }

    #[test]
    fn test_validate_missing_directory_is_rule_error() {
        let err = validate_rules(Path::new("/nonexistent/logchop/rules"))
            .err()
            .expect("missing directory should fail");
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_list_filters_by_status() {
        let dir = TempDir::new().expect("should create temp dir");
        write_rule(dir.path(), "a.yml", "rule_a", "enabled");
        write_rule(dir.path(), "b.yml", "rule_b", "disabled");
        write_rule(dir.path(), "c.yml", "rule_c", "test");

        let all = list_rules(dir.path(), None).expect("should list");
        assert_eq!(all.total, 3);

        let disabled = list_rules(dir.path(), Some("disabled")).expect("should list");
        assert_eq!(disabled.total, 1);
        assert_eq!(disabled.rules[0].id, "rule_b");
        assert_eq!(disabled.rules[0].level, "low");
    }

    #[test]
    fn test_list_rejects_unknown_status() {
        let dir = TempDir::new().expect("should create temp dir");
        assert!(list_rules(dir.path(), Some("archived")).is_err());
    }

    #[test]
    fn test_validation_report_renders_errors() {
        let report = RuleValidationReport {
            path: "/rules".to_owned(),
            total_files: 2,
            valid: 1,
            invalid: 1,
            errors: vec![RuleFileError {
                file: "/rules/bad.yml".to_owned(),
                error: "YAML parse error".to_owned(),
            }],
        };
        let mut out = Vec::new();
        report.render_text(&mut out).expect("render should succeed");
        let out = String::from_utf8(out).expect("valid UTF-8");
        assert!(out.contains("Errors:"));
        assert!(out.contains("YAML parse error"));
    }
}
