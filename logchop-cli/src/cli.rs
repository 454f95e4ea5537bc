//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use logchop_core::types::SourceKind;
use logchop_log_pipeline::OutputFormat;

/// logchop -- scan Linux auditd, journald and syslog logs against detection rules.
///
/// Use `logchop <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logchop", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logchop.toml configuration file (optional when the default is missing).
    #[arg(short, long, default_value = "logchop.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Format for the `rules` and `config` command output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DisplayFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan one log source and print the matches.
    Scan(ScanArgs),

    /// Manage detection rules.
    Rules(RulesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Log source to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Linux audit daemon log.
    Auditd,
    /// systemd journal (read through journalctl).
    Journald,
    /// Text syslog file.
    Syslog,
}

impl From<Target> for SourceKind {
    fn from(target: Target) -> Self {
        match target {
            Target::Auditd => SourceKind::Auditd,
            Target::Journald => SourceKind::Journald,
            Target::Syslog => SourceKind::Syslog,
        }
    }
}

/// Report format for `scan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Aligned table with a processed-events summary.
    Table,
    /// RFC 4180 CSV with a header row.
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Table => OutputFormat::Table,
            ReportFormat::Csv => OutputFormat::Csv,
            ReportFormat::Json => OutputFormat::Json,
        }
    }
}

/// Scan one log source against a rule directory.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Log source to scan.
    #[arg(short, long, value_enum, default_value = "syslog")]
    pub target: Target,

    /// Directory containing YAML rule files (default: `rules.dir` from config).
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Report format (default: `output.format` from config).
    #[arg(short, long, value_enum)]
    pub out: Option<ReportFormat>,

    /// Read this log file instead of locating one (not valid for journald).
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Year applied to BSD syslog timestamps (default: current UTC year).
    #[arg(long)]
    pub year: Option<i32>,
}

// ---- rules ----

/// Manage detection rules.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: DisplayFormat,

    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List the rules loaded from a directory.
    List {
        /// Directory containing YAML rule files (default: `rules.dir` from config).
        path: Option<PathBuf>,

        /// Filter by status (enabled, disabled, test).
        #[arg(long)]
        status: Option<String>,
    },
    /// Validate every rule file in a directory.
    Validate {
        /// Directory containing YAML rule files (default: `rules.dir` from config).
        path: Option<PathBuf>,
    },
}

// ---- config ----

/// Manage logchop configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: DisplayFormat,

    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, sources, rules, output).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_scan_defaults() {
        let cli = Cli::try_parse_from(["logchop", "scan"]).expect("parse succeeded");
        match cli.command {
            Commands::Scan(scan_args) => {
                assert_eq!(scan_args.target, Target::Syslog);
                assert!(scan_args.rules.is_none(), "rules should default to config");
                assert!(scan_args.out.is_none(), "out should default to config");
                assert!(scan_args.file.is_none());
                assert!(scan_args.year.is_none());
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parse_scan_all_options() {
        let cli = Cli::try_parse_from([
            "logchop",
            "scan",
            "--target",
            "auditd",
            "--rules",
            "/custom/rules",
            "--out",
            "csv",
            "--file",
            "/tmp/audit.log",
            "--year",
            "2023",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Scan(scan_args) => {
                assert_eq!(scan_args.target, Target::Auditd);
                assert_eq!(scan_args.rules, Some(PathBuf::from("/custom/rules")));
                assert_eq!(scan_args.out, Some(ReportFormat::Csv));
                assert_eq!(scan_args.file, Some(PathBuf::from("/tmp/audit.log")));
                assert_eq!(scan_args.year, Some(2023));
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parse_scan_short_flags() {
        let cli = Cli::try_parse_from(["logchop", "scan", "-t", "journald", "-o", "json"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Scan(scan_args) => {
                assert_eq!(scan_args.target, Target::Journald);
                assert_eq!(scan_args.out, Some(ReportFormat::Json));
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parse_scan_rejects_unknown_target() {
        let args = Cli::try_parse_from(["logchop", "scan", "--target", "windows"]);
        assert!(args.is_err(), "unknown target should fail");
    }

    #[test]
    fn test_cli_parse_scan_rejects_unknown_format() {
        let args = Cli::try_parse_from(["logchop", "scan", "--out", "xml"]);
        assert!(args.is_err(), "unknown output format should fail");
    }

    #[test]
    fn test_target_and_format_conversions() {
        assert_eq!(SourceKind::from(Target::Auditd), SourceKind::Auditd);
        assert_eq!(SourceKind::from(Target::Journald), SourceKind::Journald);
        assert_eq!(SourceKind::from(Target::Syslog), SourceKind::Syslog);
        assert_eq!(OutputFormat::from(ReportFormat::Table), OutputFormat::Table);
        assert_eq!(OutputFormat::from(ReportFormat::Csv), OutputFormat::Csv);
        assert_eq!(OutputFormat::from(ReportFormat::Json), OutputFormat::Json);
    }

    #[test]
    fn test_cli_parse_rules_validate_default_path() {
        let cli = Cli::try_parse_from(["logchop", "rules", "validate"]).expect("parse succeeded");
        match cli.command {
            Commands::Rules(rules_args) => {
                assert_eq!(rules_args.format, DisplayFormat::Text);
                match rules_args.action {
                    RulesAction::Validate { path } => assert!(path.is_none()),
                    _ => panic!("expected Validate action"),
                }
            }
            _ => panic!("expected Rules command"),
        }
    }

    #[test]
    fn test_cli_parse_rules_validate_custom_path_json() {
        let cli = Cli::try_parse_from([
            "logchop",
            "rules",
            "validate",
            "/custom/rules",
            "--format",
            "json",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Rules(rules_args) => {
                assert_eq!(rules_args.format, DisplayFormat::Json);
                match rules_args.action {
                    RulesAction::Validate { path } => {
                        assert_eq!(path, Some(PathBuf::from("/custom/rules")));
                    }
                    _ => panic!("expected Validate action"),
                }
            }
            _ => panic!("expected Rules command"),
        }
    }

    #[test]
    fn test_cli_parse_rules_list_with_status_filter() {
        let cli = Cli::try_parse_from(["logchop", "rules", "list", "--status", "enabled"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Rules(rules_args) => match rules_args.action {
                RulesAction::List { path, status } => {
                    assert!(path.is_none());
                    assert_eq!(status, Some("enabled".to_owned()));
                }
                _ => panic!("expected List action"),
            },
            _ => panic!("expected Rules command"),
        }
    }

    #[test]
    fn test_cli_parse_config_validate() {
        let cli = Cli::try_parse_from(["logchop", "config", "validate"]).expect("parse succeeded");
        match cli.command {
            Commands::Config(config_args) => {
                assert!(matches!(config_args.action, ConfigAction::Validate));
            }
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["logchop", "config", "show", "--section", "sources"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Show { section } => {
                    assert_eq!(section, Some("sources".to_owned()));
                }
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_custom_config_path_and_log_level() {
        let cli = Cli::try_parse_from([
            "logchop",
            "-c",
            "/custom/logchop.toml",
            "scan",
            "--log-level",
            "debug",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("/custom/logchop.toml"));
        assert_eq!(cli.log_level, Some("debug".to_owned()));
    }

    #[test]
    fn test_cli_parse_missing_command_fails() {
        let args = Cli::try_parse_from(["logchop"]);
        assert!(args.is_err(), "should fail when no command provided");
    }

    #[test]
    fn test_cli_verify_command_structure() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "logchop");

        let subcommands: Vec<_> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        assert_eq!(subcommands, vec!["scan", "rules", "config"]);
    }
}
