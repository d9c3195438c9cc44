//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for issue-mirror using clap.

pub mod commands;

use crate::config::loader::load_config_unvalidated;
use crate::config::LoggingConfig;
use clap::{Parser, Subcommand};

/// Issue Mirror - republish issue threads with replicated attachments
#[derive(Parser, Debug)]
#[command(name = "issue-mirror")]
#[command(version, about, long_about = None)]
#[command(author = "Issue Mirror Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "issue-mirror.toml",
        env = "ISSUE_MIRROR_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ISSUE_MIRROR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level and file logging settings for this invocation
    ///
    /// `publish` takes them from `[application]` and `[logging]`, with
    /// `--log-level` winning over the file. Other commands log to the
    /// console only, as does `publish` when those sections cannot be loaded;
    /// the command itself then reports the configuration problem.
    pub fn logging_settings(&self) -> (String, LoggingConfig) {
        let from_file = match self.command {
            Commands::Publish(_) => load_config_unvalidated(&self.config)
                .ok()
                .filter(|c| c.application.validate().is_ok() && c.logging.validate().is_ok()),
            _ => None,
        };

        match from_file {
            Some(config) => (
                self.log_level.clone().unwrap_or(config.application.log_level),
                config.logging,
            ),
            None => (
                self.log_level.clone().unwrap_or_else(|| "info".to_string()),
                LoggingConfig::default(),
            ),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redact, replicate attachments and publish an issue thread
    Publish(commands::publish::PublishArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const FILE_LOGGING: &str = r#"
[application]
log_level = "debug"

[logging]
local_enabled = true
local_path = "/var/log/issue-mirror"
local_rotation = "hourly"
"#;

    #[test]
    fn test_cli_parse_publish() {
        let cli = Cli::parse_from(["issue-mirror", "publish"]);
        assert_eq!(cli.config, "issue-mirror.toml");
        assert!(matches!(cli.command, Commands::Publish(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["issue-mirror", "--config", "custom.toml", "publish"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["issue-mirror", "--log-level", "debug", "publish"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_publish_overrides() {
        let cli = Cli::parse_from([
            "issue-mirror",
            "publish",
            "--dry-run",
            "--issue",
            "42",
            "--repository",
            "octo/notes",
        ]);
        let Commands::Publish(args) = cli.command else {
            panic!("expected publish");
        };
        assert!(args.dry_run);
        assert_eq!(args.issue, Some(42));
        assert_eq!(args.repository.as_deref(), Some("octo/notes"));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["issue-mirror", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["issue-mirror", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_publish_logging_comes_from_config() {
        let file = config_file(FILE_LOGGING);
        let path = file.path().to_str().unwrap();

        let cli = Cli::parse_from(["issue-mirror", "--config", path, "publish"]);
        let (level, logging) = cli.logging_settings();

        assert_eq!(level, "debug");
        assert!(logging.local_enabled);
        assert_eq!(logging.local_path, "/var/log/issue-mirror");
        assert_eq!(logging.local_rotation, "hourly");
    }

    #[test]
    fn test_log_level_flag_wins_over_config() {
        let file = config_file(FILE_LOGGING);
        let path = file.path().to_str().unwrap();

        let cli = Cli::parse_from(["issue-mirror", "-c", path, "-l", "warn", "publish"]);
        let (level, logging) = cli.logging_settings();

        assert_eq!(level, "warn");
        assert!(logging.local_enabled);
    }

    #[test]
    fn test_other_commands_log_to_console_only() {
        let file = config_file(FILE_LOGGING);
        let path = file.path().to_str().unwrap();

        let cli = Cli::parse_from(["issue-mirror", "--config", path, "validate-config"]);
        let (level, logging) = cli.logging_settings();

        assert_eq!(level, "info");
        assert!(!logging.local_enabled);
    }

    #[test]
    fn test_unusable_logging_section_falls_back_to_console() {
        let missing = Cli::parse_from(["issue-mirror", "--config", "/nonexistent.toml", "publish"]);
        assert!(!missing.logging_settings().1.local_enabled);

        let file = config_file(
            "[application]\nlog_level = \"loud\"\n\n[logging]\nlocal_enabled = true\n",
        );
        let path = file.path().to_str().unwrap();
        let invalid = Cli::parse_from(["issue-mirror", "--config", path, "publish"]);
        let (level, logging) = invalid.logging_settings();

        assert_eq!(level, "info");
        assert!(!logging.local_enabled);
    }
}
