//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the issue-mirror configuration file.

use crate::config::{load_config_unvalidated, MirrorConfig, PublishMode};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Load configuration
        let config = match load_config_unvalidated(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Validate configuration
        match config.validate() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                println!();
                print_overview(&config);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2) // Configuration error exit code
            }
        }
    }
}

fn print_overview(config: &MirrorConfig) {
    let or_unset = |value: Option<String>| value.unwrap_or_else(|| "(not set)".to_string());

    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!("  GitHub API: {}", config.github.api_base_url);
    println!(
        "  Source: {}#{}",
        or_unset(config.source.repository.as_ref().map(ToString::to_string)),
        or_unset(config.source.issue_number.map(|n| n.to_string()))
    );

    match config.redaction.markers() {
        Some((start, end)) => {
            println!("  Redaction: {start} ... {end}");
            println!(
                "  Reference Issue: {}#{}",
                or_unset(
                    config
                        .redaction
                        .reference_repository
                        .as_ref()
                        .map(ToString::to_string)
                ),
                or_unset(config.redaction.reference_issue_number.map(|n| n.to_string()))
            );
        }
        None => println!("  Redaction: disabled"),
    }

    if config.assets.enabled {
        println!(
            "  Asset Repository: {}",
            or_unset(config.assets.repository.as_ref().map(ToString::to_string))
        );
        println!("  Asset Directory: {}", or_unset(config.assets.directory.clone()));
        println!("  Public Base: {}", or_unset(config.assets.public_base()));
        println!("  Compression: {}", config.assets.compression.enabled);
    } else {
        println!("  Attachments: not replicated");
    }

    println!("  Publish Mode: {}", config.publish.mode);
    match config.publish.mode {
        PublishMode::File => {
            println!("  Publish Path: {}", or_unset(config.publish.path.clone()))
        }
        PublishMode::Issue => println!(
            "  Publish Issue: {}",
            or_unset(config.publish.issue_number.map(|n| n.to_string()))
        ),
    }
    println!("  Max Push Attempts: {}", config.publish.max_push_attempts);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_valid_dry_run_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[application]\ndry_run = true\n\n[source]\nrepository = \"octo/notes\"\nissue_number = 3\n"
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_validate_reports_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[redaction]\nstart_marker = \"<private>\"\n").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
