//! Publish command implementation
//!
//! This module implements the `publish` command: read an issue thread,
//! redact private spans, replicate attachments and publish the result.

use crate::config::{load_config_unvalidated, MirrorConfig};
use crate::core::pipeline::{PublishCoordinator, PublishOutcome, RunSummary};
use crate::domain::RepoSlug;
use crate::log_error_with_context;
use clap::Args;

/// Arguments for the publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Dry run mode - write assets locally and print instead of publishing
    #[arg(long)]
    pub dry_run: bool,

    /// Override the source issue number
    #[arg(long, value_name = "N")]
    pub issue: Option<u64>,

    /// Override the source repository (owner/repo)
    #[arg(long, value_name = "OWNER/REPO")]
    pub repository: Option<String>,
}

impl PublishArgs {
    /// Execute the publish command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting publish command");

        let mut config = match load_config_unvalidated(config_path) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            tracing::error!(error = %e, "Invalid command line override");
            eprintln!("{e}");
            return Ok(2);
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        if config.application.dry_run {
            tracing::info!("Dry run mode enabled - nothing will be published");
            println!("🔍 DRY RUN MODE - assets go to {}", config.assets.local_output_dir);
            println!();
        }

        let fail_if_skip = config.publish.fail_if_skip;
        let coordinator = match PublishCoordinator::new(config) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(e, "Failed to create publish coordinator");
                eprintln!("Failed to initialize publish: {e}");
                return Ok(if e.is_configuration() { 2 } else { 1 });
            }
        };

        println!("🚀 Starting publish...");
        println!();

        let summary = match coordinator.execute().await {
            Ok(s) => s,
            Err(e) => {
                log_error_with_context!(e, "Publish failed");
                eprintln!("❌ Publish failed: {e}");
                return Ok(if e.is_configuration() { 2 } else { 1 });
            }
        };

        print_summary(&summary);
        Ok(exit_code(&summary, fail_if_skip))
    }

    /// Applies command line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut MirrorConfig) -> Result<(), String> {
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Some(issue) = self.issue {
            tracing::info!(issue = issue, "Overriding source issue from CLI");
            config.source.issue_number = Some(issue);
        }

        if let Some(repository) = &self.repository {
            let slug: RepoSlug = repository
                .parse()
                .map_err(|e| format!("Invalid --repository: {e}"))?;
            tracing::info!(repository = %slug, "Overriding source repository from CLI");
            config.source.repository = Some(slug);
        }

        Ok(())
    }
}

/// 0 unless publication was skipped and `publish.fail_if_skip` is set
fn exit_code(summary: &RunSummary, fail_if_skip: bool) -> i32 {
    if fail_if_skip && summary.is_skipped() {
        tracing::error!("Publication was skipped and publish.fail_if_skip is set");
        eprintln!("❌ Publication was skipped");
        1
    } else {
        0
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 Publish Summary:");
    println!("  Documents: {}", summary.documents);
    println!("  Private spans: {}", summary.private_spans);
    println!("  Attachments fetched: {}", summary.attachments.fetched);
    println!("  Assets published: {}", summary.attachments.published);
    println!("  Assets reused: {}", summary.attachments.reused);
    println!("  Already replicated: {}", summary.attachments.skipped);
    println!(
        "  Reference table: {}",
        if summary.references_published {
            "published"
        } else {
            "none"
        }
    );
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    match &summary.outcome {
        Some(PublishOutcome::Committed { path, revision }) => {
            println!("✅ Committed {path} ({revision})");
        }
        Some(PublishOutcome::Commented { target, url }) => match url {
            Some(url) => println!("✅ Commented on {target}: {url}"),
            None => println!("✅ Commented on {target}"),
        },
        Some(PublishOutcome::Printed) => println!("✅ Dry run completed!"),
        Some(PublishOutcome::Skipped) => println!("⚠️  Document was empty, nothing published"),
        None => println!("✅ Publish completed!"),
    }
}
