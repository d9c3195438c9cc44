//! Publish coordinator - main orchestrator for a run
//!
//! Reads the source issue, runs every document through the pipeline and
//! hands the result to the publisher.

use super::assemble::{assemble, Heading, RenderOptions};
use super::driver::{PipelineDriver, RunContext};
use super::publisher::{reference_target, Publisher};
use super::source::{fetch_issue, IssueSnapshot};
use super::summary::RunSummary;
use crate::adapters::fetch::HttpFetcher;
use crate::adapters::github::GitHubClient;
use crate::adapters::store::create_object_store;
use crate::config::MirrorConfig;
use crate::core::attachments::{AttachmentResolver, ResolutionCache, ResolverSettings};
use crate::core::hashing::RedactionSalt;
use crate::core::redaction::Redactor;
use crate::core::store::StoreClient;
use crate::domain::{MirrorError, RepoSlug, Result};
use std::sync::Arc;
use std::time::Instant;

/// Publish coordinator
pub struct PublishCoordinator {
    config: MirrorConfig,
    client: Arc<GitHubClient>,
    driver: PipelineDriver,
    publisher: Publisher,
    source: RepoSlug,
    issue_number: u64,
}

impl PublishCoordinator {
    /// Create a new coordinator
    ///
    /// Everything that depends only on configuration is built here, so a
    /// missing setting fails the run before any request is made.
    pub fn new(config: MirrorConfig) -> Result<Self> {
        let source = config.source.repository.clone().ok_or_else(|| {
            MirrorError::Configuration("source.repository is required".to_string())
        })?;
        let issue_number = config.source.issue_number.ok_or_else(|| {
            MirrorError::Configuration("source.issue_number is required".to_string())
        })?;

        let client = Arc::new(GitHubClient::new(&config.github)?);
        let driver = PipelineDriver::new(build_context(&config, &client)?);
        let publisher = Publisher::from_config(&config, &client, &source)?;

        tracing::info!(
            source = %source,
            issue = issue_number,
            mode = %publisher.mode(),
            dry_run = config.application.dry_run,
            attachments = config.assets.enabled,
            redaction = driver.context().redactor.is_enabled(),
            "Publish coordinator ready"
        );

        Ok(Self {
            config,
            client,
            driver,
            publisher,
            source,
            issue_number,
        })
    }

    /// Execute the run
    ///
    /// 1. Fetch the issue and its comments
    /// 2. Redact and replicate attachments
    /// 3. Publish the reference table, then the document
    pub async fn execute(&self) -> Result<RunSummary> {
        tracing::info!(source = %self.source, issue = self.issue_number, "Starting publish run");
        let snapshot = fetch_issue(&self.client, &self.source, self.issue_number).await?;
        self.process_snapshot(snapshot).await
    }

    /// Runs an already fetched issue through the pipeline and publishes it
    pub async fn process_snapshot(&self, snapshot: IssueSnapshot) -> Result<RunSummary> {
        let start_time = Instant::now();
        let mut summary = RunSummary::new();
        let publish = &self.config.publish;

        let snapshot = if publish.skip_body {
            snapshot.without_body()
        } else {
            snapshot
        };
        let heading = publish.with_title.then(|| Heading {
            title: snapshot.title.clone(),
            url: snapshot.html_url.clone(),
        });

        summary.documents = snapshot.documents.len();
        let output = self.driver.process(snapshot.documents).await?;
        summary.private_spans = output.spans.len();
        summary.attachments = self.driver.resolver_counts();

        let markdown = assemble(&output.documents, &RenderOptions::from_config(publish));

        self.publisher
            .publish_references(&output.reference_table, heading.as_ref())
            .await?;
        summary.references_published = !output.reference_table.is_empty();

        let outcome = self
            .publisher
            .publish_document(&markdown, heading.as_ref())
            .await?;
        summary.outcome = Some(outcome);

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }
}

/// Builds the per-run context: one salt, one resolution cache
///
/// # Errors
///
/// Returns a configuration error when attachments are enabled but their
/// repository, directory or committer identity is missing.
pub fn build_context(config: &MirrorConfig, client: &Arc<GitHubClient>) -> Result<RunContext> {
    let salt = RedactionSalt::generate(config.redaction.hash_rounds);
    let redactor = Redactor::from_config(&config.redaction, salt);

    let resolver = if config.assets.enabled {
        let settings = ResolverSettings::from_config(config)?;
        let repository = config.assets.repository.as_ref().ok_or_else(|| {
            MirrorError::Configuration(
                "assets.repository is required when assets.enabled = true".to_string(),
            )
        })?;
        let store = create_object_store(config, Some(client), repository)?;
        let fetcher = Arc::new(HttpFetcher::new(&config.github)?);

        Some(AttachmentResolver::new(
            settings,
            fetcher,
            StoreClient::new(store, config.publish.max_push_attempts),
            Arc::new(ResolutionCache::new()),
        )?)
    } else {
        None
    };

    let context = RunContext::new(redactor, resolver);
    if config.application.dry_run {
        Ok(context)
    } else {
        Ok(context.with_reference_target(reference_target(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dry_run_config() -> MirrorConfig {
        let mut config = MirrorConfig::default();
        config.application.dry_run = true;
        config.source.repository = Some("octo/notes".parse().unwrap());
        config.source.issue_number = Some(7);
        config
    }

    #[test]
    fn test_new_requires_source() {
        let mut config = dry_run_config();
        config.source.issue_number = None;

        let err = PublishCoordinator::new(config).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_assets_require_repository() {
        let mut config = dry_run_config();
        config.assets.enabled = true;
        config.assets.directory = Some("assets".to_string());

        let err = PublishCoordinator::new(config).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_dry_run_context_has_no_reference_requirement() {
        let config = dry_run_config();
        let client = Arc::new(GitHubClient::new(&config.github).unwrap());

        let context = build_context(&config, &client).unwrap();
        assert!(!context.references_required);
        assert!(context.resolver.is_none());
    }
}
