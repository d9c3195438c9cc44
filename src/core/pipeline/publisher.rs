//! Publication of the assembled document and the reference table

use super::assemble::{is_blank, Heading};
use super::driver::ReferenceTarget;
use crate::adapters::github::GitHubClient;
use crate::adapters::store::create_object_store;
use crate::config::{MirrorConfig, PublishMode};
use crate::core::store::StoreClient;
use crate::domain::{MirrorError, RepoSlug, Result};
use std::sync::Arc;

/// Where the assembled document goes
pub enum Destination {
    /// Print instead of publishing
    DryRun { mode: PublishMode },
    /// Create or update a file
    File { store: StoreClient, path: String },
    /// Post a comment
    Comment {
        client: Arc<GitHubClient>,
        repository: RepoSlug,
        number: u64,
    },
}

impl Destination {
    pub fn mode(&self) -> PublishMode {
        match self {
            Destination::DryRun { mode } => *mode,
            Destination::File { .. } => PublishMode::File,
            Destination::Comment { .. } => PublishMode::Issue,
        }
    }
}

/// What happened to a published document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Committed { path: String, revision: String },
    Commented { target: String, url: Option<String> },
    Printed,
    Skipped,
}

/// Hands pipeline output to its destinations
pub struct Publisher {
    destination: Destination,
    references: Option<(Arc<GitHubClient>, ReferenceTarget)>,
    skip_if_empty: bool,
}

impl Publisher {
    pub fn new(
        destination: Destination,
        references: Option<(Arc<GitHubClient>, ReferenceTarget)>,
        skip_if_empty: bool,
    ) -> Self {
        Self {
            destination,
            references,
            skip_if_empty,
        }
    }

    /// Builds the publisher for a run
    ///
    /// `source` is the repository the issue was read from; it is the default
    /// target of `mode = "file"` and `mode = "issue"`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the chosen mode lacks its path or
    /// issue number, or a live file store cannot be built.
    pub fn from_config(
        config: &MirrorConfig,
        client: &Arc<GitHubClient>,
        source: &RepoSlug,
    ) -> Result<Self> {
        let publish = &config.publish;
        let repository = publish.repository.clone().unwrap_or_else(|| source.clone());

        let destination = if config.application.dry_run {
            Destination::DryRun { mode: publish.mode }
        } else {
            match publish.mode {
                PublishMode::File => {
                    let path = publish
                        .path
                        .clone()
                        .filter(|p| !p.trim().is_empty())
                        .ok_or_else(|| {
                            MirrorError::Configuration(
                                "publish.path is required when publish.mode = 'file'".to_string(),
                            )
                        })?;
                    let store = create_object_store(config, Some(client), &repository)?;
                    Destination::File {
                        store: StoreClient::new(store, publish.max_push_attempts),
                        path,
                    }
                }
                PublishMode::Issue => {
                    let number = publish.issue_number.ok_or_else(|| {
                        MirrorError::Configuration(
                            "publish.issue_number is required when publish.mode = 'issue'"
                                .to_string(),
                        )
                    })?;
                    Destination::Comment {
                        client: Arc::clone(client),
                        repository,
                        number,
                    }
                }
            }
        };

        let references = if config.application.dry_run {
            None
        } else {
            reference_target(config).map(|target| (Arc::clone(client), target))
        };

        Ok(Self::new(destination, references, publish.skip_if_empty))
    }

    pub fn mode(&self) -> PublishMode {
        self.destination.mode()
    }

    /// Publishes the reference table
    ///
    /// Nothing happens for an empty table. Dry runs print it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when there is a table but no target.
    pub async fn publish_references(&self, table: &str, heading: Option<&Heading>) -> Result<()> {
        if table.is_empty() {
            return Ok(());
        }

        let body = with_heading(table, heading, PublishMode::Issue);

        if let Destination::DryRun { .. } = self.destination {
            println!("====== references (dry run) ======");
            println!("{body}");
            return Ok(());
        }

        let Some((client, target)) = &self.references else {
            return Err(MirrorError::Configuration(
                "A reference table was produced but no reference issue is configured".to_string(),
            ));
        };

        let created = client
            .create_comment(&target.repository, target.issue_number, &body)
            .await?;
        tracing::info!(
            repository = %target.repository,
            issue = target.issue_number,
            comment_id = created.id,
            "Reference table posted"
        );
        Ok(())
    }

    /// Publishes the assembled document
    pub async fn publish_document(
        &self,
        markdown: &str,
        heading: Option<&Heading>,
    ) -> Result<PublishOutcome> {
        if self.skip_if_empty && is_blank(markdown) {
            tracing::info!("Document is empty, skipping publication");
            return Ok(PublishOutcome::Skipped);
        }

        let body = with_heading(markdown, heading, self.mode());

        match &self.destination {
            Destination::DryRun { mode } => {
                println!("====== content (mode = {mode}, dry run) ======");
                println!("{body}");
                Ok(PublishOutcome::Printed)
            }
            Destination::File { store, path } => {
                let existing = store.exists(path).await;
                let message = match &existing {
                    Some(_) => format!("Update {path}"),
                    None => format!("Add {path}"),
                };
                let base = existing.as_ref().map(|object| object.revision.as_str());

                let revision = store.publish(path, body.as_bytes(), &message, base).await?;
                tracing::info!(
                    store = %store.describe(),
                    path = %path,
                    revision = %revision,
                    "Document committed"
                );
                Ok(PublishOutcome::Committed {
                    path: path.clone(),
                    revision,
                })
            }
            Destination::Comment {
                client,
                repository,
                number,
            } => {
                let created = client.create_comment(repository, *number, &body).await?;
                tracing::info!(
                    repository = %repository,
                    issue = number,
                    comment_id = created.id,
                    "Document posted"
                );
                Ok(PublishOutcome::Commented {
                    target: format!("{repository}#{number}"),
                    url: created.html_url,
                })
            }
        }
    }
}

/// Reference issue from the `[redaction]` section
pub fn reference_target(config: &MirrorConfig) -> Option<ReferenceTarget> {
    match (
        &config.redaction.reference_repository,
        config.redaction.reference_issue_number,
    ) {
        (Some(repository), Some(issue_number)) => Some(ReferenceTarget {
            repository: repository.clone(),
            issue_number,
        }),
        _ => None,
    }
}

fn with_heading(body: &str, heading: Option<&Heading>, mode: PublishMode) -> String {
    match heading {
        Some(heading) => format!("{}{body}", heading.render(mode)),
        None => body.to_string(),
    }
}
