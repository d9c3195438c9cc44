//! Object store factory
//!
//! Picks the store backend for a target repository based on configuration.

use super::{GitHubContentStore, LocalDirStore, ObjectStore};
use crate::adapters::github::GitHubClient;
use crate::config::MirrorConfig;
use crate::domain::{MirrorError, RepoSlug, Result};
use std::sync::Arc;

/// Create the object store writing to `repo`
///
/// Dry runs get a [`LocalDirStore`] rooted at `assets.local_output_dir` so
/// nothing leaves the machine. Otherwise the repository is written through
/// the GitHub contents API with the configured committer identity.
///
/// # Errors
///
/// Returns a configuration error if a live store is requested without a
/// GitHub client or committer identity.
pub fn create_object_store(
    config: &MirrorConfig,
    client: Option<&Arc<GitHubClient>>,
    repo: &RepoSlug,
) -> Result<Arc<dyn ObjectStore>> {
    if config.application.dry_run {
        tracing::info!(
            repository = %repo,
            directory = %config.assets.local_output_dir,
            "Dry run: writing to local directory"
        );
        return Ok(Arc::new(LocalDirStore::new(&config.assets.local_output_dir)));
    }

    let client = client.ok_or_else(|| {
        MirrorError::Configuration(format!("No GitHub client available to write to {repo}"))
    })?;
    let identity = config.committer.identity().ok_or_else(|| {
        MirrorError::Configuration(format!(
            "committer.name and committer.email are required to write to {repo}"
        ))
    })?;

    tracing::info!(repository = %repo, "Creating GitHub content store");
    Ok(Arc::new(GitHubContentStore::new(
        Arc::clone(client),
        repo.clone(),
        identity,
    )))
}
