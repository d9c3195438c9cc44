//! Object store backed by a GitHub repository

use super::{ObjectStore, StoredObject};
use crate::adapters::github::GitHubClient;
use crate::config::CommitIdentity;
use crate::domain::{RepoSlug, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Stores objects as files on a repository's default branch
///
/// Revisions are blob shas, which the contents API requires when replacing
/// an existing file.
pub struct GitHubContentStore {
    client: Arc<GitHubClient>,
    repo: RepoSlug,
    identity: CommitIdentity,
}

impl GitHubContentStore {
    pub fn new(client: Arc<GitHubClient>, repo: RepoSlug, identity: CommitIdentity) -> Self {
        Self {
            client,
            repo,
            identity,
        }
    }

    pub fn repository(&self) -> &RepoSlug {
        &self.repo
    }
}

#[async_trait]
impl ObjectStore for GitHubContentStore {
    fn describe(&self) -> String {
        format!("github:{}", self.repo)
    }

    async fn get_object(&self, path: &str) -> Result<Option<StoredObject>> {
        let Some(content) = self.client.get_content(&self.repo, path).await? else {
            return Ok(None);
        };

        let bytes = content.decoded_bytes()?;
        if bytes.is_none() {
            tracing::debug!(
                path = %content.path,
                sha = %content.sha,
                "Content too large to inline"
            );
        }
        Ok(Some(StoredObject {
            path: content.path,
            revision: content.sha,
            bytes,
        }))
    }

    async fn create_or_update(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        base_revision: Option<&str>,
    ) -> Result<String> {
        self.client
            .put_content(&self.repo, path, bytes, message, &self.identity, base_revision)
            .await
    }

    async fn is_archived(&self) -> Result<bool> {
        let repository = self.client.get_repository(&self.repo).await?;
        Ok(repository.archived)
    }
}
