//! Loading the source issue and its comment thread

use crate::adapters::github::GitHubClient;
use crate::domain::{RepoSlug, Result, SourceDocument};

/// An issue as read from the tracker
#[derive(Debug, Clone)]
pub struct IssueSnapshot {
    pub repository: RepoSlug,
    pub number: u64,
    pub title: String,
    pub html_url: Option<String>,

    /// Issue body first, then comments oldest first
    pub documents: Vec<SourceDocument>,
}

impl IssueSnapshot {
    /// Drops the issue body, keeping only comments
    pub fn without_body(mut self) -> Self {
        self.documents.retain(|doc| !doc.is_issue_body());
        self
    }
}

/// Reads an issue and every page of its comments
pub async fn fetch_issue(
    client: &GitHubClient,
    repository: &RepoSlug,
    number: u64,
) -> Result<IssueSnapshot> {
    let issue = client.get_issue(repository, number).await?;
    let mut comments = client.list_comments(repository, number).await?;
    comments.sort_by_key(|c| c.created_at);

    tracing::info!(
        repository = %repository,
        issue = number,
        comments = comments.len(),
        "Loaded source issue"
    );

    let mut documents = Vec::with_capacity(comments.len() + 1);
    documents.push(
        SourceDocument::issue_body(issue.body.unwrap_or_default()).created(issue.created_at),
    );
    documents.extend(
        comments
            .into_iter()
            .map(|c| SourceDocument::comment(c.body.unwrap_or_default(), Some(c.created_at))),
    );

    Ok(IssueSnapshot {
        repository: repository.clone(),
        number,
        title: issue.title,
        html_url: issue.html_url,
        documents,
    })
}
