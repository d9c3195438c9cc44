//! GitHub REST API client
//!
//! Thin wrapper around the handful of endpoints issue-mirror needs: reading
//! an issue and its comments, posting comments, reading repository metadata
//! and creating or updating files through the contents API.
//!
//! # Example
//!
//! ```no_run
//! use issue_mirror::adapters::github::GitHubClient;
//! use issue_mirror::config::GitHubConfig;
//! use issue_mirror::domain::{MirrorError, RepoSlug};
//!
//! # async fn example() -> issue_mirror::domain::Result<()> {
//! let client = GitHubClient::new(&GitHubConfig::default())?;
//! let repo: RepoSlug = "octo/notes".parse().map_err(MirrorError::Validation)?;
//! let issue = client.get_issue(&repo, 7).await?;
//! let comments = client.list_comments(&repo, 7).await?;
//! println!("{} has {} comments", issue.title, comments.len());
//! # Ok(())
//! # }
//! ```

pub mod models;

use crate::config::{bearer_value, CommitIdentity, GitHubConfig, SecretString};
use crate::domain::{GitHubError, MirrorError, RepoSlug, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

pub use models::{
    CommentResponse, ContentResponse, CreatedCommentResponse, GitIdentity, IssueResponse,
    PutContentRequest, PutContentResponse, RepositoryResponse,
};

/// Page size used for comment listing (GitHub's maximum)
pub const COMMENTS_PER_PAGE: usize = 100;

const GITHUB_JSON: &str = "application/vnd.github+json";

/// Client for the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    token: Option<SecretString>,
    user_agent: String,
}

impl GitHubClient {
    /// Creates a client from the `[github]` configuration section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API base URL does not parse or
    /// the HTTP client cannot be built.
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let api_base = Url::parse(&config.api_base_url).map_err(|e| {
            MirrorError::Configuration(format!(
                "Invalid github.api_base_url '{}': {e}",
                config.api_base_url
            ))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(MirrorError::Configuration(format!(
                "github.api_base_url '{}' cannot be used as a base URL",
                config.api_base_url
            )));
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                MirrorError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_base,
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Base URL all endpoints are resolved against
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Fetches repository metadata
    pub async fn get_repository(&self, repo: &RepoSlug) -> Result<RepositoryResponse> {
        let url = self.endpoint(&["repos", repo.owner(), repo.repo()])?;
        let resp = self
            .send(self.client.get(url), &format!("repository {repo}"))
            .await?;
        decode_json(resp).await
    }

    /// Fetches a single issue
    pub async fn get_issue(&self, repo: &RepoSlug, number: u64) -> Result<IssueResponse> {
        let number = number.to_string();
        let url = self.endpoint(&["repos", repo.owner(), repo.repo(), "issues", &number])?;
        let resp = self
            .send(self.client.get(url), &format!("issue {repo}#{number}"))
            .await?;
        decode_json(resp).await
    }

    /// Fetches one page of an issue's comments (1-based page index)
    pub async fn list_comments_page(
        &self,
        repo: &RepoSlug,
        number: u64,
        page: u32,
    ) -> Result<Vec<CommentResponse>> {
        let number_str = number.to_string();
        let mut url = self.endpoint(&[
            "repos",
            repo.owner(),
            repo.repo(),
            "issues",
            &number_str,
            "comments",
        ])?;
        url.query_pairs_mut()
            .append_pair("per_page", &COMMENTS_PER_PAGE.to_string())
            .append_pair("page", &page.to_string());

        let resp = self
            .send(
                self.client.get(url),
                &format!("comments of {repo}#{number} (page {page})"),
            )
            .await?;
        decode_json(resp).await
    }

    /// Fetches every comment of an issue, walking pages until a short one
    pub async fn list_comments(&self, repo: &RepoSlug, number: u64) -> Result<Vec<CommentResponse>> {
        let mut comments = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.list_comments_page(repo, number, page).await?;
            let len = batch.len();
            comments.extend(batch);

            tracing::debug!(
                repository = %repo,
                issue = number,
                page = page,
                count = len,
                "Fetched comment page"
            );

            if len < COMMENTS_PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(comments)
    }

    /// Posts a comment on an issue
    pub async fn create_comment(
        &self,
        repo: &RepoSlug,
        number: u64,
        body: &str,
    ) -> Result<CreatedCommentResponse> {
        let number_str = number.to_string();
        let url = self.endpoint(&[
            "repos",
            repo.owner(),
            repo.repo(),
            "issues",
            &number_str,
            "comments",
        ])?;
        let request = self
            .client
            .post(url)
            .json(&models::CreateCommentRequest { body });
        let resp = self
            .send(request, &format!("new comment on {repo}#{number}"))
            .await?;
        decode_json(resp).await
    }

    /// Reads a file through the contents API
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub async fn get_content(&self, repo: &RepoSlug, path: &str) -> Result<Option<ContentResponse>> {
        let url = self.contents_url(repo, path)?;
        let request = self.decorate(self.client.get(url));

        let resp = request.send().await.map_err(|e| {
            MirrorError::GitHub(GitHubError::ConnectionFailed(format!(
                "{repo}/{path}: {e}"
            )))
        })?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => decode_json(resp).await.map(Some),
            status => Err(status_error(status, resp, &format!("content {repo}/{path}")).await),
        }
    }

    /// Creates or updates a file through the contents API
    ///
    /// `sha` must be the blob sha of the current file when updating and
    /// `None` when creating. Returns the sha of the new blob.
    pub async fn put_content(
        &self,
        repo: &RepoSlug,
        path: &str,
        bytes: &[u8],
        message: &str,
        identity: &CommitIdentity,
        sha: Option<&str>,
    ) -> Result<String> {
        let url = self.contents_url(repo, path)?;
        let body = PutContentRequest {
            message: message.to_string(),
            content: general_purpose::STANDARD.encode(bytes),
            sha: sha.map(str::to_string),
            committer: GitIdentity::from(identity),
            author: GitIdentity::from(identity),
        };

        let resp = self
            .send(self.client.put(url).json(&body), &format!("{repo}/{path}"))
            .await?;
        let written: PutContentResponse = decode_json(resp).await?;
        Ok(written.content.sha)
    }

    fn contents_url(&self, repo: &RepoSlug, path: &str) -> Result<Url> {
        let mut segments = vec!["repos", repo.owner(), repo.repo(), "contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        self.endpoint(&segments)
    }

    /// Joins path segments onto the API base, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                MirrorError::Configuration(format!(
                    "github.api_base_url '{}' cannot be used as a base URL",
                    self.api_base
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, GITHUB_JSON);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, bearer_value(token)),
            None => request,
        }
    }

    /// Sends a request and turns any non-2xx status into a [`GitHubError`]
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let resp = self.decorate(request).send().await.map_err(|e| {
            MirrorError::GitHub(GitHubError::ConnectionFailed(format!("{what}: {e}")))
        })?;

        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status();
            Err(status_error(status, resp, what).await)
        }
    }
}

async fn status_error(status: StatusCode, resp: Response, what: &str) -> MirrorError {
    let body = resp.text().await.unwrap_or_default();
    MirrorError::GitHub(GitHubError::from_status(
        status.as_u16(),
        format!("{what}: {body}"),
    ))
}

async fn decode_json<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T> {
    resp.json::<T>()
        .await
        .map_err(|e| MirrorError::GitHub(GitHubError::InvalidResponse(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> GitHubClient {
        let config = GitHubConfig {
            api_base_url: base.to_string(),
            ..Default::default()
        };
        GitHubClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client_for("https://api.github.com");
        let url = client.endpoint(&["repos", "octo", "notes", "issues", "7"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/octo/notes/issues/7");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client_for("https://ghe.example.com/api/v3/");
        let url = client.endpoint(&["repos", "octo", "notes"]).unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/octo/notes");
    }

    #[test]
    fn test_contents_url_splits_path() {
        let client = client_for("https://api.github.com");
        let repo = RepoSlug::new("octo/site").unwrap();
        let url = client.contents_url(&repo, "assets/my image.png").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/site/contents/assets/my%20image.png"
        );
    }

    #[test]
    fn test_new_rejects_invalid_base() {
        let config = GitHubConfig {
            api_base_url: "not a url".to_string(),
            ..Default::default()
        };
        let err = GitHubClient::new(&config).unwrap_err();
        assert!(err.is_configuration());
    }
}
