//! GitHub REST API payloads
//!
//! Only the fields issue-mirror reads or writes are modelled.

use crate::config::CommitIdentity;
use crate::domain::{GitHubError, Result};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryResponse {
    pub full_name: String,
    #[serde(default)]
    pub archived: bool,
}

/// Author of an issue or comment
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub login: String,
}

/// `GET /repos/{owner}/{repo}/issues/{number}`
#[derive(Debug, Clone, Deserialize)]
pub struct IssueResponse {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub user: Option<UserResponse>,
}

/// One entry of `GET /repos/{owner}/{repo}/issues/{number}/comments`
#[derive(Debug, Clone, Deserialize)]
pub struct CommentResponse {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<UserResponse>,
}

/// `POST /repos/{owner}/{repo}/issues/{number}/comments` response
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedCommentResponse {
    pub id: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// `GET /repos/{owner}/{repo}/contents/{path}` for a file
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl ContentResponse {
    /// Decodes the base64 payload, which GitHub wraps at 60 columns
    ///
    /// Files over 1 MB come back with `encoding: "none"` and no content;
    /// those decode to `Ok(None)`.
    pub fn decoded_bytes(&self) -> Result<Option<Vec<u8>>> {
        match self.encoding.as_deref() {
            Some("base64") | None => {}
            Some("none") => return Ok(None),
            Some(other) => {
                return Err(GitHubError::InvalidResponse(format!(
                    "Unsupported content encoding '{other}' for {}",
                    self.path
                ))
                .into())
            }
        }
        let packed: String = self
            .content
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        general_purpose::STANDARD
            .decode(packed)
            .map(Some)
            .map_err(|e| {
                GitHubError::InvalidResponse(format!("Bad base64 content for {}: {e}", self.path))
                    .into()
            })
    }
}

/// Name and email attached to a commit
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

impl From<&CommitIdentity> for GitIdentity {
    fn from(identity: &CommitIdentity) -> Self {
        Self {
            name: identity.name.clone(),
            email: identity.email.clone(),
        }
    }
}

/// `PUT /repos/{owner}/{repo}/contents/{path}` body
#[derive(Debug, Clone, Serialize)]
pub struct PutContentRequest {
    pub message: String,
    /// Base64 of the file bytes
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    pub committer: GitIdentity,
    pub author: GitIdentity,
}

/// Blob half of the PUT response
#[derive(Debug, Clone, Deserialize)]
pub struct PutContentBlob {
    pub sha: String,
    pub path: String,
}

/// `PUT /repos/{owner}/{repo}/contents/{path}` response
#[derive(Debug, Clone, Deserialize)]
pub struct PutContentResponse {
    pub content: PutContentBlob,
}

/// `POST /repos/{owner}/{repo}/issues/{number}/comments` body
#[derive(Debug, Clone, Serialize)]
pub struct CreateCommentRequest<'a> {
    pub body: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_with_null_body() {
        let json = r#"{
            "number": 7,
            "title": "Notes",
            "body": null,
            "created_at": "2024-05-01T10:00:00Z",
            "user": {"login": "octo"}
        }"#;
        let issue: IssueResponse = serde_json::from_str(json).unwrap();
        assert_eq!(issue.number, 7);
        assert!(issue.body.is_none());
        assert_eq!(issue.user.unwrap().login, "octo");
    }

    #[test]
    fn test_put_request_omits_missing_sha() {
        let identity = GitIdentity {
            name: "Mirror Bot".to_string(),
            email: "bot@example.com".to_string(),
        };
        let request = PutContentRequest {
            message: "Add assets/a.png".to_string(),
            content: "AAEC".to_string(),
            sha: None,
            committer: identity.clone(),
            author: identity,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("sha").is_none());
        assert_eq!(value["committer"]["email"], "bot@example.com");
    }

    #[test]
    fn test_content_decodes_wrapped_base64() {
        let content = ContentResponse {
            path: "issue.md".to_string(),
            sha: "abc".to_string(),
            content: Some("aGVs\nbG8=\n".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(content.decoded_bytes().unwrap().unwrap(), b"hello");
    }

    #[test]
    fn test_large_content_has_no_payload() {
        let content = ContentResponse {
            path: "big.bin".to_string(),
            sha: "abc".to_string(),
            content: Some(String::new()),
            encoding: Some("none".to_string()),
        };
        assert_eq!(content.decoded_bytes().unwrap(), None);
    }

    #[test]
    fn test_content_rejects_unknown_encoding() {
        let content = ContentResponse {
            path: "big.bin".to_string(),
            sha: "abc".to_string(),
            content: None,
            encoding: Some("utf-16".to_string()),
        };
        assert!(content.decoded_bytes().is_err());
    }

    #[test]
    fn test_repository_archived_defaults_false() {
        let repo: RepositoryResponse =
            serde_json::from_str(r#"{"full_name": "octo/site"}"#).unwrap();
        assert!(!repo.archived);
    }
}
