//! Document domain models
//!
//! Types flowing through the redaction and attachment pipelines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a unit of content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// The issue body
    IssueBody,
    /// One comment of the thread
    Comment,
}

/// One immutable unit of source markup (issue body or a single comment)
///
/// # Examples
///
/// ```
/// use issue_mirror::domain::document::{DocumentKind, SourceDocument};
///
/// let doc = SourceDocument::issue_body("see ![x](https://h/a.png)");
/// assert_eq!(doc.kind, DocumentKind::IssueBody);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Issue body or comment
    pub kind: DocumentKind,

    /// Markdown/HTML text
    pub text: String,

    /// Creation time reported by the tracker, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SourceDocument {
    /// Creates an issue body document
    pub fn issue_body(text: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::IssueBody,
            text: text.into(),
            created_at: None,
        }
    }

    /// Creates a comment document
    pub fn comment(text: impl Into<String>, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            kind: DocumentKind::Comment,
            text: text.into(),
            created_at,
        }
    }

    /// Sets the creation time
    pub fn created(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn is_issue_body(&self) -> bool {
        self.kind == DocumentKind::IssueBody
    }

    /// Same document with different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            kind: self.kind,
            text: text.into(),
            created_at: self.created_at,
        }
    }
}

/// A redacted span and the public label that replaced it
///
/// `reference` is a display label. Two different raw texts may share one
/// after truncation, so it must never be used as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateSpan {
    /// The matched text, start and end markers included
    pub raw_text: String,

    /// `[^pvt_xxxxxxx]` label substituted into the published text
    pub reference: String,
}

/// Mapping from an attachment URL to where it now lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentReference {
    /// URL as it appeared in the source text
    pub original_url: String,

    /// Public location of the replicated asset (never empty)
    pub resolved_location: String,
}

/// A replicated file ready to be written to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Final (post-transform) bytes
    pub bytes: Vec<u8>,

    /// Extension detected from `bytes`
    pub extension: String,

    /// Hash of the original URL, not of the bytes
    pub content_hash: String,

    /// Store path, `{assets_dir}/{content_hash}.{extension}`
    pub path: String,
}

impl Asset {
    /// Builds the content-addressed store path for a hash and extension
    pub fn path_for(assets_dir: &str, content_hash: &str, extension: &str) -> String {
        let dir = assets_dir.trim_matches('/');
        if dir.is_empty() {
            format!("{content_hash}.{extension}")
        } else {
            format!("{dir}/{content_hash}.{extension}")
        }
    }
}
