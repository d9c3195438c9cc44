//! External system integrations for issue-mirror.
//!
//! This module provides adapters for the systems a run talks to:
//!
//! - [`github`] - GitHub REST API client (issues, comments, contents)
//! - [`store`] - Object store abstraction with GitHub and local backends
//! - [`fetch`] - Attachment download with host-scoped credentials
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits
//! ([`store::ObjectStore`], [`fetch::AttachmentFetcher`]) so the pipeline can
//! be exercised against in-memory fakes.
//!
//! ```rust,no_run
//! use issue_mirror::adapters::github::GitHubClient;
//! use issue_mirror::adapters::store::{GitHubContentStore, ObjectStore};
//! use issue_mirror::config::{CommitIdentity, GitHubConfig};
//! use issue_mirror::domain::RepoSlug;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(GitHubClient::new(&GitHubConfig::default())?);
//! let store = GitHubContentStore::new(
//!     client,
//!     RepoSlug::new("octo/octo.github.io")?,
//!     CommitIdentity {
//!         name: "Mirror Bot".to_string(),
//!         email: "bot@example.com".to_string(),
//!     },
//! );
//! if let Some(object) = store.get_object("assets/logo.png").await? {
//!     println!("{} at revision {}", object.path, object.revision);
//! }
//! # Ok(())
//! # }
//! ```

pub mod fetch;
pub mod github;
pub mod store;
