//! Domain models and types for issue-mirror.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`RepoSlug`])
//! - **Document models** ([`SourceDocument`], [`PrivateSpan`], [`AttachmentReference`], [`Asset`])
//! - **Error types** ([`MirrorError`], [`GitHubError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, MirrorError>`]:
//!
//! ```rust
//! use issue_mirror::domain::{MirrorError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = issue_mirror::config::load_config("issue-mirror.toml")?;
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use document::{Asset, AttachmentReference, DocumentKind, PrivateSpan, SourceDocument};
pub use errors::{GitHubError, MirrorError};
pub use ids::RepoSlug;
pub use result::Result;
