//! Configuration management for issue-mirror.
//!
//! issue-mirror reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ISSUE_MIRROR_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation before any network activity
//!
//! # Example Configuration
//!
//! ```toml
//! [github]
//! token = "${GITHUB_TOKEN}"
//!
//! [source]
//! repository = "octo/notes"
//! issue_number = 42
//!
//! [redaction]
//! start_marker = "<private>"
//! end_marker = "</private>"
//! reference_repository = "octo/private-notes"
//! reference_issue_number = 1
//!
//! [assets]
//! enabled = true
//! repository = "octo/octo.github.io"
//! directory = "assets"
//!
//! [assets.compression]
//! enabled = true
//! threshold_bytes = 500000
//!
//! [committer]
//! name = "Mirror Bot"
//! email = "mirror-bot@users.noreply.github.com"
//!
//! [publish]
//! mode = "file"
//! path = "issues/42.md"
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use issue_mirror::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("issue-mirror.toml")?;
//! println!("Publishing as {}", config.publish.mode);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_unvalidated};
pub use schema::{
    ApplicationConfig, AssetsConfig, CommitIdentity, CommitterConfig, CompressionConfig,
    GitHubConfig, LoggingConfig, MirrorConfig, PublishConfig, PublishMode, RedactionConfig,
    SourceConfig,
};
pub use secret::{bearer_value, secret_string, SecretString, SecretValue};
