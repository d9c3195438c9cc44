//! Configuration schema types
//!
//! This module defines the configuration structure for issue-mirror.

use crate::config::SecretString;
use crate::domain::ids::RepoSlug;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Where the assembled document is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Commit the document as a markdown file
    #[default]
    File,
    /// Post the document as an issue comment
    Issue,
}

impl std::fmt::Display for PublishMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishMode::File => write!(f, "file"),
            PublishMode::Issue => write!(f, "issue"),
        }
    }
}

/// Main issue-mirror configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MirrorConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// GitHub API access
    #[serde(default)]
    pub github: GitHubConfig,

    /// Issue to read from
    #[serde(default)]
    pub source: SourceConfig,

    /// Private-span redaction
    #[serde(default)]
    pub redaction: RedactionConfig,

    /// Attachment replication
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Output publication
    #[serde(default)]
    pub publish: PublishConfig,

    /// Commit identity used for every write
    #[serde(default)]
    pub committer: CommitterConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MirrorConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid or a
    /// setting required by an enabled feature is missing
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.github.validate(self.application.dry_run)?;
        self.redaction.validate()?;
        self.assets.validate()?;
        self.publish.validate()?;

        let needs_committer = !self.application.dry_run
            && (self.assets.enabled || self.publish.mode == PublishMode::File);
        if needs_committer && self.committer.identity().is_none() {
            return Err(
                "committer.name and committer.email are required to write to a repository"
                    .to_string(),
            );
        }

        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (write assets to local disk, print instead of publishing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Access token
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Only attachment URLs starting with this prefix receive the token
    #[serde(default = "default_trusted_host")]
    pub trusted_host: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl GitHubConfig {
    fn validate(&self, dry_run: bool) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let parsed = url::Url::parse(&self.api_base_url)
            .map_err(|e| format!("github.api_base_url is not a valid URL: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err("github.api_base_url must start with http:// or https://".to_string());
        }

        if !self.trusted_host.starts_with("http://") && !self.trusted_host.starts_with("https://")
        {
            return Err("github.trusted_host must start with http:// or https://".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("github.user_agent cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("github.timeout_seconds must be > 0".to_string());
        }

        let has_token = self
            .token
            .as_ref()
            .map(|t| !t.expose_secret().is_empty())
            .unwrap_or(false);
        if !dry_run && !has_token {
            return Err("github.token is required unless running in dry-run mode".to_string());
        }

        Ok(())
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token: None,
            trusted_host: default_trusted_host(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Issue the document set is read from
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceConfig {
    /// Repository holding the issue
    #[serde(default)]
    pub repository: Option<RepoSlug>,

    /// Issue number
    #[serde(default)]
    pub issue_number: Option<u64>,
}

/// Private-span redaction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Marker opening a private span
    #[serde(default)]
    pub start_marker: Option<String>,

    /// Marker closing a private span
    #[serde(default)]
    pub end_marker: Option<String>,

    /// PBKDF2 iteration count for reference labels
    #[serde(default = "default_hash_rounds")]
    pub hash_rounds: u32,

    /// Repository of the access-restricted issue receiving the reference table
    #[serde(default)]
    pub reference_repository: Option<RepoSlug>,

    /// Issue receiving the reference table
    #[serde(default)]
    pub reference_issue_number: Option<u64>,
}

impl RedactionConfig {
    /// Returns the marker pair when redaction is enabled
    pub fn markers(&self) -> Option<(&str, &str)> {
        match (self.start_marker.as_deref(), self.end_marker.as_deref()) {
            (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => Some((start, end)),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), String> {
        let start = self.start_marker.as_deref().unwrap_or("");
        let end = self.end_marker.as_deref().unwrap_or("");
        if start.is_empty() != end.is_empty() {
            return Err(
                "redaction.start_marker and redaction.end_marker must be set together".to_string(),
            );
        }

        if self.hash_rounds == 0 {
            return Err("redaction.hash_rounds must be > 0".to_string());
        }

        if self.reference_repository.is_some() != self.reference_issue_number.is_some() {
            return Err(
                "redaction.reference_repository and redaction.reference_issue_number must be set together"
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            start_marker: None,
            end_marker: None,
            hash_rounds: default_hash_rounds(),
            reference_repository: None,
            reference_issue_number: None,
        }
    }
}

/// Attachment replication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Replicate embedded media
    #[serde(default)]
    pub enabled: bool,

    /// Repository receiving the assets
    #[serde(default)]
    pub repository: Option<RepoSlug>,

    /// Directory inside the repository
    #[serde(default)]
    pub directory: Option<String>,

    /// Public base URL (defaults to the repository's GitHub Pages site)
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// Root directory for assets written during a dry run
    #[serde(default = "default_local_output_dir")]
    pub local_output_dir: String,

    /// Convert WebP to JPEG
    #[serde(default)]
    pub normalize_format: bool,

    /// Compression settings
    #[serde(default)]
    pub compression: CompressionConfig,
}

impl AssetsConfig {
    /// Public base URL for published assets, without trailing slash
    pub fn public_base(&self) -> Option<String> {
        match (&self.public_base_url, &self.repository) {
            (Some(url), _) => Some(url.trim_end_matches('/').to_string()),
            (None, Some(repo)) => Some(repo.pages_url()),
            (None, None) => None,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.repository.is_none() {
            return Err("assets.repository is required when assets.enabled = true".to_string());
        }

        let directory_missing = self
            .directory
            .as_deref()
            .map(|d| d.trim_matches('/').trim().is_empty())
            .unwrap_or(true);
        if directory_missing {
            return Err("assets.directory is required when assets.enabled = true".to_string());
        }

        if let Some(ref url) = self.public_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(
                    "assets.public_base_url must start with http:// or https://".to_string()
                );
            }
        }

        self.compression.validate()
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            repository: None,
            directory: None,
            public_base_url: None,
            local_output_dir: default_local_output_dir(),
            normalize_format: false,
            compression: CompressionConfig::default(),
        }
    }
}

/// Image compression configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompressionConfig {
    /// Re-encode images larger than `threshold_bytes`
    #[serde(default)]
    pub enabled: bool,

    /// Target size in bytes
    #[serde(default)]
    pub threshold_bytes: Option<u64>,

    /// Maximum width when resizing
    #[serde(default)]
    pub resize_width: Option<u32>,

    /// Maximum height when resizing
    #[serde(default)]
    pub resize_height: Option<u32>,
}

impl CompressionConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        match self.threshold_bytes {
            None | Some(0) => {
                return Err(
                    "assets.compression.threshold_bytes must be > 0 when compression is enabled"
                        .to_string(),
                )
            }
            Some(_) => {}
        }

        if self.resize_width == Some(0) || self.resize_height == Some(0) {
            return Err("assets.compression resize bounds must be > 0".to_string());
        }

        Ok(())
    }
}

/// Output publication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Commit a file or post a comment
    #[serde(default)]
    pub mode: PublishMode,

    /// Target repository (defaults to the source repository)
    #[serde(default)]
    pub repository: Option<RepoSlug>,

    /// File path for `mode = "file"`
    #[serde(default)]
    pub path: Option<String>,

    /// Issue number for `mode = "issue"`
    #[serde(default)]
    pub issue_number: Option<u64>,

    /// Attempt ceiling for repository writes
    #[serde(default = "default_max_push_attempts")]
    pub max_push_attempts: usize,

    /// Don't publish a document that is blank after processing
    #[serde(default)]
    pub skip_if_empty: bool,

    /// Leave the issue body out and publish comments only
    #[serde(default)]
    pub skip_body: bool,

    /// Start with a heading linking back to the source issue
    #[serde(default)]
    pub with_title: bool,

    /// Render every document as a block quote
    #[serde(default)]
    pub with_quote: bool,

    /// Separate comments with a horizontal rule
    #[serde(default)]
    pub with_hr: bool,

    /// Follow every document with its creation time
    #[serde(default)]
    pub with_date: bool,

    /// chrono format string for `with_date`
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// IANA time zone `with_date` times are shown in
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Exit non-zero when `skip_if_empty` skipped publication
    #[serde(default)]
    pub fail_if_skip: bool,
}

impl PublishConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_push_attempts == 0 {
            return Err("publish.max_push_attempts must be >= 1".to_string());
        }

        if self.with_date {
            use chrono::format::{Item, StrftimeItems};

            if self.date_format.trim().is_empty() {
                return Err(
                    "publish.date_format cannot be empty when publish.with_date = true".to_string(),
                );
            }
            if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
                return Err(format!(
                    "publish.date_format '{}' is not a valid strftime format",
                    self.date_format
                ));
            }
        }

        if self.timezone.parse::<Tz>().is_err() {
            return Err(format!(
                "publish.timezone '{}' is not a known IANA time zone",
                self.timezone
            ));
        }

        match self.mode {
            PublishMode::File => {
                if self.path.as_deref().map(str::is_empty).unwrap_or(true) {
                    return Err("publish.path is required when publish.mode = 'file'".to_string());
                }
            }
            PublishMode::Issue => {
                if self.issue_number.is_none() {
                    return Err(
                        "publish.issue_number is required when publish.mode = 'issue'".to_string(),
                    );
                }
            }
        }

        Ok(())
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            mode: PublishMode::File,
            repository: None,
            path: Some(default_publish_path()),
            issue_number: None,
            max_push_attempts: default_max_push_attempts(),
            skip_if_empty: false,
            skip_body: false,
            with_title: false,
            with_quote: false,
            with_hr: false,
            with_date: false,
            date_format: default_date_format(),
            timezone: default_timezone(),
            fail_if_skip: false,
        }
    }
}

/// Commit identity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommitterConfig {
    /// Committer and author name
    #[serde(default)]
    pub name: Option<String>,

    /// Committer and author email
    #[serde(default)]
    pub email: Option<String>,
}

/// Resolved commit identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl CommitterConfig {
    /// Returns the identity when both name and email are set
    pub fn identity(&self) -> Option<CommitIdentity> {
        match (self.name.as_deref(), self.email.as_deref()) {
            (Some(name), Some(email)) if !name.trim().is_empty() && !email.trim().is_empty() => {
                Some(CommitIdentity {
                    name: name.to_string(),
                    email: email.to_string(),
                })
            }
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_trusted_host() -> String {
    "https://github.com".to_string()
}

fn default_user_agent() -> String {
    concat!("issue-mirror/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_hash_rounds() -> u32 {
    100_000
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_local_output_dir() -> String {
    ".".to_string()
}

fn default_max_push_attempts() -> usize {
    20
}

fn default_publish_path() -> String {
    "issue.md".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
