//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{MirrorConfig, PublishMode};
use super::secret::secret_string;
use crate::domain::errors::MirrorError;
use crate::domain::ids::RepoSlug;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Prefix of every override variable
const ENV_PREFIX: &str = "ISSUE_MIRROR_";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MirrorConfig
/// 4. Applies environment variable overrides (ISSUE_MIRROR_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Every failure is reported as [`MirrorError::Configuration`].
///
/// # Examples
///
/// ```no_run
/// use issue_mirror::config::loader::load_config;
///
/// let config = load_config("issue-mirror.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MirrorConfig> {
    let config = load_config_unvalidated(path)?;

    config.validate().map_err(|e| {
        MirrorError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Loads configuration without running validation
///
/// Used by commands that apply CLI overrides first and validate afterwards.
pub fn load_config_unvalidated(path: impl AsRef<Path>) -> Result<MirrorConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MirrorError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MirrorError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: MirrorConfig = toml::from_str(&contents)
        .map_err(|e| MirrorError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MirrorError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MirrorError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env_var(key) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            MirrorError::Configuration(format!("Invalid value '{raw}' for {ENV_PREFIX}{key}"))
        }),
        None => Ok(None),
    }
}

fn env_repo(key: &str) -> Result<Option<RepoSlug>> {
    match env_var(key) {
        Some(raw) => RepoSlug::new(raw)
            .map(Some)
            .map_err(|e| MirrorError::Configuration(format!("{ENV_PREFIX}{key}: {e}"))),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the ISSUE_MIRROR_* prefix
///
/// Environment variables follow the pattern: ISSUE_MIRROR_<SECTION>_<KEY>
/// For example: ISSUE_MIRROR_GITHUB_TOKEN, ISSUE_MIRROR_ASSETS_DIRECTORY
fn apply_env_overrides(config: &mut MirrorConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parse("APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // GitHub overrides
    if let Some(val) = env_var("GITHUB_API_BASE_URL") {
        config.github.api_base_url = val;
    }
    if let Some(val) = env_var("GITHUB_TOKEN") {
        config.github.token = Some(secret_string(val));
    }
    if let Some(val) = env_var("GITHUB_TRUSTED_HOST") {
        config.github.trusted_host = val;
    }
    if let Some(val) = env_parse("GITHUB_TIMEOUT_SECONDS")? {
        config.github.timeout_seconds = val;
    }

    // Source overrides
    if let Some(val) = env_repo("SOURCE_REPOSITORY")? {
        config.source.repository = Some(val);
    }
    if let Some(val) = env_parse("SOURCE_ISSUE_NUMBER")? {
        config.source.issue_number = Some(val);
    }

    // Redaction overrides
    if let Some(val) = env_var("REDACTION_START_MARKER") {
        config.redaction.start_marker = Some(val);
    }
    if let Some(val) = env_var("REDACTION_END_MARKER") {
        config.redaction.end_marker = Some(val);
    }
    if let Some(val) = env_parse("REDACTION_HASH_ROUNDS")? {
        config.redaction.hash_rounds = val;
    }
    if let Some(val) = env_repo("REDACTION_REFERENCE_REPOSITORY")? {
        config.redaction.reference_repository = Some(val);
    }
    if let Some(val) = env_parse("REDACTION_REFERENCE_ISSUE_NUMBER")? {
        config.redaction.reference_issue_number = Some(val);
    }

    // Assets overrides
    if let Some(val) = env_parse("ASSETS_ENABLED")? {
        config.assets.enabled = val;
    }
    if let Some(val) = env_repo("ASSETS_REPOSITORY")? {
        config.assets.repository = Some(val);
    }
    if let Some(val) = env_var("ASSETS_DIRECTORY") {
        config.assets.directory = Some(val);
    }
    if let Some(val) = env_var("ASSETS_PUBLIC_BASE_URL") {
        config.assets.public_base_url = Some(val);
    }
    if let Some(val) = env_parse("ASSETS_NORMALIZE_FORMAT")? {
        config.assets.normalize_format = val;
    }
    if let Some(val) = env_parse("ASSETS_COMPRESSION_ENABLED")? {
        config.assets.compression.enabled = val;
    }
    if let Some(val) = env_parse("ASSETS_COMPRESSION_THRESHOLD_BYTES")? {
        config.assets.compression.threshold_bytes = Some(val);
    }
    if let Some(val) = env_parse("ASSETS_COMPRESSION_RESIZE_WIDTH")? {
        config.assets.compression.resize_width = Some(val);
    }
    if let Some(val) = env_parse("ASSETS_COMPRESSION_RESIZE_HEIGHT")? {
        config.assets.compression.resize_height = Some(val);
    }

    // Publish overrides
    if let Some(val) = env_var("PUBLISH_MODE") {
        config.publish.mode = match val.to_lowercase().as_str() {
            "file" => PublishMode::File,
            "issue" => PublishMode::Issue,
            other => {
                return Err(MirrorError::Configuration(format!(
                    "Invalid value '{other}' for {ENV_PREFIX}PUBLISH_MODE. Must be one of: file, issue"
                )))
            }
        };
    }
    if let Some(val) = env_repo("PUBLISH_REPOSITORY")? {
        config.publish.repository = Some(val);
    }
    if let Some(val) = env_var("PUBLISH_PATH") {
        config.publish.path = Some(val);
    }
    if let Some(val) = env_parse("PUBLISH_ISSUE_NUMBER")? {
        config.publish.issue_number = Some(val);
    }
    if let Some(val) = env_parse("PUBLISH_MAX_PUSH_ATTEMPTS")? {
        config.publish.max_push_attempts = val;
    }
    if let Some(val) = env_parse("PUBLISH_SKIP_IF_EMPTY")? {
        config.publish.skip_if_empty = val;
    }
    if let Some(val) = env_parse("PUBLISH_SKIP_BODY")? {
        config.publish.skip_body = val;
    }
    if let Some(val) = env_parse("PUBLISH_WITH_TITLE")? {
        config.publish.with_title = val;
    }
    if let Some(val) = env_parse("PUBLISH_WITH_QUOTE")? {
        config.publish.with_quote = val;
    }
    if let Some(val) = env_parse("PUBLISH_WITH_HR")? {
        config.publish.with_hr = val;
    }
    if let Some(val) = env_parse("PUBLISH_WITH_DATE")? {
        config.publish.with_date = val;
    }
    if let Some(val) = env_var("PUBLISH_DATE_FORMAT") {
        config.publish.date_format = val;
    }
    if let Some(val) = env_var("PUBLISH_TIMEZONE") {
        config.publish.timezone = val;
    }
    if let Some(val) = env_parse("PUBLISH_FAIL_IF_SKIP")? {
        config.publish.fail_if_skip = val;
    }

    // Committer overrides
    if let Some(val) = env_var("COMMITTER_NAME") {
        config.committer.name = Some(val);
    }
    if let Some(val) = env_var("COMMITTER_EMAIL") {
        config.committer.email = Some(val);
    }

    // Logging overrides
    if let Some(val) = env_parse("LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
