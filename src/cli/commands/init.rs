//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "issue-mirror.toml")]
    pub output: String,

    /// Include every section with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing issue-mirror configuration");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create a .env file with GITHUB_TOKEN=<token>");
                println!("  3. Validate configuration: issue-mirror validate-config");
                println!("  4. Preview the output: issue-mirror publish --dry-run");
                println!("  5. Publish: issue-mirror publish");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# issue-mirror configuration

[application]
log_level = "info"
dry_run = false

[github]
token = "${GITHUB_TOKEN}"

[source]
repository = "octo/notes"
issue_number = 1

[publish]
mode = "file"
path = "issues/1.md"

[committer]
name = "Mirror Bot"
email = "mirror-bot@users.noreply.github.com"
"#
        .to_string()
    }

    /// Generate configuration with every section documented
    fn generate_config_with_examples() -> String {
        r#"# issue-mirror configuration
#
# Every value may be overridden with ISSUE_MIRROR_<SECTION>_<KEY>,
# e.g. ISSUE_MIRROR_SOURCE_ISSUE_NUMBER=42

[application]
# trace | debug | info | warn | error
log_level = "info"

# Write assets under assets.local_output_dir and print the document
# instead of publishing it
dry_run = false

[github]
api_base_url = "https://api.github.com"
token = "${GITHUB_TOKEN}"

# Attachment URLs under this prefix are downloaded with the token
trusted_host = "https://github.com"
timeout_seconds = 30

[source]
repository = "octo/notes"
issue_number = 1

[redaction]
# Text between the markers is replaced by a [^pvt_xxxxxxx] reference
start_marker = "<private>"
end_marker = "</private>"
hash_rounds = 100000

# Access-restricted issue receiving the reference table
reference_repository = "octo/private-notes"
reference_issue_number = 1

[assets]
enabled = true
repository = "octo/octo.github.io"
directory = "assets"
# public_base_url = "https://octo.github.io/octo.github.io"
local_output_dir = "out"

# Convert WebP attachments to JPEG
normalize_format = false

[assets.compression]
enabled = true
threshold_bytes = 500000
# resize_width = 1600
# resize_height = 1600

[publish]
# file | issue
mode = "file"
# repository = "octo/site"
path = "issues/1.md"
# issue_number = 2
max_push_attempts = 20
skip_if_empty = true
# Exit 1 when an empty document was skipped
fail_if_skip = false

# Layout
skip_body = false
with_title = true
with_quote = false
with_hr = true
with_date = true
date_format = "%Y-%m-%d %H:%M:%S"
# IANA zone for dates
timezone = "UTC"

[committer]
name = "Mirror Bot"
email = "mirror-bot@users.noreply.github.com"

[logging]
local_enabled = false
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
