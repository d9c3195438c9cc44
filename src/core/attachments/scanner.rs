//! Media reference extraction
//!
//! Finds `![alt](url)` images and `<img src="url">` tags with absolute
//! http(s) URLs. A match directly preceded or followed by a backtick is
//! taken to be inline code and skipped. `<img>` tags whose remaining text
//! contains `exclude` are left alone.

use crate::domain::{MirrorError, Result};
use fancy_regex::Regex;

const MEDIA_PATTERN: &str = r#"(?<!`)(?:!\[.*?\]\((https?://[^\s)]+)\)|<img.*?src="(https?://[^\s"]+)"(?!.*exclude).*>)(?!`)"#;

/// Compiled media reference matcher
#[derive(Debug, Clone)]
pub struct AttachmentScanner {
    pattern: Regex,
}

impl AttachmentScanner {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(MEDIA_PATTERN)
            .map_err(|e| MirrorError::Other(format!("Invalid media pattern: {e}")))?;
        Ok(Self { pattern })
    }

    /// Returns the distinct attachment URLs in `text`, in first-seen order
    ///
    /// # Errors
    ///
    /// Fails only if the matcher hits its backtracking limit.
    pub fn distinct_urls(&self, text: &str) -> Result<Vec<String>> {
        let mut urls: Vec<String> = Vec::new();

        for captures in self.pattern.captures_iter(text) {
            let captures = captures
                .map_err(|e| MirrorError::Other(format!("Media scan failed: {e}")))?;
            let url = captures.get(1).or_else(|| captures.get(2));
            if let Some(url) = url {
                if !urls.iter().any(|seen| seen == url.as_str()) {
                    urls.push(url.as_str().to_string());
                }
            }
        }

        Ok(urls)
    }
}
