//! Private-span redaction
//!
//! Replaces every `start ... end` span with a salted, truncated hash label
//! and keeps the originals aside for the reference table.
//!
//! # Example
//!
//! ```
//! use issue_mirror::core::hashing::RedactionSalt;
//! use issue_mirror::core::redaction::Redactor;
//!
//! let redactor = Redactor::new(Some(("<private>", "</private>")), RedactionSalt::generate(1_000));
//! let (text, spans) = redactor.extract("token: <private>hunter2</private>");
//!
//! assert_eq!(spans.len(), 1);
//! assert!(!text.contains("hunter2"));
//! assert_eq!(text, format!("token: {}", spans[0].reference));
//! ```

pub mod scanner;
pub mod table;

use crate::config::RedactionConfig;
use crate::core::hashing::RedactionSalt;
use crate::domain::PrivateSpan;

pub use scanner::find_spans;
pub use table::build_reference_table;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Markers {
    start: String,
    end: String,
}

/// Extracts private spans from documents
///
/// Without markers the redactor is the identity: text comes back unchanged
/// and no spans are reported.
#[derive(Debug, Clone)]
pub struct Redactor {
    markers: Option<Markers>,
    salt: RedactionSalt,
}

impl Redactor {
    /// Creates a redactor for an optional `(start, end)` marker pair
    pub fn new(markers: Option<(&str, &str)>, salt: RedactionSalt) -> Self {
        let markers = markers
            .filter(|(start, end)| !start.is_empty() && !end.is_empty())
            .map(|(start, end)| Markers {
                start: start.to_string(),
                end: end.to_string(),
            });
        Self { markers, salt }
    }

    /// Creates a redactor from the `[redaction]` section
    pub fn from_config(config: &RedactionConfig, salt: RedactionSalt) -> Self {
        Self::new(config.markers(), salt)
    }

    /// Whether a marker pair is configured
    pub fn is_enabled(&self) -> bool {
        self.markers.is_some()
    }

    /// Replaces each private span with its reference label
    ///
    /// Spans are reported left to right. Identical spans are reported once
    /// per occurrence.
    pub fn extract(&self, text: &str) -> (String, Vec<PrivateSpan>) {
        let Some(markers) = &self.markers else {
            return (text.to_string(), Vec::new());
        };

        let ranges = find_spans(text, &markers.start, &markers.end);
        if ranges.is_empty() {
            return (text.to_string(), Vec::new());
        }

        let mut redacted = String::with_capacity(text.len());
        let mut spans = Vec::with_capacity(ranges.len());
        let mut last = 0;

        for range in ranges {
            let raw_text = &text[range.clone()];
            let reference = self.salt.reference_label(raw_text);

            redacted.push_str(&text[last..range.start]);
            redacted.push_str(&reference);
            last = range.end;

            spans.push(PrivateSpan {
                raw_text: raw_text.to_string(),
                reference,
            });
        }
        redacted.push_str(&text[last..]);

        tracing::debug!(count = spans.len(), "Private spans redacted");
        (redacted, spans)
    }

    /// Renders the reference table for spans produced by this redactor
    ///
    /// Empty input renders as an empty string.
    pub fn build_reference_table(&self, spans: &[PrivateSpan]) -> String {
        match &self.markers {
            Some(markers) => build_reference_table(spans, &markers.start, &markers.end),
            None => build_reference_table(spans, "", ""),
        }
    }
}
