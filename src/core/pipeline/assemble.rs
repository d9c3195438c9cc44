//! Rendering processed documents into one markdown document

use crate::config::{PublishConfig, PublishMode};
use crate::core::redaction::table::NEWLINE;
use crate::domain::SourceDocument;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt::Write as _;

/// Layout switches for [`assemble`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub with_quote: bool,
    pub with_hr: bool,
    pub date_format: Option<String>,
    /// Zone dates are shown in
    pub timezone: Tz,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            with_quote: false,
            with_hr: false,
            date_format: None,
            timezone: Tz::UTC,
        }
    }
}

impl RenderOptions {
    /// Layout from `[publish]`; an unknown zone, already rejected by
    /// validation, falls back to UTC
    pub fn from_config(config: &PublishConfig) -> Self {
        Self {
            with_quote: config.with_quote,
            with_hr: config.with_hr,
            date_format: config.with_date.then(|| config.date_format.clone()),
            timezone: config.timezone.parse().unwrap_or(Tz::UTC),
        }
    }
}

/// Heading linking back to the source issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub title: String,
    pub url: Option<String>,
}

impl Heading {
    /// Renders the heading line; files get `#`, comments `##`
    pub fn render(&self, mode: PublishMode) -> String {
        let marker = match mode {
            PublishMode::File => "#",
            PublishMode::Issue => "##",
        };
        let title = self.title.replace('\\', "\\\\");
        match &self.url {
            Some(url) => format!("{marker} [{title}]({url}){NEWLINE}"),
            None => format!("{marker} {title}{NEWLINE}"),
        }
    }
}

/// Joins processed documents into the published markdown
///
/// The issue body comes first when present and non-empty, followed by each
/// comment in order. Blocks are separated by a blank line; with `with_hr`
/// every comment after the first block is preceded by a `---` rule.
pub fn assemble(documents: &[SourceDocument], options: &RenderOptions) -> String {
    let mut out = String::new();
    let quote = if options.with_quote { "> " } else { "" };
    let rule = if options.with_hr {
        format!("---{NEWLINE}{NEWLINE}")
    } else {
        String::new()
    };

    let mut has_body = false;
    for document in documents.iter().filter(|d| d.is_issue_body()) {
        if document.text.is_empty() {
            continue;
        }
        has_body = true;
        out.push_str(&quoted(&document.text, options.with_quote));
        out.push_str(NEWLINE);
        if let Some(stamp) = timestamp(document.created_at, options) {
            let _ = write!(out, "{NEWLINE}> {stamp}{NEWLINE}");
        }
    }

    let mut first_comment = true;
    for document in documents.iter().filter(|d| !d.is_issue_body()) {
        if !first_comment || has_body {
            let _ = write!(out, "{NEWLINE}{quote}{rule}");
        }
        first_comment = false;

        out.push_str(&quoted(&document.text, options.with_quote));
        if let Some(stamp) = timestamp(document.created_at, options) {
            let _ = write!(out, "{NEWLINE}{NEWLINE}> {stamp}");
        }
        out.push_str(NEWLINE);
    }

    out
}

/// Whether an assembled document has nothing worth publishing
pub fn is_blank(markdown: &str) -> bool {
    markdown.trim().is_empty()
}

fn quoted(text: &str, with_quote: bool) -> String {
    if with_quote {
        format!("> {}", text.replace(NEWLINE, &format!("{NEWLINE}> ")))
    } else {
        text.to_string()
    }
}

fn timestamp(created_at: Option<DateTime<Utc>>, options: &RenderOptions) -> Option<String> {
    let format = options.date_format.as_deref()?;
    let created_at = created_at?.with_timezone(&options.timezone);

    let mut stamp = String::new();
    match write!(stamp, "{}", created_at.format(format)) {
        Ok(()) => Some(stamp),
        Err(_) => {
            tracing::warn!(format = %format, "Invalid date format, falling back to RFC 3339");
            Some(created_at.to_rfc3339())
        }
    }
}
