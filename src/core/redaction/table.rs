//! Reference table rendering
//!
//! The table goes to an access-restricted issue, separately from the
//! redacted document.

use crate::domain::PrivateSpan;

/// Line separator of rendered markdown
pub const NEWLINE: &str = "\r\n";

const TABLE_HEADER: &str = "| Reference | Content |\r\n| :---: | --- |";

/// Renders the reference table for `spans`, in order
///
/// Produces a two-column table followed by footnote-style
/// `reference: content` lines. Content has the start marker removed from its
/// beginning, the end marker from its end, and every line break turned into
/// `<br>`. An empty slice renders as an empty string.
pub fn build_reference_table(spans: &[PrivateSpan], start: &str, end: &str) -> String {
    if spans.is_empty() {
        return String::new();
    }

    let rows: Vec<(&str, String)> = spans
        .iter()
        .map(|span| (span.reference.as_str(), display_content(&span.raw_text, start, end)))
        .collect();

    let mut out = String::from(TABLE_HEADER);
    for (reference, content) in &rows {
        out.push_str(NEWLINE);
        out.push_str(&format!("| `{reference}` | {content} |"));
    }

    out.push_str(NEWLINE);

    for (reference, content) in &rows {
        out.push_str(NEWLINE);
        out.push_str(&format!("{reference}: {content}"));
    }

    out
}

/// Strips the markers from a raw span and escapes line breaks
pub fn display_content(raw_text: &str, start: &str, end: &str) -> String {
    let body = raw_text.strip_prefix(start).unwrap_or(raw_text);
    let body = body.strip_suffix(end).unwrap_or(body);
    escape_newlines(body)
}

fn escape_newlines(text: &str) -> String {
    text.replace("\r\n", "<br>")
        .replace('\r', "<br>")
        .replace('\n', "<br>")
}
