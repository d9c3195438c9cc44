//! Two-phase marker scan
//!
//! Finds a start marker, then the nearest end marker after it, and resumes
//! after that end marker. Spans never overlap and may cross newlines.

use std::ops::Range;

/// Byte ranges of every `start ... end` span in `text`, markers included
///
/// An unterminated start marker ends the scan; text after it is left alone.
///
/// # Examples
///
/// ```
/// use issue_mirror::core::redaction::scanner::find_spans;
///
/// let text = "a <p>x</p> b <p>y</p>";
/// let spans = find_spans(text, "<p>", "</p>");
/// assert_eq!(&text[spans[0].clone()], "<p>x</p>");
/// assert_eq!(&text[spans[1].clone()], "<p>y</p>");
/// ```
pub fn find_spans(text: &str, start: &str, end: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    if start.is_empty() || end.is_empty() {
        return spans;
    }

    let mut cursor = 0;
    while cursor < text.len() {
        let Some(start_offset) = text[cursor..].find(start) else {
            break;
        };
        let span_start = cursor + start_offset;
        let body_start = span_start + start.len();

        let Some(end_offset) = text[body_start..].find(end) else {
            break;
        };
        let span_end = body_start + end_offset + end.len();

        spans.push(span_start..span_end);
        cursor = span_end;
    }

    spans
}
