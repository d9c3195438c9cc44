//! Run summary and reporting

use super::publisher::PublishOutcome;
use crate::core::attachments::ResolverCounts;
use std::time::Duration;

/// Summary of a publish run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of documents processed (issue body plus comments)
    pub documents: usize,

    /// Private spans redacted
    pub private_spans: usize,

    /// Attachment activity
    pub attachments: ResolverCounts,

    /// Whether a reference table was published or printed
    pub references_published: bool,

    /// What happened to the assembled document
    pub outcome: Option<PublishOutcome>,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self {
            documents: 0,
            private_spans: 0,
            attachments: ResolverCounts::default(),
            references_published: false,
            outcome: None,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether publication was skipped because the document was empty
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, Some(PublishOutcome::Skipped))
    }

    /// Log the summary
    pub fn log_summary(&self) {
        let outcome = match &self.outcome {
            Some(PublishOutcome::Committed { path, .. }) => format!("committed {path}"),
            Some(PublishOutcome::Commented { target, .. }) => format!("commented on {target}"),
            Some(PublishOutcome::Printed) => "printed (dry run)".to_string(),
            Some(PublishOutcome::Skipped) => "skipped (empty)".to_string(),
            None => "not published".to_string(),
        };

        tracing::info!(
            documents = self.documents,
            private_spans = self.private_spans,
            attachments_fetched = self.attachments.fetched,
            assets_published = self.attachments.published,
            assets_reused = self.attachments.reused,
            attachments_skipped = self.attachments.skipped,
            references_published = self.references_published,
            outcome = %outcome,
            duration_ms = self.duration.as_millis() as u64,
            "Run completed"
        );
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
