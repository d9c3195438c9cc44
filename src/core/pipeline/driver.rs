//! Document pipeline: redact, then replicate attachments

use crate::core::attachments::{AttachmentResolver, ResolverCounts};
use crate::core::redaction::table::NEWLINE;
use crate::core::redaction::Redactor;
use crate::domain::{MirrorError, PrivateSpan, RepoSlug, Result, SourceDocument};

/// Issue that receives the reference table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTarget {
    pub repository: RepoSlug,
    pub issue_number: u64,
}

/// Everything a run shares across documents
///
/// Built once at start-up. The redactor carries the run's salt and the
/// resolver carries the run's resolution cache.
pub struct RunContext {
    pub redactor: Redactor,
    pub resolver: Option<AttachmentResolver>,

    /// Where references go. `None` is only acceptable when no private span
    /// is found, or when `references_required` is false.
    pub reference_target: Option<ReferenceTarget>,
    pub references_required: bool,
}

impl RunContext {
    pub fn new(redactor: Redactor, resolver: Option<AttachmentResolver>) -> Self {
        Self {
            redactor,
            resolver,
            reference_target: None,
            references_required: false,
        }
    }

    /// Requires a reference target whenever spans are found
    pub fn with_reference_target(mut self, target: Option<ReferenceTarget>) -> Self {
        self.reference_target = target;
        self.references_required = true;
        self
    }
}

/// Result of running every document through the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Redacted, rewritten documents in input order
    pub documents: Vec<SourceDocument>,

    /// Every private span, in document order then position order
    pub spans: Vec<PrivateSpan>,

    /// Rendered reference table, empty when there are no spans
    pub reference_table: String,
}

/// Runs documents through redaction and attachment replication
pub struct PipelineDriver {
    context: RunContext,
}

impl PipelineDriver {
    pub fn new(context: RunContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Attachment activity so far
    pub fn resolver_counts(&self) -> ResolverCounts {
        self.context
            .resolver
            .as_ref()
            .map(AttachmentResolver::counts)
            .unwrap_or_default()
    }

    /// Processes a document set
    ///
    /// Every document is redacted before any attachment is touched, so a
    /// missing reference target stops the run before anything is uploaded.
    /// Redacted text is what the resolver scans; media inside a private
    /// span is never replicated.
    ///
    /// # Errors
    ///
    /// - [`MirrorError::Configuration`] when spans exist but no reference
    ///   target is configured
    /// - any attachment resolution failure
    pub async fn process(&self, documents: Vec<SourceDocument>) -> Result<PipelineOutput> {
        let mut redacted = Vec::with_capacity(documents.len());
        let mut spans = Vec::new();

        for document in &documents {
            let normalized = normalize_newlines(&document.text);
            let (text, found) = self.context.redactor.extract(&normalized);
            spans.extend(found);
            redacted.push(document.with_text(text));
        }

        if !spans.is_empty()
            && self.context.references_required
            && self.context.reference_target.is_none()
        {
            return Err(MirrorError::Configuration(format!(
                "Found {} private span(s) but redaction.reference_repository and \
                 redaction.reference_issue_number are not set",
                spans.len()
            )));
        }

        let documents = match &self.context.resolver {
            Some(resolver) => {
                let mut resolved = Vec::with_capacity(redacted.len());
                for document in redacted {
                    let text = resolver.resolve_all(&document.text).await?;
                    resolved.push(document.with_text(text));
                }
                resolved
            }
            None => redacted,
        };

        let reference_table = self.context.redactor.build_reference_table(&spans);

        tracing::info!(
            documents = documents.len(),
            private_spans = spans.len(),
            "Documents processed"
        );

        Ok(PipelineOutput {
            documents,
            spans,
            reference_table,
        })
    }
}

/// Converts every `\r\n`, `\r` and `\n` to `\r\n`
pub fn normalize_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(NEWLINE);
            }
            '\n' => out.push_str(NEWLINE),
            other => out.push(other),
        }
    }

    out
}
