//! Run orchestration
//!
//! - [`source`] reads the issue and its comments
//! - [`driver`] redacts and rewrites each document
//! - [`assemble`] renders the documents into one markdown file
//! - [`publisher`] commits or posts the result and the reference table
//! - [`coordinator`] wires the above together for one run

pub mod assemble;
pub mod coordinator;
pub mod driver;
pub mod publisher;
pub mod source;
pub mod summary;

pub use assemble::{assemble, Heading, RenderOptions};
pub use coordinator::{build_context, PublishCoordinator};
pub use driver::{normalize_newlines, PipelineDriver, PipelineOutput, ReferenceTarget, RunContext};
pub use publisher::{Destination, PublishOutcome, Publisher};
pub use source::{fetch_issue, IssueSnapshot};
pub use summary::RunSummary;
