//! Core business logic for issue-mirror.
//!
//! # Modules
//!
//! - [`redaction`] - Private-span extraction and the reference table
//! - [`hashing`] - Salted reference labels and URL content hashes
//! - [`attachments`] - Media URL discovery, deduplication and replication
//! - [`media`] - Type sniffing, orientation, format normalisation, compression
//! - [`store`] - Archive guard and retry policy around object stores
//! - [`pipeline`] - Per-run orchestration and publication
//!
//! # Publish Workflow
//!
//! 1. **Load**: Read the issue body and every comment page
//! 2. **Redact**: Replace private spans with salted hash references
//! 3. **Replicate**: Copy embedded media to the asset repository and rewrite URLs
//! 4. **Assemble**: Join the documents into one markdown document
//! 5. **Publish**: Post the reference table, then commit or post the document
//! 6. **Report**: Log a run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use issue_mirror::config::load_config;
//! use issue_mirror::core::pipeline::PublishCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("issue-mirror.toml")?;
//! let coordinator = PublishCoordinator::new(config)?;
//! let summary = coordinator.execute().await?;
//! println!("Processed {} documents", summary.documents);
//! # Ok(())
//! # }
//! ```

pub mod attachments;
pub mod hashing;
pub mod media;
pub mod pipeline;
pub mod redaction;
pub mod store;
