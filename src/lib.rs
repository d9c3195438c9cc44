// Issue Mirror - Issue thread republishing with attachment replication
// Copyright (c) 2025 Issue Mirror Contributors
// Licensed under the MIT License

//! # Issue Mirror
//!
//! Republishes an issue and its comments as a single markdown document.
//! On the way, private spans are replaced with salted references and
//! embedded media is copied into a repository the output can point at.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Reading** an issue thread through the GitHub REST API
//! - **Redacting** text between configured markers into a reference table
//!   posted to an access-restricted issue
//! - **Replicating** attachments: download, fix orientation, normalize and
//!   compress, then store under a content-derived path
//! - **Publishing** the assembled document as a file or a comment
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Redaction, attachment resolution, media processing, pipeline
//! - [`adapters`] - External integrations (GitHub API, object stores, HTTP fetch)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use issue_mirror::config::load_config;
//! use issue_mirror::core::pipeline::PublishCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("issue-mirror.toml")?;
//!
//!     let coordinator = PublishCoordinator::new(config)?;
//!     let summary = coordinator.execute().await?;
//!
//!     println!("Redacted {} private span(s)", summary.private_spans);
//!     Ok(())
//! }
//! ```
//!
//! ## Redaction
//!
//! ```rust
//! use issue_mirror::core::hashing::RedactionSalt;
//! use issue_mirror::core::redaction::Redactor;
//!
//! let redactor = Redactor::new(
//!     Some(("<private>", "</private>")),
//!     RedactionSalt::generate(1_000),
//! );
//! let (text, spans) = redactor.extract("call me at <private>555-0100</private>");
//!
//! assert_eq!(spans.len(), 1);
//! assert!(text.starts_with("call me at [^pvt_"));
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type is
//! [`domain::MirrorError`]:
//!
//! ```rust,no_run
//! use issue_mirror::domain::MirrorError;
//!
//! fn example() -> Result<(), MirrorError> {
//!     let _config = issue_mirror::config::load_config("issue-mirror.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
