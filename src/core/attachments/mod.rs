//! Attachment replication
//!
//! - [`scanner`] finds media URLs in rendered text
//! - [`singleflight`] deduplicates resolutions across the whole run
//! - [`resolver`] fetches, transforms, stores and rewrites

pub mod resolver;
pub mod scanner;
pub mod singleflight;

pub use resolver::{AttachmentResolver, ResolverCounts, ResolverSettings};
pub use scanner::AttachmentScanner;
pub use singleflight::{Claim, Flight, ResolutionCache};
