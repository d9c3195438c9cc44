//! Media handling for replicated attachments
//!
//! - [`detect`] sniffs the file type from magic bytes
//! - [`transform`] fixes orientation, normalises format and resizes
//! - [`compress`] walks encoder parameters against a size budget

pub mod compress;
pub mod detect;
pub mod transform;

pub use compress::{search_parameter, ParameterSweep};
pub use detect::{detect_extension, detect_format, FALLBACK_EXTENSION};
pub use transform::{CompressionSettings, MediaTransformer, ResizeBounds};
