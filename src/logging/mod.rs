//! Logging and observability
//!
//! Structured logging through `tracing`, plus a few macros that keep event
//! fields consistent across the pipelines.
//!
//! # Example
//!
//! ```no_run
//! use issue_mirror::logging::init_logging;
//! use issue_mirror::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a published asset
///
/// # Example
///
/// ```no_run
/// use issue_mirror::log_asset_published;
///
/// log_asset_published!("assets/3f2a.png", 10_240usize, "https://octo.github.io/site/assets/3f2a.png");
/// ```
#[macro_export]
macro_rules! log_asset_published {
    ($path:expr, $size:expr, $location:expr) => {
        tracing::info!(
            path = %$path,
            size_bytes = $size,
            location = %$location,
            "Asset published"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use issue_mirror::log_error_with_context;
/// use issue_mirror::domain::MirrorError;
///
/// let error = MirrorError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use issue_mirror::log_retry_attempt;
///
/// log_retry_attempt!(2, 20, "Server error: 502");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
