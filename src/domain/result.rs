//! Result type alias for issue-mirror

use super::errors::MirrorError;

/// Result type alias for issue-mirror operations
///
/// # Examples
///
/// ```
/// use issue_mirror::domain::result::Result;
/// use issue_mirror::domain::errors::MirrorError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(MirrorError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MirrorError>;
