//! Result type alias for the pipeline

use super::errors::PipelineError;

/// Result type alias for pipeline operations
///
/// # Examples
///
/// ```
/// use vitalstream::domain::result::Result;
/// use vitalstream::domain::errors::PipelineError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PipelineError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PipelineError>;
