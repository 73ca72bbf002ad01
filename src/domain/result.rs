//! Result type alias for medrecord

use super::errors::MedrecordError;

/// Result type alias for medrecord operations
///
/// # Examples
///
/// ```
/// use medrecord::domain::result::Result;
/// use medrecord::domain::errors::MedrecordError;
///
/// fn failing_function() -> Result<()> {
///     Err(MedrecordError::NotAcceptable("sort direction".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MedrecordError>;
