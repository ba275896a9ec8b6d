//! Validation error types.

/// A field failed validation before being saved.
///
/// # Examples
///
/// ```
/// use mozillians_error::ValidationError;
///
/// let err = ValidationError::new("name", "This name already exists.");
/// assert_eq!(err.field, "name");
/// assert!(format!("{}", err).contains("already exists"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {}: {} at line {} in {}", field, message, line, file)]
pub struct ValidationError {
    /// Name of the offending field
    pub field: &'static str,
    /// Message suitable for showing next to the field
    pub message: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error for `field`.
    #[track_caller]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            field,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
