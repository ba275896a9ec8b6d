//! Configuration error types.

/// Membership configuration could not be read or parsed.
///
/// # Examples
///
/// ```
/// use mozillians_error::ConfigError;
///
/// let err = ConfigError::new("Missing nda_group");
/// assert!(format!("{}", err).starts_with("Config Error: Missing nda_group"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Config Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// What went wrong, including the offending path when there is one
    pub message: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error with automatic location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
