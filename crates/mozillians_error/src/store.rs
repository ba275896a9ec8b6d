//! Entity store error types.

/// Kinds of entity store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// Record not found
    #[display("Record not found: {}", _0)]
    NotFound(String),
    /// A uniqueness constraint rejected the write
    #[display("Unique constraint violated: {}", _0)]
    UniqueViolation(String),
    /// The backing store failed
    #[display("Store backend error: {}", _0)]
    Backend(String),
    /// Snapshot could not be read or written
    #[display("Snapshot error: {}", _0)]
    Snapshot(String),
}

/// Entity store error with location tracking.
///
/// # Examples
///
/// ```
/// use mozillians_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::NotFound("group 7".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// assert!(!err.is_unique_violation());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the error came from a uniqueness constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self.kind, StoreErrorKind::UniqueViolation(_))
    }
}
