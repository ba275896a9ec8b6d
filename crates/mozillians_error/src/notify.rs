//! Notification dispatch error types.

/// Kinds of notification errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum NotifyErrorKind {
    /// The queue receiver is gone
    #[display("Notification queue is closed")]
    QueueClosed,
    /// A sink failed to deliver
    #[display("Delivery failed: {}", _0)]
    Delivery(String),
}

/// Notification error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Notify Error: {} at line {} in {}", kind, line, file)]
pub struct NotifyError {
    /// The kind of error that occurred
    pub kind: NotifyErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl NotifyError {
    /// Create a new notification error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NotifyErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
