//! Error types for the Mozillians group membership library.
//!
//! Every error family records the source location where it was created.
//! [`MozilliansError`] wraps them all for callers that do not care which
//! layer failed.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod membership;
mod notify;
mod store;
mod validation;

pub use config::ConfigError;
pub use membership::{MembershipError, MembershipErrorKind};
pub use notify::{NotifyError, NotifyErrorKind};
pub use store::{StoreError, StoreErrorKind};
pub use validation::ValidationError;

/// Crate-level error variants.
#[derive(Debug, derive_more::From, derive_more::Display)]
pub enum MozilliansErrorKind {
    /// Entity store error
    #[display("{}", _0)]
    Store(StoreError),
    /// Field validation error
    #[display("{}", _0)]
    Validation(ValidationError),
    /// Notification dispatch error
    #[display("{}", _0)]
    Notify(NotifyError),
    /// Membership workflow refusal
    #[display("{}", _0)]
    Membership(MembershipError),
    /// Configuration error
    #[display("{}", _0)]
    Config(ConfigError),
}

/// Mozillians error with kind discrimination.
#[derive(Debug)]
pub struct MozilliansError(Box<MozilliansErrorKind>);

impl MozilliansError {
    /// Create a new error from a kind.
    pub fn new(kind: MozilliansErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &MozilliansErrorKind {
        &self.0
    }
}

impl std::fmt::Display for MozilliansError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mozillians Error: {}", self.0)
    }
}

impl std::error::Error for MozilliansError {}

// Generic From implementation for any type that converts to MozilliansErrorKind
impl<T> From<T> for MozilliansError
where
    T: Into<MozilliansErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for entity store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type for notification dispatch.
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;

/// Result type for Mozillians operations.
pub type MozilliansResult<T> = std::result::Result<T, MozilliansError>;
