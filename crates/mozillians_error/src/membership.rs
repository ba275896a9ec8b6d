//! Membership workflow error types.

/// Reasons a curator or invitation workflow refused to proceed.
///
/// The membership state machine itself never produces these; illegal
/// transitions are silently ignored there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum MembershipErrorKind {
    /// No invite with this id
    #[display("Invite {} not found", _0)]
    InviteNotFound(i64),
    /// The acting profile is not the invite's redeemer
    #[display("Invite {} belongs to another profile", _0)]
    NotRedeemer(i64),
    /// The acting profile is neither curator nor manager
    #[display("Profile {} may not curate group '{}'", profile, group)]
    NotCurator {
        /// Acting profile id
        profile: i64,
        /// Group name
        group: String,
    },
    /// The profile has no membership request to act on
    #[display("Profile {} has not requested membership in '{}'", profile, group)]
    NotRequested {
        /// Target profile id
        profile: i64,
        /// Group name
        group: String,
    },
    /// The profile has no membership row
    #[display("Profile {} is not a member of '{}'", profile, group)]
    NotMember {
        /// Target profile id
        profile: i64,
        /// Group name
        group: String,
    },
    /// The profile is already a full member
    #[display("Profile {} is already a member of '{}'", profile, group)]
    AlreadyMember {
        /// Target profile id
        profile: i64,
        /// Group name
        group: String,
    },
    /// The profile may not leave or be removed
    #[display("Profile {} cannot be removed from '{}': {}", profile, group, reason)]
    RemovalRefused {
        /// Target profile id
        profile: i64,
        /// Group name
        group: String,
        /// Why removal was refused
        reason: String,
    },
    /// No group with this id
    #[display("Group {} not found", _0)]
    GroupNotFound(i64),
    /// No profile with this id
    #[display("Profile {} not found", _0)]
    ProfileNotFound(i64),
    /// The group still has other members
    #[display("Group '{}' still has other members", _0)]
    NotEmpty(String),
    /// The group does not expire memberships
    #[display("Group '{}' has no invalidation period", _0)]
    InvalidationDisabled(String),
}

/// Membership workflow error with location tracking.
///
/// # Examples
///
/// ```
/// use mozillians_error::{MembershipError, MembershipErrorKind};
///
/// let err = MembershipError::new(MembershipErrorKind::InviteNotFound(3));
/// assert!(format!("{}", err).contains("Invite 3"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Membership Error: {} at line {} in {}", kind, line, file)]
pub struct MembershipError {
    /// The kind of error that occurred
    pub kind: MembershipErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MembershipError {
    /// Create a new membership error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MembershipErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
