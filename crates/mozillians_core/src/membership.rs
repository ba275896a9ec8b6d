//! Group membership rows.

use crate::{GroupId, MembershipId, MembershipStatus, ProfileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single row relating a profile to a group.
///
/// Absence of a row means the profile has nothing to do with the group,
/// not even a pending request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    /// Row id, increasing in creation order
    pub id: MembershipId,
    /// Member profile
    pub profile_id: ProfileId,
    /// Group
    pub group_id: GroupId,
    /// Current status
    pub status: MembershipStatus,
    /// Set once when the row is created
    pub date_joined: Option<DateTime<Utc>>,
    /// Touched on every save
    pub updated_on: DateTime<Utc>,
    /// Flagged for early renewal
    #[serde(default)]
    pub needs_renewal: bool,
}

/// Values used when `get_or_create` has to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    /// Member profile
    pub profile_id: ProfileId,
    /// Group
    pub group_id: GroupId,
    /// Initial status
    pub status: MembershipStatus,
    /// Join timestamp
    pub date_joined: DateTime<Utc>,
}

/// What a profile's membership row (or its absence) says about them.
///
/// This is the input to the pure policy checks in [`crate::GroupPolicy`].
///
/// ```
/// use mozillians_core::{MembershipStatus, Standing};
///
/// let renewing = Standing::new(Some(MembershipStatus::Member), true);
/// assert!(renewing.is_member());
/// assert!(renewing.is_pending());
/// assert!(!Standing::absent().is_pending());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Standing {
    status: Option<MembershipStatus>,
    needs_renewal: bool,
}

impl Standing {
    /// Standing with the given row values.
    pub fn new(status: Option<MembershipStatus>, needs_renewal: bool) -> Self {
        Self {
            status,
            needs_renewal: status.is_some() && needs_renewal,
        }
    }

    /// No membership row.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Stored status, if a row exists.
    pub fn status(&self) -> Option<MembershipStatus> {
        self.status
    }

    /// Row exists with status `member`.
    pub fn is_member(&self) -> bool {
        self.status == Some(MembershipStatus::Member)
    }

    /// Row exists with status `pending`, or is flagged for renewal.
    pub fn is_pending(&self) -> bool {
        self.status == Some(MembershipStatus::Pending) || self.needs_renewal
    }
}

impl From<Option<&GroupMembership>> for Standing {
    fn from(membership: Option<&GroupMembership>) -> Self {
        match membership {
            Some(m) => Standing::new(Some(m.status), m.needs_renewal),
            None => Standing::absent(),
        }
    }
}
