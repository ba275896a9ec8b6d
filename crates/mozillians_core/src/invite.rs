//! Invitations into protected groups.

use crate::{GroupId, InviteId, ProfileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An invitation for `redeemer` to join `group_id`.
///
/// At most one invite exists per `(group, redeemer)` pair. The inviter is
/// optional because inviting profiles may be deleted while the invite lives on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    /// Invite id
    pub id: InviteId,
    /// Group the invite is for
    pub group_id: GroupId,
    /// Invited profile
    pub redeemer: ProfileId,
    /// Inviting curator, if still around
    pub inviter: Option<ProfileId>,
    /// Redeemer accepted
    #[serde(default)]
    pub accepted: bool,
    /// Creation time
    pub created: DateTime<Utc>,
    /// Last update time
    pub updated: DateTime<Utc>,
}

/// Insertable invite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvite {
    /// Group the invite is for
    pub group_id: GroupId,
    /// Invited profile
    pub redeemer: ProfileId,
    /// Inviting curator
    pub inviter: Option<ProfileId>,
}
