//! Membership status transitions for a single `(group, profile)` pair.
//!
//! ```text
//!  (absent) --add--> pending | pending_terms | member
//!  pending --add(member)--> member
//!  pending --add(pending_terms)--> pending_terms
//!  pending_terms --add(member)--> member
//!  any --remove(hard)--> (absent)
//!  member --remove(soft, reviewed/closed)--> new status
//! ```
//!
//! Nothing else moves. Requests outside these edges are ignored without
//! error, which is what makes `add_member` unable to demote.

use mozillians_core::{AcceptingMode, MembershipStatus};

/// What `add_member` does to an existing or freshly created row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The row did not exist and was created with this status
    Created(MembershipStatus),
    /// A legal promotion
    Promoted {
        /// Stored status before
        from: MembershipStatus,
        /// Stored status after
        to: MembershipStatus,
    },
    /// The row already has the requested status
    Unchanged(MembershipStatus),
    /// The request is not a legal promotion and is dropped
    Ignored {
        /// Stored status, left as is
        current: MembershipStatus,
        /// Status that was asked for
        requested: MembershipStatus,
    },
}

impl Transition {
    /// Decide what a request for `requested` does to a row currently at `current`.
    ///
    /// `created` says whether the row was inserted by this request, in which
    /// case no transition logic applies.
    pub fn evaluate(current: MembershipStatus, requested: MembershipStatus, created: bool) -> Self {
        if created {
            Transition::Created(current)
        } else if current == requested {
            Transition::Unchanged(current)
        } else if current.can_promote_to(requested) {
            Transition::Promoted {
                from: current,
                to: requested,
            }
        } else {
            Transition::Ignored { current, requested }
        }
    }

    /// Status the row ends up with.
    pub fn resulting_status(&self) -> MembershipStatus {
        match *self {
            Transition::Created(status) | Transition::Unchanged(status) => status,
            Transition::Promoted { to, .. } => to,
            Transition::Ignored { current, .. } => current,
        }
    }

    /// Whether the row must be written.
    pub fn is_change(&self) -> bool {
        matches!(self, Transition::Promoted { .. })
    }

    /// Whether the member gets a membership-change email.
    ///
    /// Only promotions landing on `member` or `pending` notify; moving to
    /// `pending_terms` is followed by the terms page instead.
    pub fn notifies_member(&self) -> bool {
        matches!(
            self,
            Transition::Promoted {
                to: MembershipStatus::Member | MembershipStatus::Pending,
                ..
            }
        )
    }

    /// Whether the promotion made the profile a full member.
    pub fn became_member(&self) -> bool {
        matches!(
            self,
            Transition::Promoted {
                to: MembershipStatus::Member,
                ..
            }
        )
    }
}

/// How `remove_member` treats an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Delete the row and any invite for the pair
    Delete,
    /// Keep the row with a lower status
    Demote(MembershipStatus),
}

impl Removal {
    /// Pick hard removal or demotion.
    ///
    /// Demotion only happens for full members of reviewed or closed groups
    /// when a new status is supplied; every other case deletes.
    pub fn decide(
        mode: AcceptingMode,
        current: MembershipStatus,
        new_status: Option<MembershipStatus>,
    ) -> Self {
        match new_status {
            Some(status) if mode != AcceptingMode::Open && current == MembershipStatus::Member => {
                Removal::Demote(status)
            }
            _ => Removal::Delete,
        }
    }

    /// Status left behind, `None` when the row is gone.
    pub fn resulting_status(&self) -> Option<MembershipStatus> {
        match *self {
            Removal::Delete => None,
            Removal::Demote(status) => Some(status),
        }
    }
}
