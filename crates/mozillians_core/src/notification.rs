//! Side effects handed to the notification dispatcher.

use crate::{GroupId, InviteId, MembershipStatus, ProfileId};
use serde::{Deserialize, Serialize};

/// A unit of work for the notification dispatcher.
///
/// Enqueued after the state change it describes has been written.
/// Delivery is at-least-once and never reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Notification {
    /// Email the member about a status change
    MembershipChanged {
        /// Group
        group: GroupId,
        /// Member
        profile: ProfileId,
        /// Status before, `None` when no row existed
        old_status: Option<MembershipStatus>,
        /// Status after, `None` when the row was deleted
        new_status: Option<MembershipStatus>,
    },
    /// Subscribe a profile to newsletters
    NewsletterSubscribe {
        /// Subscriber
        profile: ProfileId,
        /// Newsletter list ids
        newsletters: Vec<String>,
    },
    /// Unsubscribe an email address from newsletters
    NewsletterUnsubscribe {
        /// Subscriber address
        email: String,
        /// Newsletter list ids
        newsletters: Vec<String>,
    },
    /// Remind curators about outstanding requests
    PendingMemberships {
        /// Group
        group: GroupId,
        /// Number of pending memberships
        count: usize,
        /// Recipients
        curators: Vec<ProfileId>,
    },
    /// Tell a member and the curators a membership is about to lapse
    RenewalDue {
        /// Group
        group: GroupId,
        /// Member whose membership lapses
        member: ProfileId,
        /// Curators to copy
        curators: Vec<ProfileId>,
    },
    /// Email an invitation to its redeemer
    InvitationSent {
        /// Invite
        invite: InviteId,
        /// Group specific text to include
        custom_text: String,
    },
    /// Tell the inviter the invitation was accepted
    InvitationAccepted {
        /// Invite
        invite: InviteId,
    },
    /// Tell the inviter the invitation was rejected
    InvitationRejected {
        /// Group
        group: GroupId,
        /// Invited profile
        redeemer: ProfileId,
        /// Inviter, if still around
        inviter: Option<ProfileId>,
    },
    /// Tell the redeemer an invitation was revoked
    InvitationInvalid {
        /// Group
        group: GroupId,
        /// Invited profile
        redeemer: ProfileId,
    },
}

impl Notification {
    /// Snake-case name of the variant, used as a log field.
    pub fn kind(&self) -> &str {
        self.as_ref()
    }
}

/// Which email a membership change produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MembershipEmail {
    /// A pending request became a membership
    Accepted,
    /// A pending request was declined
    Rejected,
    /// A member was moved back to a pending status
    StatusChanged,
    /// A member was removed
    Removed,
}

impl MembershipEmail {
    /// Select the email for a change from `old` to `new`.
    ///
    /// Returns `None` for pending-to-pending changes, which never warrant an
    /// email.
    ///
    /// ```
    /// use mozillians_core::{MembershipEmail, MembershipStatus};
    ///
    /// let email = MembershipEmail::for_change(
    ///     Some(MembershipStatus::Pending),
    ///     Some(MembershipStatus::Member),
    /// );
    /// assert_eq!(email, Some(MembershipEmail::Accepted));
    /// ```
    pub fn for_change(
        old: Option<MembershipStatus>,
        new: Option<MembershipStatus>,
    ) -> Option<Self> {
        match (old, new) {
            (Some(old), new) if old.is_pending() => match new {
                Some(MembershipStatus::Member) => Some(MembershipEmail::Accepted),
                None => Some(MembershipEmail::Rejected),
                Some(_) => None,
            },
            (_, Some(new)) if new.is_pending() => Some(MembershipEmail::StatusChanged),
            _ => Some(MembershipEmail::Removed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MembershipStatus::*;

    #[test]
    fn test_email_for_each_change() {
        assert_eq!(
            MembershipEmail::for_change(Some(PendingTerms), Some(Member)),
            Some(MembershipEmail::Accepted)
        );
        assert_eq!(
            MembershipEmail::for_change(Some(Pending), None),
            Some(MembershipEmail::Rejected)
        );
        assert_eq!(
            MembershipEmail::for_change(Some(Member), Some(Pending)),
            Some(MembershipEmail::StatusChanged)
        );
        assert_eq!(
            MembershipEmail::for_change(Some(Member), None),
            Some(MembershipEmail::Removed)
        );
        assert_eq!(MembershipEmail::for_change(Some(Pending), Some(PendingTerms)), None);
    }

    #[test]
    fn test_notification_kind_name() {
        let n = Notification::InvitationAccepted {
            invite: InviteId(1),
        };
        assert_eq!(n.kind(), "invitation_accepted");
    }
}
