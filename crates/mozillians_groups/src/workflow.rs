//! Actor-aware workflows built on the membership state machine.
//!
//! These are the checks the view layer runs before changing memberships on
//! someone's behalf: who may approve, who may remove whom, and what status a
//! join request starts at.

use crate::GroupManager;
use mozillians_core::{
    AcceptingMode, Group, GroupMembership, GroupPolicy, MembershipStatus, Profile, ProfileId,
};
use mozillians_error::{MembershipError, MembershipErrorKind, MozilliansResult};
use mozillians_interface::{EntityStore, NotificationPort};
use tracing::{debug, info, instrument};

/// Result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A membership row now exists with this status
    Joined(MembershipStatus),
    /// Nothing to do, already a member
    AlreadyMember,
    /// Nothing to do, a request is outstanding
    AlreadyPending,
    /// The group does not take new members
    Closed,
    /// Only vouched profiles may join
    NotVouched,
}

/// Refuse unless `actor` curates `group` or manages the site.
pub(crate) fn ensure_curator(group: &Group, actor: &Profile) -> Result<(), MembershipError> {
    if actor.manager || group.is_curator(actor.id) {
        Ok(())
    } else {
        Err(MembershipError::new(MembershipErrorKind::NotCurator {
            profile: actor.id.get(),
            group: group.name.clone(),
        }))
    }
}

fn refused(group: &Group, profile: ProfileId, reason: &str) -> MembershipError {
    MembershipError::new(MembershipErrorKind::RemovalRefused {
        profile: profile.get(),
        group: group.name.clone(),
        reason: reason.to_string(),
    })
}

/// Status a join request starts at, `None` when the group is closed.
fn initial_status(group: &Group) -> Option<MembershipStatus> {
    match group.accepting_new_members {
        AcceptingMode::Open if group.has_terms() => Some(MembershipStatus::PendingTerms),
        AcceptingMode::Open => Some(MembershipStatus::Member),
        AcceptingMode::Reviewed => Some(MembershipStatus::Pending),
        AcceptingMode::Closed => None,
    }
}

impl<S, N> GroupManager<S, N>
where
    S: EntityStore,
    N: NotificationPort,
{
    /// Handle `profile` asking to join `group`.
    ///
    /// Open groups admit at once, or at `pending_terms` when the group has
    /// terms. Reviewed groups record a `pending` request for the curators.
    #[instrument(skip(self, group, profile), fields(group = %group.name, profile = %profile.id))]
    pub async fn join_group(&self, group: &Group, profile: &Profile) -> MozilliansResult<JoinOutcome> {
        let standing = self.group_standing(group, profile.id).await?;
        if standing.is_member() {
            return Ok(JoinOutcome::AlreadyMember);
        }
        if group.has_pending_member(standing) {
            return Ok(JoinOutcome::AlreadyPending);
        }
        if !profile.vouched {
            return Ok(JoinOutcome::NotVouched);
        }
        let Some(status) = initial_status(group) else {
            return Ok(JoinOutcome::Closed);
        };

        let membership = self.add_member(group, profile.id, status).await?;
        Ok(JoinOutcome::Joined(membership.status))
    }

    /// Curator approves a request from `profile`.
    ///
    /// The member moves to `pending_terms` if the group has terms, otherwise
    /// straight to `member`.
    #[instrument(skip(self, group, curator), fields(group = %group.name, curator = %curator.id))]
    pub async fn confirm_member(
        &self,
        group: &Group,
        curator: &Profile,
        profile: ProfileId,
    ) -> MozilliansResult<GroupMembership> {
        ensure_curator(group, curator)?;

        let Some(current) = self.store().get_membership(group.id, profile).await? else {
            return Err(MembershipError::new(MembershipErrorKind::NotRequested {
                profile: profile.get(),
                group: group.name.clone(),
            })
            .into());
        };
        if current.status == MembershipStatus::Member {
            return Err(MembershipError::new(MembershipErrorKind::AlreadyMember {
                profile: profile.get(),
                group: group.name.clone(),
            })
            .into());
        }

        let status = if group.has_terms() {
            MembershipStatus::PendingTerms
        } else {
            MembershipStatus::Member
        };
        self.add_member(group, profile, status).await
    }

    /// `profile` accepts or refuses the group's terms.
    ///
    /// Acceptance makes them a member. Refusal deletes the row without
    /// notifying anyone.
    #[instrument(skip(self, group, profile), fields(group = %group.name, profile = %profile.id))]
    pub async fn review_terms(
        &self,
        group: &Group,
        profile: &Profile,
        accepted: bool,
    ) -> MozilliansResult<Option<GroupMembership>> {
        let current = self.store().get_membership(group.id, profile.id).await?;
        if current.map(|m| m.status) != Some(MembershipStatus::PendingTerms) {
            return Err(MembershipError::new(MembershipErrorKind::NotRequested {
                profile: profile.id.get(),
                group: group.name.clone(),
            })
            .into());
        }

        if accepted {
            let membership = self
                .add_member(group, profile.id, MembershipStatus::Member)
                .await?;
            Ok(Some(membership))
        } else {
            self.store().delete_membership(group.id, profile.id).await?;
            info!("Terms refused, membership deleted");
            Ok(None)
        }
    }

    /// Remove `target` from `group` on behalf of `actor`.
    ///
    /// Members may remove themselves when the group allows leaving. Removing
    /// someone else takes a curator or manager, and the only curator can not
    /// be removed by anyone else. A removed curator stops curating.
    #[instrument(
        skip(self, group, actor, target),
        fields(group = %group.name, actor = %actor.id, target = %target.id)
    )]
    pub async fn remove_member_as(
        &self,
        group: &mut Group,
        actor: &Profile,
        target: &Profile,
        new_status: Option<MembershipStatus>,
    ) -> MozilliansResult<Option<GroupMembership>> {
        if actor.id == target.id {
            if !actor.manager {
                let standing = self.group_standing(group, target.id).await?;
                if !group.can_leave(target, standing) {
                    let reason = if !group.members_can_leave {
                        "members may not leave this group"
                    } else if group.is_curator(target.id) && group.curators.len() == 1 {
                        "the only curator may not leave"
                    } else {
                        "not a member"
                    };
                    debug!(reason, "Self removal refused");
                    return Err(refused(group, target.id, reason).into());
                }
            }
        } else {
            ensure_curator(group, actor)?;
            if group.is_curator(target.id) && group.curators.len() == 1 {
                return Err(refused(group, target.id, "the only curator may not be removed").into());
            }
        }

        let remaining = self.remove_member(group, target, new_status).await?;
        if group.curators.remove(&target.id) {
            let mut stored = self.store().get_group(group.id).await?.ok_or_else(|| {
                MembershipError::new(MembershipErrorKind::GroupNotFound(group.id.get()))
            })?;
            stored.curators.remove(&target.id);
            self.store().update_group(&stored).await?;
            *group = stored;
            info!("Removed member was a curator, curatorship dropped");
        }
        Ok(remaining)
    }
}
