//! The group aggregate: membership state changes and their side effects.

use crate::{MembershipConfig, Removal, Transition};
use chrono::Utc;
use derive_getters::Getters;
use mozillians_core::{
    Group, GroupLike, GroupMembership, MembershipStatus, NewMembership, Profile,
    ProfileId, Standing,
};
use mozillians_error::{MozilliansResult, NotifyResult, StoreError, StoreErrorKind};
use mozillians_interface::{EntityStore, MembershipFilter, NotificationPort};
use tracing::{debug, info, instrument, warn};

/// Applies membership changes to the entity store and enqueues notifications.
///
/// Every operation is request-scoped: it reads, decides and writes in
/// sequence, relying on the store for atomic first joins. Notifications are
/// enqueued only after the write they describe succeeded, and a notifier
/// failure never undoes or fails the write.
#[derive(Debug, Getters, derive_new::new)]
pub struct GroupManager<S, N> {
    /// Entity store
    store: S,
    /// Notification dispatcher
    notifier: N,
    /// Injected settings
    config: MembershipConfig,
}

impl<S, N> GroupManager<S, N>
where
    S: EntityStore,
    N: NotificationPort,
{
    /// Add `profile` to `group` with `status`, or promote an existing row.
    ///
    /// A missing row is created with `status`. An existing row only moves
    /// along a legal promotion; anything else, including any demotion, is
    /// ignored and the row is returned unchanged.
    #[instrument(skip(self, group), fields(group = %group.name))]
    pub async fn add_member(
        &self,
        group: &Group,
        profile: ProfileId,
        status: MembershipStatus,
    ) -> MozilliansResult<GroupMembership> {
        let defaults = NewMembership {
            profile_id: profile,
            group_id: group.id,
            status,
            date_joined: Utc::now(),
        };

        let (membership, created) = match self.store.get_or_create_membership(&defaults).await {
            Ok(found) => found,
            Err(e) if e.is_unique_violation() => {
                debug!("Lost first-join race, reading existing membership");
                let existing = self
                    .store
                    .get_membership(group.id, profile)
                    .await?
                    .ok_or_else(|| {
                        StoreError::new(StoreErrorKind::NotFound(format!(
                            "membership of profile {} in group {}",
                            profile, group.id
                        )))
                    })?;
                (existing, false)
            }
            Err(e) => return Err(e.into()),
        };

        let transition = Transition::evaluate(membership.status, status, created);
        if created {
            info!(status = %membership.status, "Membership created");
            return Ok(membership);
        }
        if !transition.is_change() {
            debug!(?transition, "Membership left unchanged");
            return Ok(membership);
        }

        let old_status = membership.status;
        let mut promoted = membership;
        promoted.status = transition.resulting_status();
        promoted.needs_renewal = false;
        let saved = self.store.update_membership(&promoted).await?;
        info!(from = %old_status, to = %saved.status, "Membership promoted");

        if transition.notifies_member() {
            self.notify(
                "membership change",
                self.notifier.enqueue_membership_change(
                    group.id,
                    profile,
                    Some(old_status),
                    Some(saved.status),
                ),
            );
        }
        if transition.became_member() && self.config.is_nda_group(group) {
            self.notify(
                "newsletter subscribe",
                self.notifier
                    .enqueue_newsletter_subscribe(profile, self.config.nda_newsletters().clone()),
            );
        }

        Ok(saved)
    }

    /// Remove `profile` from `group`, or demote them to `new_status`.
    ///
    /// Returns the surviving row after a demotion and `None` after a hard
    /// removal or when there was nothing to remove.
    ///
    /// The change notification carries the resulting status, not the
    /// requested one: a hard removal reports `None` even when `new_status`
    /// was given.
    #[instrument(skip(self, group, profile), fields(group = %group.name, profile = %profile.id))]
    pub async fn remove_member(
        &self,
        group: &Group,
        profile: &Profile,
        new_status: Option<MembershipStatus>,
    ) -> MozilliansResult<Option<GroupMembership>> {
        let Some(mut membership) = self.store.get_membership(group.id, profile.id).await? else {
            debug!("No membership to remove");
            return Ok(None);
        };

        let old_status = membership.status;
        let removal = Removal::decide(group.accepting_new_members, old_status, new_status);
        let remaining = match removal {
            Removal::Delete => {
                self.store.delete_membership(group.id, profile.id).await?;
                let invites = self.store.delete_invites_for(group.id, profile.id).await?;
                info!(from = %old_status, invites, "Membership deleted");
                None
            }
            Removal::Demote(status) => {
                membership.status = status;
                let saved = self.store.update_membership(&membership).await?;
                info!(from = %old_status, to = %status, "Membership demoted");
                Some(saved)
            }
        };

        if self.config.is_nda_group(group) {
            self.notify(
                "newsletter unsubscribe",
                self.notifier.enqueue_newsletter_unsubscribe(
                    profile.email.clone(),
                    self.config.nda_newsletters().clone(),
                ),
            );
        }
        self.notify(
            "membership change",
            self.notifier.enqueue_membership_change(
                group.id,
                profile.id,
                Some(old_status),
                removal.resulting_status(),
            ),
        );

        Ok(remaining)
    }

    /// Standing of `profile` in a group or skill.
    ///
    /// Skill members are reported as full members; skills never have
    /// pending rows.
    pub async fn standing_in(
        &self,
        target: &GroupLike,
        profile: ProfileId,
    ) -> MozilliansResult<Standing> {
        match target {
            GroupLike::Group(group) => {
                let row = self.store.get_membership(group.id, profile).await?;
                Ok(Standing::from(row.as_ref()))
            }
            GroupLike::Skill(skill) => {
                if self.store.has_skill_member(skill.id, profile).await? {
                    Ok(Standing::new(Some(MembershipStatus::Member), false))
                } else {
                    Ok(Standing::absent())
                }
            }
        }
    }

    /// Whether `profile` is a full member.
    pub async fn has_member(&self, target: &GroupLike, profile: ProfileId) -> MozilliansResult<bool> {
        Ok(self.standing_in(target, profile).await?.is_member())
    }

    /// Whether `profile` is pending or flagged for renewal.
    pub async fn has_pending_member(
        &self,
        target: &GroupLike,
        profile: ProfileId,
    ) -> MozilliansResult<bool> {
        let standing = self.standing_in(target, profile).await?;
        Ok(target.has_pending_member(standing))
    }

    /// Whether `profile` may join or request to join.
    pub async fn user_can_join(
        &self,
        target: &GroupLike,
        profile: &Profile,
    ) -> MozilliansResult<bool> {
        let standing = self.standing_in(target, profile.id).await?;
        Ok(target.can_join(profile, standing))
    }

    /// Whether `profile` may remove themselves.
    pub async fn user_can_leave(
        &self,
        target: &GroupLike,
        profile: &Profile,
    ) -> MozilliansResult<bool> {
        let standing = self.standing_in(target, profile.id).await?;
        Ok(target.can_leave(profile, standing))
    }

    /// Fold `groups` into `target`.
    ///
    /// Memberships are replayed through [`Self::add_member`], so a profile
    /// ends with its highest status across the merged groups whatever the
    /// order. The merged groups' aliases then point at `target` and the
    /// groups are deleted. `target` is skipped if it appears in `groups`.
    #[instrument(skip(self, target, groups), fields(target = %target.name, merged = groups.len()))]
    pub async fn merge_groups(&self, target: &Group, groups: &[Group]) -> MozilliansResult<()> {
        let merged: Vec<&Group> = groups.iter().filter(|g| g.id != target.id).collect();

        for group in &merged {
            let filter = MembershipFilter::new().with_group(Some(group.id));
            let memberships = self.store.filter_memberships(&filter).await?;
            debug!(group = %group.name, count = memberships.len(), "Replaying memberships");
            for membership in memberships {
                self.add_member(target, membership.profile_id, membership.status)
                    .await?;
            }
        }

        for group in merged {
            self.store.repoint_group_aliases(group.id, target.id).await?;
            self.store.delete_group(group.id).await?;
            info!(group = %group.name, "Group merged");
        }

        Ok(())
    }

    /// Policy view of a group for callers holding a plain [`Group`].
    pub(crate) async fn group_standing(
        &self,
        group: &Group,
        profile: ProfileId,
    ) -> MozilliansResult<Standing> {
        let row = self.store.get_membership(group.id, profile).await?;
        Ok(Standing::from(row.as_ref()))
    }

    /// Log and swallow a notifier failure.
    pub(crate) fn notify(&self, what: &'static str, result: NotifyResult<()>) {
        if let Err(e) = result {
            warn!(notification = what, error = %e, "Failed to enqueue notification");
        }
    }
}
