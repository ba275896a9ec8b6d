//! Periodic jobs: empty group cleanup, curator reminders, membership expiry.
//!
//! Each job is a plain async method so any scheduler can drive it; the
//! `mozillians-groups` binary runs one per invocation.

use crate::GroupManager;
use crate::workflow::ensure_curator;
use chrono::{DateTime, TimeDelta, Utc};
use mozillians_core::{
    AcceptingMode, Group, GroupMembership, MembershipStatus, Notification, Profile,
};
use mozillians_error::{MembershipError, MembershipErrorKind, MozilliansResult};
use mozillians_interface::{EntityStore, MembershipFilter, NotificationPort};
use tracing::{debug, info, instrument, warn};

/// What [`GroupManager::remove_empty_groups`] deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyRemoval {
    /// Groups without any membership row
    pub groups: usize,
    /// Skills without members
    pub skills: usize,
}

impl<S, N> GroupManager<S, N>
where
    S: EntityStore,
    N: NotificationPort,
{
    /// Delete every group and skill nobody belongs to.
    ///
    /// Pending rows count as belonging.
    #[instrument(skip(self))]
    pub async fn remove_empty_groups(&self) -> MozilliansResult<EmptyRemoval> {
        let mut removed = EmptyRemoval::default();

        for group in self.store().list_groups().await? {
            let filter = MembershipFilter::new().with_group(Some(group.id));
            if self.store().filter_memberships(&filter).await?.is_empty() {
                self.store().delete_group(group.id).await?;
                debug!(group = %group.name, "Removed empty group");
                removed.groups += 1;
            }
        }
        for skill in self.store().list_skills().await? {
            if self.store().count_skill_members(skill.id).await? == 0 {
                self.store().delete_skill(skill.id).await?;
                debug!(skill = %skill.name, "Removed empty skill");
                removed.skills += 1;
            }
        }

        info!(groups = removed.groups, skills = removed.skills, "Empty groups removed");
        Ok(removed)
    }

    /// Remind curators about requests newer than the last reminder.
    ///
    /// Returns the number of groups whose curators were reminded.
    #[instrument(skip(self))]
    pub async fn send_pending_membership_reminders(&self) -> MozilliansResult<usize> {
        let mut reminded = 0;

        for mut group in self.store().list_groups().await? {
            if group.curators.is_empty() {
                continue;
            }
            let filter = MembershipFilter::new()
                .with_group(Some(group.id))
                .with_status(Some(MembershipStatus::Pending));
            let pending = self.store().filter_memberships(&filter).await?;
            let Some(max_id) = pending.iter().map(|m| m.id.get()).max() else {
                continue;
            };
            if max_id <= group.max_reminder {
                continue;
            }

            self.notify(
                "pending memberships",
                self.notifier().enqueue(Notification::PendingMemberships {
                    group: group.id,
                    count: pending.len(),
                    curators: group.curators.iter().copied().collect(),
                }),
            );
            group.max_reminder = max_id;
            self.store().update_group(&group).await?;
            debug!(group = %group.name, count = pending.len(), "Curators reminded");
            reminded += 1;
        }

        Ok(reminded)
    }

    /// Expire memberships not renewed within their group's invalidation period.
    ///
    /// Curators are never expired. Open groups drop the row; reviewed and
    /// closed groups move members back to `pending`. Returns the number of
    /// memberships touched.
    #[instrument(skip(self))]
    pub async fn invalidate_memberships(&self, now: DateTime<Utc>) -> MozilliansResult<usize> {
        let mut invalidated = 0;

        for group in self.store().list_groups().await? {
            let Some(days) = group.invalidation_days else {
                continue;
            };
            let cutoff = now - TimeDelta::days(i64::from(days));
            let filter = MembershipFilter::new()
                .with_group(Some(group.id))
                .with_updated_before(Some(cutoff));
            let expired = self.store().filter_memberships(&filter).await?;
            invalidated += self.invalidate_rows(&group, expired).await?;
        }

        info!(invalidated, "Memberships invalidated");
        Ok(invalidated)
    }

    /// Warn members whose membership expires in `days_before_invalidation` days.
    ///
    /// Picks full members (not curators) last updated on the calendar day
    /// that puts them exactly that far from expiry, sends each a renewal
    /// notice copied to the curators, and flags them for renewal. Returns the
    /// number of memberships flagged.
    #[instrument(skip(self))]
    pub async fn notify_membership_renewal(&self, now: DateTime<Utc>) -> MozilliansResult<usize> {
        let lead = *self.config().days_before_invalidation();
        let mut flagged = 0;

        for group in self.store().list_groups().await? {
            let Some(days) = group.invalidation_days.filter(|d| *d >= lead) else {
                continue;
            };
            let day = (now - TimeDelta::days(i64::from(days - lead))).date_naive();
            let filter = MembershipFilter::new()
                .with_group(Some(group.id))
                .with_status(Some(MembershipStatus::Member))
                .with_needs_renewal(Some(false));
            let due: Vec<GroupMembership> = self
                .store()
                .filter_memberships(&filter)
                .await?
                .into_iter()
                .filter(|m| !group.is_curator(m.profile_id) && m.updated_on.date_naive() == day)
                .collect();
            if due.is_empty() {
                continue;
            }

            let curators: Vec<_> = group.curators.iter().copied().collect();
            for membership in &due {
                self.notify(
                    "renewal due",
                    self.notifier().enqueue(Notification::RenewalDue {
                        group: group.id,
                        member: membership.profile_id,
                        curators: curators.clone(),
                    }),
                );
            }
            let ids: Vec<_> = due.iter().map(|m| m.id).collect();
            flagged += self.store().flag_for_renewal(&ids).await?;
            debug!(group = %group.name, count = ids.len(), "Renewal notices sent");
        }

        Ok(flagged)
    }

    /// Curator expires every non-curator membership of `group` right away.
    #[instrument(skip(self, group, actor), fields(group = %group.name, actor = %actor.id))]
    pub async fn force_invalidation(&self, group: &Group, actor: &Profile) -> MozilliansResult<usize> {
        ensure_curator(group, actor)?;
        if group.invalidation_days.is_none() {
            return Err(MembershipError::new(MembershipErrorKind::InvalidationDisabled(
                group.name.clone(),
            ))
            .into());
        }

        let filter = MembershipFilter::new().with_group(Some(group.id));
        let rows = self.store().filter_memberships(&filter).await?;
        self.invalidate_rows(group, rows).await
    }

    async fn invalidate_rows(
        &self,
        group: &Group,
        rows: Vec<GroupMembership>,
    ) -> MozilliansResult<usize> {
        let status = match group.accepting_new_members {
            AcceptingMode::Open => None,
            AcceptingMode::Reviewed | AcceptingMode::Closed => Some(MembershipStatus::Pending),
        };

        let mut count = 0;
        for membership in rows.into_iter().filter(|m| !group.is_curator(m.profile_id)) {
            let Some(profile) = self.store().get_profile(membership.profile_id).await? else {
                warn!(profile = %membership.profile_id, "Membership without profile, skipping");
                continue;
            };
            self.remove_member(group, &profile, status).await?;
            count += 1;
        }
        Ok(count)
    }
}
