//! Entity store traits.
//!
//! The membership layer treats persistence as an external collaborator. A
//! store implementation must enforce uniqueness of `(profile, group)` for
//! memberships and `(group, redeemer)` for invites, reporting violations as
//! [`StoreErrorKind::UniqueViolation`](mozillians_error::StoreErrorKind).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mozillians_core::{
    Group, GroupAlias, GroupId, GroupMembership, Invite, InviteId, MembershipId, MembershipStatus,
    NewGroup, NewInvite, NewMembership, Profile, ProfileId, Skill, SkillAlias, SkillId,
};
use mozillians_error::StoreResult;

/// Filter for membership queries. Unset fields match everything.
///
/// ```
/// use mozillians_core::{GroupId, MembershipStatus};
/// use mozillians_interface::MembershipFilter;
///
/// let filter = MembershipFilter::new()
///     .with_group(Some(GroupId(3)))
///     .with_status(Some(MembershipStatus::Pending));
/// assert_eq!(filter.group, Some(GroupId(3)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_new::new, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct MembershipFilter {
    /// Restrict to one group
    #[new(default)]
    pub group: Option<GroupId>,
    /// Restrict to one profile
    #[new(default)]
    pub profile: Option<ProfileId>,
    /// Restrict to one status
    #[new(default)]
    pub status: Option<MembershipStatus>,
    /// Only rows last updated at or before this time
    #[new(default)]
    pub updated_before: Option<DateTime<Utc>>,
    /// Restrict by renewal flag
    #[new(default)]
    pub needs_renewal: Option<bool>,
}

impl MembershipFilter {
    /// Whether `membership` passes the filter.
    pub fn matches(&self, membership: &GroupMembership) -> bool {
        self.group.is_none_or(|g| membership.group_id == g)
            && self.profile.is_none_or(|p| membership.profile_id == p)
            && self.status.is_none_or(|s| membership.status == s)
            && self
                .updated_before
                .is_none_or(|t| membership.updated_on <= t)
            && self
                .needs_renewal
                .is_none_or(|flag| membership.needs_renewal == flag)
    }
}

/// Groups and their alias namespace.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Insert a group. The name and url are stored as given.
    async fn create_group(&self, group: &NewGroup) -> StoreResult<Group>;

    /// Load a group by id.
    async fn get_group(&self, id: GroupId) -> StoreResult<Option<Group>>;

    /// Overwrite a stored group.
    async fn update_group(&self, group: &Group) -> StoreResult<()>;

    /// Delete a group with its memberships, invites and remaining aliases.
    async fn delete_group(&self, id: GroupId) -> StoreResult<()>;

    /// All groups ordered by name.
    async fn list_groups(&self) -> StoreResult<Vec<Group>>;

    /// Insert a group alias. Fails with a unique violation on name or url clash.
    async fn create_group_alias(&self, alias: &GroupAlias) -> StoreResult<()>;

    /// Aliases whose name equals `name` case-insensitively.
    async fn group_aliases_named(&self, name: &str) -> StoreResult<Vec<GroupAlias>>;

    /// Whether any group alias uses `url`.
    async fn group_alias_url_taken(&self, url: &str) -> StoreResult<bool>;

    /// Aliases whose name contains `fragment` case-insensitively.
    async fn group_aliases_containing(&self, fragment: &str) -> StoreResult<Vec<GroupAlias>>;

    /// Resolve an alias slug to its group.
    async fn group_by_alias_url(&self, url: &str) -> StoreResult<Option<Group>>;

    /// Aliases of one group.
    async fn aliases_of_group(&self, id: GroupId) -> StoreResult<Vec<GroupAlias>>;

    /// Point every alias of `from` at `to`.
    async fn repoint_group_aliases(&self, from: GroupId, to: GroupId) -> StoreResult<()>;
}

/// Skills, their plain membership and their alias namespace.
#[async_trait]
pub trait SkillStore: Send + Sync {
    /// Insert a skill.
    async fn create_skill(&self, name: &str, url: &str) -> StoreResult<Skill>;

    /// Load a skill by id.
    async fn get_skill(&self, id: SkillId) -> StoreResult<Option<Skill>>;

    /// Overwrite a stored skill.
    async fn update_skill(&self, skill: &Skill) -> StoreResult<()>;

    /// Delete a skill with its members and aliases.
    async fn delete_skill(&self, id: SkillId) -> StoreResult<()>;

    /// All skills ordered by name.
    async fn list_skills(&self) -> StoreResult<Vec<Skill>>;

    /// Insert a skill alias.
    async fn create_skill_alias(&self, alias: &SkillAlias) -> StoreResult<()>;

    /// Aliases whose name equals `name` case-insensitively.
    async fn skill_aliases_named(&self, name: &str) -> StoreResult<Vec<SkillAlias>>;

    /// Whether any skill alias uses `url`.
    async fn skill_alias_url_taken(&self, url: &str) -> StoreResult<bool>;

    /// Aliases whose name contains `fragment` case-insensitively.
    async fn skill_aliases_containing(&self, fragment: &str) -> StoreResult<Vec<SkillAlias>>;

    /// Add a member. Returns false if already a member.
    async fn add_skill_member(&self, skill: SkillId, profile: ProfileId) -> StoreResult<bool>;

    /// Remove a member. Returns false if not a member.
    async fn remove_skill_member(&self, skill: SkillId, profile: ProfileId) -> StoreResult<bool>;

    /// Whether `profile` has the skill.
    async fn has_skill_member(&self, skill: SkillId, profile: ProfileId) -> StoreResult<bool>;

    /// Number of profiles with the skill.
    async fn count_skill_members(&self, skill: SkillId) -> StoreResult<usize>;
}

/// Membership rows, one per `(profile, group)`.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Load the row for `(group, profile)`.
    async fn get_membership(
        &self,
        group: GroupId,
        profile: ProfileId,
    ) -> StoreResult<Option<GroupMembership>>;

    /// Load the row or insert `defaults`, atomically per `(group, profile)`.
    ///
    /// Returns the row and whether it was created. Implementations that
    /// cannot make this atomic may instead return a unique violation when a
    /// concurrent insert won; callers recover by reading the row.
    async fn get_or_create_membership(
        &self,
        defaults: &NewMembership,
    ) -> StoreResult<(GroupMembership, bool)>;

    /// Overwrite the status and renewal flag, touching `updated_on`.
    async fn update_membership(&self, membership: &GroupMembership) -> StoreResult<GroupMembership>;

    /// Set `needs_renewal` on the given rows without touching `updated_on`.
    ///
    /// Returns the number of rows flagged.
    async fn flag_for_renewal(&self, ids: &[MembershipId]) -> StoreResult<usize>;

    /// Delete the row for `(group, profile)`. Returns false if there was none.
    async fn delete_membership(&self, group: GroupId, profile: ProfileId) -> StoreResult<bool>;

    /// Rows passing `filter`, ordered by id.
    async fn filter_memberships(
        &self,
        filter: &MembershipFilter,
    ) -> StoreResult<Vec<GroupMembership>>;
}

/// Invitations, one per `(group, redeemer)`.
#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Insert an invite. Fails with a unique violation if one exists.
    async fn create_invite(&self, invite: &NewInvite) -> StoreResult<Invite>;

    /// Load an invite by id.
    async fn get_invite(&self, id: InviteId) -> StoreResult<Option<Invite>>;

    /// Overwrite an invite, touching `updated`.
    async fn update_invite(&self, invite: &Invite) -> StoreResult<Invite>;

    /// Delete an invite by id. Returns false if there was none.
    async fn delete_invite(&self, id: InviteId) -> StoreResult<bool>;

    /// Delete any invite for `(group, redeemer)`. Returns the number deleted.
    async fn delete_invites_for(&self, group: GroupId, redeemer: ProfileId) -> StoreResult<usize>;

    /// Invites for a group.
    async fn invites_for_group(&self, group: GroupId) -> StoreResult<Vec<Invite>>;
}

/// Read access to profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a profile by id.
    async fn get_profile(&self, id: ProfileId) -> StoreResult<Option<Profile>>;
}

/// Everything the membership layer needs from persistence.
pub trait EntityStore: GroupStore + SkillStore + MembershipStore + InviteStore + ProfileStore {}

impl<T> EntityStore for T where T: GroupStore + SkillStore + MembershipStore + InviteStore + ProfileStore {}
