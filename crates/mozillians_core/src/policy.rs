//! Join and leave policies shared by groups and skills.
//!
//! Groups and skills answer the same questions with different rules.
//! [`GroupPolicy`] is the capability both implement; [`GroupLike`] picks one
//! at runtime where callers deal with either.

use crate::{
    AcceptingMode, Alias, Group, GroupId, Profile, Skill, SkillId, Standing,
    check_name_available,
};
use mozillians_error::ValidationError;

/// Questions the view layer asks before letting a profile join or leave.
///
/// Every method is pure: the caller supplies the profile's [`Standing`]
/// (derived from its membership row) so implementations never touch storage.
pub trait GroupPolicy {
    /// Id type of the record and its aliases.
    type Id: Copy + PartialEq;

    /// Record id.
    fn id(&self) -> Self::Id;

    /// Record name.
    fn name(&self) -> &str;

    /// Check the record's name against aliases with the same name.
    fn validate(&self, aliases: &[Alias<Self::Id>]) -> Result<(), ValidationError> {
        check_name_available(self.name(), aliases, Some(self.id()))
    }

    /// Whether `profile` may remove themselves.
    fn can_leave(&self, profile: &Profile, standing: Standing) -> bool;

    /// Whether `profile` may join or request to join.
    fn can_join(&self, profile: &Profile, standing: Standing) -> bool;

    /// Whether `standing` counts as pending for listings and filters.
    fn has_pending_member(&self, standing: Standing) -> bool;
}

impl GroupPolicy for Group {
    type Id = GroupId;

    fn id(&self) -> GroupId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    /// A group may never be left by its only curator, and leaving only
    /// applies to profiles who are members or pending.
    fn can_leave(&self, profile: &Profile, standing: Standing) -> bool {
        self.members_can_leave
            && (self.curators.len() > 1 || !self.is_curator(profile.id))
            && (standing.is_member() || self.has_pending_member(standing))
    }

    fn can_join(&self, profile: &Profile, standing: Standing) -> bool {
        profile.vouched
            && self.accepting_new_members != AcceptingMode::Closed
            && !(standing.is_member() || self.has_pending_member(standing))
    }

    fn has_pending_member(&self, standing: Standing) -> bool {
        standing.is_pending()
    }
}

impl GroupPolicy for Skill {
    type Id = SkillId;

    fn id(&self) -> SkillId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn can_leave(&self, _profile: &Profile, _standing: Standing) -> bool {
        true
    }

    fn can_join(&self, profile: &Profile, standing: Standing) -> bool {
        profile.vouched && !standing.is_member()
    }

    fn has_pending_member(&self, _standing: Standing) -> bool {
        false
    }
}

/// Either a group or a skill.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum GroupLike {
    /// A group with statuses and curators
    Group(Group),
    /// A skill with plain membership
    Skill(Skill),
}

impl GroupLike {
    /// Record name.
    pub fn name(&self) -> &str {
        match self {
            GroupLike::Group(g) => GroupPolicy::name(g),
            GroupLike::Skill(s) => GroupPolicy::name(s),
        }
    }

    /// URL slug.
    pub fn url(&self) -> &str {
        match self {
            GroupLike::Group(g) => &g.url,
            GroupLike::Skill(s) => &s.url,
        }
    }

    /// See [`GroupPolicy::can_leave`].
    pub fn can_leave(&self, profile: &Profile, standing: Standing) -> bool {
        match self {
            GroupLike::Group(g) => g.can_leave(profile, standing),
            GroupLike::Skill(s) => s.can_leave(profile, standing),
        }
    }

    /// See [`GroupPolicy::can_join`].
    pub fn can_join(&self, profile: &Profile, standing: Standing) -> bool {
        match self {
            GroupLike::Group(g) => g.can_join(profile, standing),
            GroupLike::Skill(s) => s.can_join(profile, standing),
        }
    }

    /// See [`GroupPolicy::has_pending_member`].
    pub fn has_pending_member(&self, standing: Standing) -> bool {
        match self {
            GroupLike::Group(g) => g.has_pending_member(standing),
            GroupLike::Skill(s) => s.has_pending_member(standing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MembershipStatus, NewGroup, ProfileId};

    fn group(mode: AcceptingMode, curators: &[i64]) -> Group {
        NewGroup::builder()
            .name("qa")
            .accepting_new_members(mode)
            .curators(curators.iter().copied().map(ProfileId).collect::<std::collections::BTreeSet<_>>())
            .build()
            .unwrap()
            .into_group(GroupId(1))
    }

    fn profile(id: i64, vouched: bool) -> Profile {
        Profile::builder()
            .id(ProfileId(id))
            .email(format!("p{}@example.com", id))
            .vouched(vouched)
            .build()
            .unwrap()
    }

    fn member() -> Standing {
        Standing::new(Some(MembershipStatus::Member), false)
    }

    #[test]
    fn test_sole_curator_cannot_leave() {
        let g = group(AcceptingMode::Open, &[1]);
        assert!(!g.can_leave(&profile(1, true), member()));
    }

    #[test]
    fn test_curator_can_leave_with_second_curator() {
        let g = group(AcceptingMode::Open, &[1, 2]);
        assert!(g.can_leave(&profile(1, true), member()));
    }

    #[test]
    fn test_cannot_leave_without_membership() {
        let g = group(AcceptingMode::Open, &[]);
        assert!(!g.can_leave(&profile(5, true), Standing::absent()));
    }

    #[test]
    fn test_pending_terms_cannot_leave() {
        let g = group(AcceptingMode::Open, &[]);
        let standing = Standing::new(Some(MembershipStatus::PendingTerms), false);
        assert!(!g.can_leave(&profile(5, true), standing));
    }

    #[test]
    fn test_unleavable_group() {
        let mut g = group(AcceptingMode::Open, &[]);
        g.members_can_leave = false;
        assert!(!g.can_leave(&profile(5, true), member()));
    }

    #[test]
    fn test_join_requires_vouched_and_not_closed() {
        let open = group(AcceptingMode::Open, &[]);
        let closed = group(AcceptingMode::Closed, &[]);
        assert!(open.can_join(&profile(5, true), Standing::absent()));
        assert!(!open.can_join(&profile(5, false), Standing::absent()));
        assert!(!closed.can_join(&profile(5, true), Standing::absent()));
    }

    #[test]
    fn test_renewal_counts_as_pending() {
        let g = group(AcceptingMode::Reviewed, &[]);
        let renewing = Standing::new(Some(MembershipStatus::Member), true);
        assert!(g.has_pending_member(renewing));
        assert!(!g.can_join(&profile(5, true), renewing));
    }

    #[test]
    fn test_skill_always_leavable_never_pending() {
        let skill = GroupLike::Skill(Skill {
            id: SkillId(1),
            name: "python".into(),
            url: "python".into(),
        });
        let p = profile(3, true);
        assert!(skill.can_leave(&p, Standing::absent()));
        assert!(!skill.has_pending_member(Standing::new(Some(MembershipStatus::Pending), true)));
        assert!(skill.can_join(&p, Standing::absent()));
        assert!(!skill.can_join(&p, member()));
    }
}
