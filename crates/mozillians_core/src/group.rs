//! Group and skill records.

use crate::{AcceptingMode, GroupId, ProfileId, SkillId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A stored group.
///
/// `name` is always lowercase once saved and `url` is the slug of the
/// group's primary alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group id
    pub id: GroupId,
    /// Unique lowercase name
    pub name: String,
    /// URL slug
    pub url: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Profiles allowed to approve and remove members
    #[serde(default)]
    pub curators: BTreeSet<ProfileId>,
    /// IRC channel where the group is discussed
    #[serde(default)]
    pub irc_channel: String,
    /// Website URL
    #[serde(default)]
    pub website: String,
    /// Wiki URL
    #[serde(default)]
    pub wiki: String,
    /// Members may remove themselves
    #[serde(default = "default_true")]
    pub members_can_leave: bool,
    /// Admission mode
    #[serde(default)]
    pub accepting_new_members: AcceptingMode,
    /// Criteria curators use when reviewing requests
    #[serde(default)]
    pub new_member_criteria: String,
    /// Functional areas are listed separately
    #[serde(default)]
    pub functional_area: bool,
    /// Shown in listings and search
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Highest pending membership id curators were last reminded about
    #[serde(default)]
    pub max_reminder: i64,
    /// Terms members must accept
    #[serde(default)]
    pub terms: String,
    /// Memberships lapse after this many days without an update
    #[serde(default)]
    pub invalidation_days: Option<u32>,
    /// Extra text for invitation emails
    #[serde(default)]
    pub invite_email_text: String,
}

fn default_true() -> bool {
    true
}

impl Group {
    /// Whether the profile curates this group.
    pub fn is_curator(&self, profile: ProfileId) -> bool {
        self.curators.contains(&profile)
    }

    /// Whether joining requires accepting terms first.
    pub fn has_terms(&self) -> bool {
        !self.terms.trim().is_empty()
    }
}

/// Insertable group, built before the store assigns an id.
///
/// # Examples
///
/// ```
/// use mozillians_core::{AcceptingMode, NewGroup};
///
/// let group = NewGroup::builder()
///     .name("Rustaceans")
///     .accepting_new_members(AcceptingMode::Reviewed)
///     .build()
///     .unwrap();
/// assert!(group.members_can_leave);
/// assert!(group.visible);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct NewGroup {
    /// Requested name, lowercased on save
    pub name: String,
    /// Explicit slug; derived from the name when empty
    #[builder(default)]
    pub url: String,
    /// Free-form description
    #[builder(default)]
    pub description: String,
    /// Initial curators
    #[builder(default)]
    pub curators: BTreeSet<ProfileId>,
    /// IRC channel
    #[builder(default)]
    pub irc_channel: String,
    /// Website URL
    #[builder(default)]
    pub website: String,
    /// Wiki URL
    #[builder(default)]
    pub wiki: String,
    /// Members may remove themselves
    #[builder(default = "true")]
    pub members_can_leave: bool,
    /// Admission mode
    #[builder(default)]
    pub accepting_new_members: AcceptingMode,
    /// Review criteria
    #[builder(default)]
    pub new_member_criteria: String,
    /// Listed as a functional area
    #[builder(default)]
    pub functional_area: bool,
    /// Shown in listings and search
    #[builder(default = "true")]
    pub visible: bool,
    /// Terms members must accept
    #[builder(default)]
    pub terms: String,
    /// Membership lapse period in days
    #[builder(default)]
    pub invalidation_days: Option<u32>,
    /// Extra text for invitation emails
    #[builder(default)]
    pub invite_email_text: String,
}

impl NewGroup {
    /// Returns a builder for constructing a NewGroup.
    pub fn builder() -> NewGroupBuilder {
        NewGroupBuilder::default()
    }

    /// Attach the id assigned by the store.
    pub fn into_group(self, id: GroupId) -> Group {
        Group {
            id,
            name: self.name,
            url: self.url,
            description: self.description,
            curators: self.curators,
            irc_channel: self.irc_channel,
            website: self.website,
            wiki: self.wiki,
            members_can_leave: self.members_can_leave,
            accepting_new_members: self.accepting_new_members,
            new_member_criteria: self.new_member_criteria,
            functional_area: self.functional_area,
            visible: self.visible,
            max_reminder: 0,
            terms: self.terms,
            invalidation_days: self.invalidation_days,
            invite_email_text: self.invite_email_text,
        }
    }
}

/// A stored skill. Skills have plain membership: no statuses, no curators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Skill id
    pub id: SkillId,
    /// Unique lowercase name
    pub name: String,
    /// URL slug
    pub url: String,
}
