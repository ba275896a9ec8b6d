//! In-memory implementation of the entity store.
//!
//! All tables live behind a single `RwLock`, so every trait method is atomic
//! with respect to every other. Useful for tests, demonstrations and the
//! maintenance binary, which loads and saves the tables as a JSON snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mozillians_core::{
    Group, GroupAlias, GroupId, GroupMembership, Invite, InviteId, MembershipId, NewGroup,
    NewInvite, NewMembership, Profile, ProfileId, Skill, SkillAlias, SkillId,
};
use mozillians_error::{StoreError, StoreErrorKind, StoreResult};
use mozillians_interface::{
    GroupStore, InviteStore, MembershipFilter, MembershipStore, ProfileStore, SkillStore,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// In-memory entity store.
///
/// Clones share the same tables. All data is lost when the last clone is
/// dropped unless saved with [`InMemoryStore::save_json_file`].
///
/// # Example
/// ```no_run
/// use mozillians_groups::InMemoryStore;
/// use mozillians_interface::GroupStore;
///
/// #[tokio::main]
/// async fn main() {
///     let store = InMemoryStore::new();
///     assert!(store.list_groups().await.unwrap().is_empty());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    profiles: BTreeMap<ProfileId, Profile>,
    groups: BTreeMap<GroupId, Group>,
    group_aliases: Vec<GroupAlias>,
    skills: BTreeMap<SkillId, Skill>,
    skill_aliases: Vec<SkillAlias>,
    skill_members: BTreeSet<(SkillId, ProfileId)>,
    memberships: BTreeMap<(GroupId, ProfileId), GroupMembership>,
    invites: BTreeMap<InviteId, Invite>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Serializable copy of every table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Profiles
    #[serde(default)]
    pub profiles: Vec<Profile>,
    /// Groups
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Group aliases
    #[serde(default)]
    pub group_aliases: Vec<GroupAlias>,
    /// Skills
    #[serde(default)]
    pub skills: Vec<Skill>,
    /// Skill aliases
    #[serde(default)]
    pub skill_aliases: Vec<SkillAlias>,
    /// `(skill, profile)` pairs
    #[serde(default)]
    pub skill_members: Vec<(SkillId, ProfileId)>,
    /// Group memberships
    #[serde(default)]
    pub memberships: Vec<GroupMembership>,
    /// Invites
    #[serde(default)]
    pub invites: Vec<Invite>,
}

fn not_found(what: impl std::fmt::Display) -> StoreError {
    StoreError::new(StoreErrorKind::NotFound(what.to_string()))
}

fn unique_violation(what: impl std::fmt::Display) -> StoreError {
    StoreError::new(StoreErrorKind::UniqueViolation(what.to_string()))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding the contents of `snapshot`.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut tables = Tables::default();
        let ids = snapshot
            .profiles
            .iter()
            .map(|p| p.id.get())
            .chain(snapshot.groups.iter().map(|g| g.id.get()))
            .chain(snapshot.skills.iter().map(|s| s.id.get()))
            .chain(snapshot.memberships.iter().map(|m| m.id.get()))
            .chain(snapshot.invites.iter().map(|i| i.id.get()));
        tables.last_id = ids.max().unwrap_or(0);

        tables.profiles = snapshot.profiles.into_iter().map(|p| (p.id, p)).collect();
        tables.groups = snapshot.groups.into_iter().map(|g| (g.id, g)).collect();
        tables.group_aliases = snapshot.group_aliases;
        tables.skills = snapshot.skills.into_iter().map(|s| (s.id, s)).collect();
        tables.skill_aliases = snapshot.skill_aliases;
        tables.skill_members = snapshot.skill_members.into_iter().collect();
        tables.memberships = snapshot
            .memberships
            .into_iter()
            .map(|m| ((m.group_id, m.profile_id), m))
            .collect();
        tables.invites = snapshot.invites.into_iter().map(|i| (i.id, i)).collect();

        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Copy every table out.
    pub async fn snapshot(&self) -> Snapshot {
        let tables = self.tables.read().await;
        Snapshot {
            profiles: tables.profiles.values().cloned().collect(),
            groups: tables.groups.values().cloned().collect(),
            group_aliases: tables.group_aliases.clone(),
            skills: tables.skills.values().cloned().collect(),
            skill_aliases: tables.skill_aliases.clone(),
            skill_members: tables.skill_members.iter().copied().collect(),
            memberships: tables.memberships.values().cloned().collect(),
            invites: tables.invites.values().cloned().collect(),
        }
    }

    /// Load a store from a JSON snapshot file.
    #[instrument(skip(path))]
    pub fn load_json_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::new(StoreErrorKind::Snapshot(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        })?;
        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            StoreError::new(StoreErrorKind::Snapshot(format!(
                "Failed to parse {}: {}",
                path.display(),
                e
            )))
        })?;
        debug!(
            groups = snapshot.groups.len(),
            memberships = snapshot.memberships.len(),
            "Loaded snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write the store to a JSON snapshot file.
    #[instrument(skip(self, path))]
    pub async fn save_json_file(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot().await;
        let content = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            StoreError::new(StoreErrorKind::Snapshot(format!(
                "Failed to serialize snapshot: {}",
                e
            )))
        })?;
        std::fs::write(path, content).map_err(|e| {
            StoreError::new(StoreErrorKind::Snapshot(format!(
                "Failed to write {}: {}",
                path.display(),
                e
            )))
        })?;
        debug!(path = %path.display(), "Saved snapshot");
        Ok(())
    }

    /// Insert or replace a profile.
    pub async fn insert_profile(&self, profile: Profile) {
        let mut tables = self.tables.write().await;
        tables.last_id = tables.last_id.max(profile.id.get());
        tables.profiles.insert(profile.id, profile);
    }

    /// Backdate a membership's `updated_on` (for testing).
    pub async fn set_membership_updated_on(
        &self,
        group: GroupId,
        profile: ProfileId,
        updated_on: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let membership = tables
            .memberships
            .get_mut(&(group, profile))
            .ok_or_else(|| not_found(format!("membership of {} in {}", profile, group)))?;
        membership.updated_on = updated_on;
        Ok(())
    }

    /// Number of membership rows (for testing).
    pub async fn membership_count(&self) -> usize {
        self.tables.read().await.memberships.len()
    }
}

#[async_trait]
impl GroupStore for InMemoryStore {
    #[instrument(skip(self, group), fields(name = %group.name))]
    async fn create_group(&self, group: &NewGroup) -> StoreResult<Group> {
        let mut tables = self.tables.write().await;
        let id = GroupId(tables.next_id());
        let group = group.clone().into_group(id);
        tables.groups.insert(id, group.clone());
        debug!(group_id = %id, "Group stored");
        Ok(group)
    }

    async fn get_group(&self, id: GroupId) -> StoreResult<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn update_group(&self, group: &Group) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .groups
            .get_mut(&group.id)
            .ok_or_else(|| not_found(format!("group {}", group.id)))?;
        *stored = group.clone();
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_group(&self, id: GroupId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Err(not_found(format!("group {}", id)));
        }
        tables.memberships.retain(|(group, _), _| *group != id);
        tables.invites.retain(|_, invite| invite.group_id != id);
        tables.group_aliases.retain(|alias| alias.target != id);
        Ok(())
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        let mut groups: Vec<Group> = self.tables.read().await.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn create_group_alias(&self, alias: &GroupAlias) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(clash) = tables.group_aliases.iter().find(|a| {
            a.name.eq_ignore_ascii_case(&alias.name) || a.url == alias.url
        }) {
            return Err(unique_violation(format!("group alias '{}'", clash.name)));
        }
        tables.group_aliases.push(alias.clone());
        Ok(())
    }

    async fn group_aliases_named(&self, name: &str) -> StoreResult<Vec<GroupAlias>> {
        let tables = self.tables.read().await;
        Ok(tables
            .group_aliases
            .iter()
            .filter(|a| a.name.to_lowercase() == name.to_lowercase())
            .cloned()
            .collect())
    }

    async fn group_alias_url_taken(&self, url: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.group_aliases.iter().any(|a| a.url == url))
    }

    async fn group_aliases_containing(&self, fragment: &str) -> StoreResult<Vec<GroupAlias>> {
        let tables = self.tables.read().await;
        Ok(tables
            .group_aliases
            .iter()
            .filter(|a| contains_ignore_case(&a.name, fragment))
            .cloned()
            .collect())
    }

    async fn group_by_alias_url(&self, url: &str) -> StoreResult<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables
            .group_aliases
            .iter()
            .find(|a| a.url == url)
            .and_then(|a| tables.groups.get(&a.target))
            .cloned())
    }

    async fn aliases_of_group(&self, id: GroupId) -> StoreResult<Vec<GroupAlias>> {
        let tables = self.tables.read().await;
        Ok(tables
            .group_aliases
            .iter()
            .filter(|a| a.target == id)
            .cloned()
            .collect())
    }

    async fn repoint_group_aliases(&self, from: GroupId, to: GroupId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        for alias in tables.group_aliases.iter_mut().filter(|a| a.target == from) {
            alias.target = to;
        }
        Ok(())
    }
}

#[async_trait]
impl SkillStore for InMemoryStore {
    async fn create_skill(&self, name: &str, url: &str) -> StoreResult<Skill> {
        let mut tables = self.tables.write().await;
        let id = SkillId(tables.next_id());
        let skill = Skill {
            id,
            name: name.to_string(),
            url: url.to_string(),
        };
        tables.skills.insert(id, skill.clone());
        Ok(skill)
    }

    async fn get_skill(&self, id: SkillId) -> StoreResult<Option<Skill>> {
        Ok(self.tables.read().await.skills.get(&id).cloned())
    }

    async fn update_skill(&self, skill: &Skill) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .skills
            .get_mut(&skill.id)
            .ok_or_else(|| not_found(format!("skill {}", skill.id)))?;
        *stored = skill.clone();
        Ok(())
    }

    async fn delete_skill(&self, id: SkillId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.skills.remove(&id).is_none() {
            return Err(not_found(format!("skill {}", id)));
        }
        tables.skill_members.retain(|(skill, _)| *skill != id);
        tables.skill_aliases.retain(|alias| alias.target != id);
        Ok(())
    }

    async fn list_skills(&self) -> StoreResult<Vec<Skill>> {
        let mut skills: Vec<Skill> = self.tables.read().await.skills.values().cloned().collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    async fn create_skill_alias(&self, alias: &SkillAlias) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(clash) = tables.skill_aliases.iter().find(|a| {
            a.name.eq_ignore_ascii_case(&alias.name) || a.url == alias.url
        }) {
            return Err(unique_violation(format!("skill alias '{}'", clash.name)));
        }
        tables.skill_aliases.push(alias.clone());
        Ok(())
    }

    async fn skill_aliases_named(&self, name: &str) -> StoreResult<Vec<SkillAlias>> {
        let tables = self.tables.read().await;
        Ok(tables
            .skill_aliases
            .iter()
            .filter(|a| a.name.to_lowercase() == name.to_lowercase())
            .cloned()
            .collect())
    }

    async fn skill_alias_url_taken(&self, url: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.skill_aliases.iter().any(|a| a.url == url))
    }

    async fn skill_aliases_containing(&self, fragment: &str) -> StoreResult<Vec<SkillAlias>> {
        let tables = self.tables.read().await;
        Ok(tables
            .skill_aliases
            .iter()
            .filter(|a| contains_ignore_case(&a.name, fragment))
            .cloned()
            .collect())
    }

    async fn add_skill_member(&self, skill: SkillId, profile: ProfileId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.skills.contains_key(&skill) {
            return Err(not_found(format!("skill {}", skill)));
        }
        Ok(tables.skill_members.insert((skill, profile)))
    }

    async fn remove_skill_member(&self, skill: SkillId, profile: ProfileId) -> StoreResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .skill_members
            .remove(&(skill, profile)))
    }

    async fn has_skill_member(&self, skill: SkillId, profile: ProfileId) -> StoreResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .skill_members
            .contains(&(skill, profile)))
    }

    async fn count_skill_members(&self, skill: SkillId) -> StoreResult<usize> {
        let tables = self.tables.read().await;
        Ok(tables
            .skill_members
            .iter()
            .filter(|(s, _)| *s == skill)
            .count())
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn get_membership(
        &self,
        group: GroupId,
        profile: ProfileId,
    ) -> StoreResult<Option<GroupMembership>> {
        Ok(self
            .tables
            .read()
            .await
            .memberships
            .get(&(group, profile))
            .cloned())
    }

    #[instrument(skip(self, defaults), fields(group = %defaults.group_id, profile = %defaults.profile_id))]
    async fn get_or_create_membership(
        &self,
        defaults: &NewMembership,
    ) -> StoreResult<(GroupMembership, bool)> {
        let mut tables = self.tables.write().await;
        let key = (defaults.group_id, defaults.profile_id);
        if let Some(existing) = tables.memberships.get(&key) {
            return Ok((existing.clone(), false));
        }
        if !tables.groups.contains_key(&defaults.group_id) {
            return Err(not_found(format!("group {}", defaults.group_id)));
        }

        let membership = GroupMembership {
            id: MembershipId(tables.next_id()),
            profile_id: defaults.profile_id,
            group_id: defaults.group_id,
            status: defaults.status,
            date_joined: Some(defaults.date_joined),
            updated_on: Utc::now(),
            needs_renewal: false,
        };
        tables.memberships.insert(key, membership.clone());
        debug!(membership_id = %membership.id, "Membership stored");
        Ok((membership, true))
    }

    async fn update_membership(&self, membership: &GroupMembership) -> StoreResult<GroupMembership> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .memberships
            .get_mut(&(membership.group_id, membership.profile_id))
            .ok_or_else(|| not_found(format!("membership {}", membership.id)))?;
        stored.status = membership.status;
        stored.needs_renewal = membership.needs_renewal;
        stored.updated_on = Utc::now();
        Ok(stored.clone())
    }

    async fn flag_for_renewal(&self, ids: &[MembershipId]) -> StoreResult<usize> {
        let mut tables = self.tables.write().await;
        let mut flagged = 0;
        for membership in tables
            .memberships
            .values_mut()
            .filter(|m| ids.contains(&m.id))
        {
            membership.needs_renewal = true;
            flagged += 1;
        }
        Ok(flagged)
    }

    async fn delete_membership(&self, group: GroupId, profile: ProfileId) -> StoreResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .memberships
            .remove(&(group, profile))
            .is_some())
    }

    async fn filter_memberships(
        &self,
        filter: &MembershipFilter,
    ) -> StoreResult<Vec<GroupMembership>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<GroupMembership> = tables
            .memberships
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.id);
        Ok(rows)
    }
}

#[async_trait]
impl InviteStore for InMemoryStore {
    async fn create_invite(&self, invite: &NewInvite) -> StoreResult<Invite> {
        let mut tables = self.tables.write().await;
        if tables
            .invites
            .values()
            .any(|i| i.group_id == invite.group_id && i.redeemer == invite.redeemer)
        {
            return Err(unique_violation(format!(
                "invite of {} to {}",
                invite.redeemer, invite.group_id
            )));
        }

        let now = Utc::now();
        let stored = Invite {
            id: InviteId(tables.next_id()),
            group_id: invite.group_id,
            redeemer: invite.redeemer,
            inviter: invite.inviter,
            accepted: false,
            created: now,
            updated: now,
        };
        tables.invites.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_invite(&self, id: InviteId) -> StoreResult<Option<Invite>> {
        Ok(self.tables.read().await.invites.get(&id).cloned())
    }

    async fn update_invite(&self, invite: &Invite) -> StoreResult<Invite> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .invites
            .get_mut(&invite.id)
            .ok_or_else(|| not_found(format!("invite {}", invite.id)))?;
        *stored = invite.clone();
        stored.updated = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_invite(&self, id: InviteId) -> StoreResult<bool> {
        Ok(self.tables.write().await.invites.remove(&id).is_some())
    }

    async fn delete_invites_for(&self, group: GroupId, redeemer: ProfileId) -> StoreResult<usize> {
        let mut tables = self.tables.write().await;
        let before = tables.invites.len();
        tables
            .invites
            .retain(|_, i| !(i.group_id == group && i.redeemer == redeemer));
        Ok(before - tables.invites.len())
    }

    async fn invites_for_group(&self, group: GroupId) -> StoreResult<Vec<Invite>> {
        let tables = self.tables.read().await;
        Ok(tables
            .invites
            .values()
            .filter(|i| i.group_id == group)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_profile(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }
}
