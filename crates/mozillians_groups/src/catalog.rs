//! Group and skill records: saving, naming, search and listings.

use crate::GroupManager;
use crate::workflow::ensure_curator;
use mozillians_core::{
    Alias, Group, GroupAlias, GroupId, GroupLike, GroupPolicy, NewGroup, Profile, Skill,
    SkillAlias, SkillId, check_name_available, slug_candidates, slugify,
};
use mozillians_error::{MembershipError, MembershipErrorKind, MozilliansResult, ValidationError};
use mozillians_interface::{EntityStore, MembershipFilter, NotificationPort};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl<S, N> GroupManager<S, N>
where
    S: EntityStore,
    N: NotificationPort,
{
    /// Insert a new group with its primary alias.
    ///
    /// The name is trimmed and lowercased, then checked against the group and
    /// skill alias namespaces. The slug comes from the requested url, or from
    /// the name when none was given, with `-2`, `-3`, ... appended until free.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_group(&self, mut new: NewGroup) -> MozilliansResult<Group> {
        new.name = normalize_name(&new.name);
        self.ensure_name_available(&new.name, None, None).await?;

        let base = if new.url.trim().is_empty() {
            slugify(&new.name)
        } else {
            slugify(&new.url)
        };
        new.url = self.free_group_slug(&base).await?;

        let group = self.store().create_group(&new).await?;
        self.store()
            .create_group_alias(&GroupAlias {
                name: group.name.clone(),
                url: group.url.clone(),
                target: group.id,
            })
            .await?;
        info!(group_id = %group.id, url = %group.url, "Group created");
        Ok(group)
    }

    /// Save changes to an existing group.
    ///
    /// A renamed group keeps its old aliases and gains one for the new name,
    /// so both names keep resolving. The url never changes.
    #[instrument(skip(self, group), fields(group_id = %group.id))]
    pub async fn save_group(&self, group: &mut Group) -> MozilliansResult<()> {
        group.name = normalize_name(&group.name);
        let aliases = self.store().group_aliases_named(&group.name).await?;
        group.validate(&aliases)?;
        self.ensure_name_available(&group.name, Some(group.id), None)
            .await?;

        self.store().update_group(group).await?;
        if !aliases.iter().any(|a| a.target == group.id) {
            let url = self.free_group_slug(&slugify(&group.name)).await?;
            debug!(name = %group.name, %url, "Adding alias for new name");
            self.store()
                .create_group_alias(&Alias {
                    name: group.name.clone(),
                    url,
                    target: group.id,
                })
                .await?;
        }
        Ok(())
    }

    /// Insert a new skill with its primary alias.
    #[instrument(skip(self))]
    pub async fn create_skill(&self, name: &str) -> MozilliansResult<Skill> {
        let name = normalize_name(name);
        self.ensure_name_available(&name, None, None).await?;
        let url = self.free_skill_slug(&slugify(&name)).await?;

        let skill = self.store().create_skill(&name, &url).await?;
        self.store()
            .create_skill_alias(&SkillAlias {
                name: skill.name.clone(),
                url: skill.url.clone(),
                target: skill.id,
            })
            .await?;
        info!(skill_id = %skill.id, "Skill created");
        Ok(skill)
    }

    /// Save changes to an existing skill.
    #[instrument(skip(self, skill), fields(skill_id = %skill.id))]
    pub async fn save_skill(&self, skill: &mut Skill) -> MozilliansResult<()> {
        skill.name = normalize_name(&skill.name);
        let aliases = self.store().skill_aliases_named(&skill.name).await?;
        skill.validate(&aliases)?;
        self.ensure_name_available(&skill.name, None, Some(skill.id))
            .await?;

        self.store().update_skill(skill).await?;
        if !aliases.iter().any(|a| a.target == skill.id) {
            let url = self.free_skill_slug(&slugify(&skill.name)).await?;
            self.store()
                .create_skill_alias(&Alias {
                    name: skill.name.clone(),
                    url,
                    target: skill.id,
                })
                .await?;
        }
        Ok(())
    }

    /// Resolve a slug, including those of merged groups, to its group.
    pub async fn resolve_group(&self, url: &str) -> MozilliansResult<Option<Group>> {
        Ok(self.store().group_by_alias_url(url).await?)
    }

    /// Visible groups whose name or any alias contains `query`, by name.
    #[instrument(skip(self))]
    pub async fn search_groups(&self, query: &str) -> MozilliansResult<Vec<Group>> {
        let query = query.trim().to_lowercase();
        let hits: BTreeSet<GroupId> = self
            .store()
            .group_aliases_containing(&query)
            .await?
            .into_iter()
            .map(|a| a.target)
            .collect();

        Ok(self
            .store()
            .list_groups()
            .await?
            .into_iter()
            .filter(|g| g.visible && (hits.contains(&g.id) || g.name.contains(&query)))
            .collect())
    }

    /// Skills whose name or any alias contains `query`, by name.
    #[instrument(skip(self))]
    pub async fn search_skills(&self, query: &str) -> MozilliansResult<Vec<Skill>> {
        let query = query.trim().to_lowercase();
        let hits: BTreeSet<SkillId> = self
            .store()
            .skill_aliases_containing(&query)
            .await?
            .into_iter()
            .map(|a| a.target)
            .collect();

        Ok(self
            .store()
            .list_skills()
            .await?
            .into_iter()
            .filter(|s| hits.contains(&s.id) || s.name.contains(&query))
            .collect())
    }

    /// Visible functional areas.
    pub async fn functional_areas(&self) -> MozilliansResult<Vec<Group>> {
        Ok(self
            .store()
            .list_groups()
            .await?
            .into_iter()
            .filter(|g| g.visible && g.functional_area)
            .collect())
    }

    /// Visible groups that are not functional areas.
    pub async fn non_functional_areas(&self) -> MozilliansResult<Vec<Group>> {
        Ok(self
            .store()
            .list_groups()
            .await?
            .into_iter()
            .filter(|g| g.visible && !g.functional_area)
            .collect())
    }

    /// Visible non-functional groups with at least one curator.
    pub async fn curated_groups(&self) -> MozilliansResult<Vec<Group>> {
        Ok(self
            .non_functional_areas()
            .await?
            .into_iter()
            .filter(|g| !g.curators.is_empty())
            .collect())
    }

    /// Delete a group on behalf of `actor`.
    ///
    /// Only a curator or manager may delete, and only while the actor holds
    /// the one membership row left.
    #[instrument(skip(self, group, actor), fields(group = %group.name, actor = %actor.id))]
    pub async fn delete_group(&self, group: &Group, actor: &Profile) -> MozilliansResult<()> {
        ensure_curator(group, actor)?;

        let filter = MembershipFilter::new().with_group(Some(group.id));
        let rows = self.store().filter_memberships(&filter).await?;
        if !rows.iter().any(|m| m.profile_id == actor.id) {
            return Err(MembershipError::new(MembershipErrorKind::NotMember {
                profile: actor.id.get(),
                group: group.name.clone(),
            })
            .into());
        }
        if rows.len() > 1 {
            return Err(
                MembershipError::new(MembershipErrorKind::NotEmpty(group.name.clone())).into(),
            );
        }

        self.store().delete_group(group.id).await?;
        info!("Group deleted");
        Ok(())
    }

    /// Give `profile` the skill. Returns false if they may not join or already have it.
    #[instrument(skip(self, skill, profile), fields(skill = %skill.name, profile = %profile.id))]
    pub async fn add_skill_member(&self, skill: &Skill, profile: &Profile) -> MozilliansResult<bool> {
        let target = GroupLike::from(skill.clone());
        if !self.user_can_join(&target, profile).await? {
            debug!("Profile may not take this skill");
            return Ok(false);
        }
        Ok(self.store().add_skill_member(skill.id, profile.id).await?)
    }

    /// Take the skill from `profile`. Returns false if they did not have it.
    pub async fn remove_skill_member(
        &self,
        skill: &Skill,
        profile: &Profile,
    ) -> MozilliansResult<bool> {
        Ok(self.store().remove_skill_member(skill.id, profile.id).await?)
    }

    /// Add or remove the skill. Returns whether `profile` has it afterwards.
    pub async fn toggle_skill_membership(
        &self,
        skill: &Skill,
        profile: &Profile,
    ) -> MozilliansResult<bool> {
        if self.store().has_skill_member(skill.id, profile.id).await? {
            self.remove_skill_member(skill, profile).await?;
            Ok(false)
        } else {
            self.add_skill_member(skill, profile).await
        }
    }

    /// Whether `profile` has the skill.
    pub async fn has_skill_member(&self, skill: &Skill, profile: &Profile) -> MozilliansResult<bool> {
        Ok(self.store().has_skill_member(skill.id, profile.id).await?)
    }

    /// Check `name` against both alias namespaces, ignoring the owner's own aliases.
    async fn ensure_name_available(
        &self,
        name: &str,
        group: Option<GroupId>,
        skill: Option<SkillId>,
    ) -> MozilliansResult<()> {
        let group_aliases = self.store().group_aliases_named(name).await?;
        check_name_available(name, &group_aliases, group)?;
        let skill_aliases = self.store().skill_aliases_named(name).await?;
        check_name_available(name, &skill_aliases, skill)?;
        Ok(())
    }

    async fn free_group_slug(&self, base: &str) -> MozilliansResult<String> {
        for candidate in slug_candidates(base) {
            if !self.store().group_alias_url_taken(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(ValidationError::new("url", "No free slug for this name.").into())
    }

    async fn free_skill_slug(&self, base: &str) -> MozilliansResult<String> {
        for candidate in slug_candidates(base) {
            if !self.store().skill_alias_url_taken(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(ValidationError::new("url", "No free slug for this name.").into())
    }
}
