//! Alternate names for groups and skills.
//!
//! Every group or skill owns at least one alias: the one created on first
//! save, whose slug becomes the record's URL. Merged groups hand their
//! aliases to the group that absorbed them, so old URLs and names keep
//! resolving.

use mozillians_error::ValidationError;
use serde::{Deserialize, Serialize};

/// An alternate name and slug pointing at a record of id type `I`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias<I> {
    /// Unique name in this namespace
    pub name: String,
    /// Unique slug in this namespace
    pub url: String,
    /// Record the alias resolves to
    pub target: I,
}

/// Alias of a group.
pub type GroupAlias = Alias<crate::GroupId>;

/// Alias of a skill.
pub type SkillAlias = Alias<crate::SkillId>;

/// Check that `name` is not already taken in an alias namespace.
///
/// `aliases` are the aliases whose name matches, case-insensitively.
/// Aliases already pointing at `owner` do not count, so a record can be
/// re-saved under its own name.
///
/// ```
/// use mozillians_core::{check_name_available, GroupAlias, GroupId};
///
/// let taken = vec![GroupAlias { name: "rust".into(), url: "rust".into(), target: GroupId(1) }];
/// assert!(check_name_available("Rust", &taken, None).is_err());
/// assert!(check_name_available("rust", &taken, Some(GroupId(1))).is_ok());
/// ```
pub fn check_name_available<I: PartialEq + Copy>(
    name: &str,
    aliases: &[Alias<I>],
    owner: Option<I>,
) -> Result<(), ValidationError> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(ValidationError::new("name", "This field is required."));
    }

    let clash = aliases
        .iter()
        .filter(|alias| Some(alias.target) != owner)
        .any(|alias| alias.name.to_lowercase() == name);
    if clash {
        return Err(ValidationError::new("name", "This name already exists."));
    }
    Ok(())
}

/// Derive a URL slug from a name.
///
/// Lowercases, keeps alphanumerics, and collapses every other run of
/// characters into a single `-`. Names with nothing usable slug to `group`.
///
/// ```
/// use mozillians_core::slugify;
///
/// assert_eq!(slugify("  Web Dev / QA  "), "web-dev-qa");
/// assert_eq!(slugify("!!!"), "group");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("group");
    }
    slug
}

/// Slugs to try in order when `base` may be taken: `base`, `base-2`, `base-3`, ...
///
/// ```
/// use mozillians_core::slug_candidates;
///
/// let first: Vec<_> = slug_candidates("rust").take(3).collect();
/// assert_eq!(first, ["rust", "rust-2", "rust-3"]);
/// ```
pub fn slug_candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((2u32..).map(move |n| format!("{}-{}", base, n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GroupId;

    #[test]
    fn test_first_free_candidate() {
        let existing = ["rust", "rust-2"];
        let slug = slug_candidates("rust")
            .find(|s| !existing.contains(&s.as_str()))
            .unwrap();
        assert_eq!(slug, "rust-3");
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = check_name_available::<GroupId>("   ", &[], None).unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_alias_of_other_record_rejected() {
        let aliases = vec![GroupAlias {
            name: "Localization".into(),
            url: "localization".into(),
            target: GroupId(4),
        }];
        let err = check_name_available("localization", &aliases, Some(GroupId(9))).unwrap_err();
        assert!(err.message.contains("already exists"));
    }
}
