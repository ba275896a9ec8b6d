//! Core data types for Mozillians groups, skills and memberships.
//!
//! This crate holds the records the membership layer reads and writes, plus
//! the pure join/leave policies that depend only on those records.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod alias;
mod group;
mod ids;
mod invite;
mod membership;
mod notification;
mod policy;
mod profile;
mod status;

pub use alias::{Alias, GroupAlias, SkillAlias, check_name_available, slug_candidates, slugify};
pub use group::{Group, NewGroup, NewGroupBuilder, NewGroupBuilderError, Skill};
pub use ids::{GroupId, InviteId, MembershipId, ProfileId, SkillId};
pub use invite::{Invite, NewInvite};
pub use membership::{GroupMembership, NewMembership, Standing};
pub use notification::{MembershipEmail, Notification};
pub use policy::{GroupLike, GroupPolicy};
pub use profile::{Profile, ProfileBuilder, ProfileBuilderError};
pub use status::{AcceptingMode, MembershipStatus};
