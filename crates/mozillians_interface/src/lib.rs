//! Port traits for the Mozillians membership layer.
//!
//! The domain logic depends only on these traits: an entity store reachable
//! through per-record repositories, and a notification dispatcher reachable
//! through a non-blocking queue.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod notify;
mod store;

pub use notify::NotificationPort;
pub use store::{
    EntityStore, GroupStore, InviteStore, MembershipFilter, MembershipStore, ProfileStore,
    SkillStore,
};
