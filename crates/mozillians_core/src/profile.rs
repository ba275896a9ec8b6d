//! User profiles as seen by the membership layer.

use crate::ProfileId;
use serde::{Deserialize, Serialize};

/// The parts of a user profile group membership decisions depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct Profile {
    /// Profile id
    pub id: ProfileId,
    /// Primary email, used for newsletter unsubscription
    pub email: String,
    /// Display name
    #[builder(default)]
    #[serde(default)]
    pub full_name: String,
    /// Whether the identity has been vouched for
    #[builder(default)]
    #[serde(default)]
    pub vouched: bool,
    /// Site managers may curate any group
    #[builder(default)]
    #[serde(default)]
    pub manager: bool,
}

impl Profile {
    /// Returns a builder for constructing a Profile.
    pub fn builder() -> ProfileBuilder {
        ProfileBuilder::default()
    }
}
