//! Typed identifiers for stored records.

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
            derive_more::Into,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw numeric value.
            pub fn get(self) -> i64 {
                self.0
            }
        }
    };
}

record_id!(
    /// Identifies a user profile.
    ProfileId
);
record_id!(
    /// Identifies a group.
    GroupId
);
record_id!(
    /// Identifies a skill.
    SkillId
);
record_id!(
    /// Identifies a group membership row.
    MembershipId
);
record_id!(
    /// Identifies an invitation.
    InviteId
);
