//! Membership status and group admission modes.

use serde::{Deserialize, Serialize};

/// Status of a profile's membership row in a group.
///
/// The stored values match the original `groups_groupmembership.status`
/// column.
///
/// ```
/// use mozillians_core::MembershipStatus;
/// use std::str::FromStr;
///
/// assert_eq!(MembershipStatus::PendingTerms.to_string(), "pending_terms");
/// assert_eq!(MembershipStatus::from_str("member").unwrap(), MembershipStatus::Member);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MembershipStatus {
    /// Full member
    Member,
    /// Asked to join, waiting for a curator
    Pending,
    /// Accepted, waiting for the profile to accept the group terms
    PendingTerms,
}

impl MembershipStatus {
    /// Whether moving from `self` to `to` is a promotion `add_member` may apply.
    ///
    /// Only `pending -> member`, `pending -> pending_terms` and
    /// `pending_terms -> member` qualify. Everything else, including every
    /// demotion and every self-transition, is not a promotion.
    pub fn can_promote_to(self, to: MembershipStatus) -> bool {
        matches!(
            (self, to),
            (MembershipStatus::Pending, MembershipStatus::Member)
                | (MembershipStatus::Pending, MembershipStatus::PendingTerms)
                | (MembershipStatus::PendingTerms, MembershipStatus::Member)
        )
    }

    /// Whether this status awaits someone's action (curator or terms).
    pub fn is_pending(self) -> bool {
        matches!(self, MembershipStatus::Pending | MembershipStatus::PendingTerms)
    }
}

/// How a group admits new members.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum AcceptingMode {
    /// Anyone vouched can join
    #[default]
    #[serde(rename = "yes")]
    #[strum(serialize = "yes")]
    Open,
    /// Requests go to the curators
    #[serde(rename = "by_request")]
    #[strum(serialize = "by_request")]
    Reviewed,
    /// No requests accepted
    #[serde(rename = "no")]
    #[strum(serialize = "no")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_only_three_promotions() {
        let legal: Vec<_> = MembershipStatus::iter()
            .flat_map(|from| MembershipStatus::iter().map(move |to| (from, to)))
            .filter(|(from, to)| from.can_promote_to(*to))
            .collect();

        assert_eq!(
            legal,
            vec![
                (MembershipStatus::Pending, MembershipStatus::Member),
                (MembershipStatus::Pending, MembershipStatus::PendingTerms),
                (MembershipStatus::PendingTerms, MembershipStatus::Member),
            ]
        );
    }

    #[test]
    fn test_accepting_mode_wire_values() {
        assert_eq!(AcceptingMode::Reviewed.to_string(), "by_request");
        assert_eq!(
            serde_json::to_string(&AcceptingMode::Closed).unwrap(),
            "\"no\""
        );
        assert_eq!(AcceptingMode::default(), AcceptingMode::Open);
    }
}
