//! Tests for add_member / remove_member transitions and their notifications.

mod test_utils;

use mozillians_core::{AcceptingMode, GroupLike, MembershipStatus, NewInvite, Notification};
use mozillians_interface::{InviteStore, MembershipStore};
use test_utils::fixture;

#[tokio::test]
async fn test_add_member_never_demotes() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Reviewed, &[]).await;

    fx.manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();
    let after = fx
        .manager
        .add_member(&group, user.id, MembershipStatus::Pending)
        .await
        .unwrap();

    assert_eq!(after.status, MembershipStatus::Member);
    let stored = fx.store.get_membership(group.id, user.id).await.unwrap().unwrap();
    assert_eq!(stored.status, MembershipStatus::Member);
    assert!(fx.membership_changes().is_empty());
}

#[tokio::test]
async fn test_add_member_twice_is_idempotent() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Reviewed, &[]).await;

    fx.manager
        .add_member(&group, user.id, MembershipStatus::Pending)
        .await
        .unwrap();
    fx.manager
        .add_member(&group, user.id, MembershipStatus::Pending)
        .await
        .unwrap();

    assert_eq!(fx.store.membership_count().await, 1);
    assert!(fx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_first_join_sets_date_and_does_not_notify() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Open, &[]).await;

    let membership = fx
        .manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();

    assert!(membership.date_joined.is_some());
    assert!(fx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_promotion_notifies_with_old_and_new_status() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Reviewed, &[]).await;

    fx.manager
        .add_member(&group, user.id, MembershipStatus::Pending)
        .await
        .unwrap();
    fx.manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();

    assert_eq!(
        fx.membership_changes(),
        vec![Notification::MembershipChanged {
            group: group.id,
            profile: user.id,
            old_status: Some(MembershipStatus::Pending),
            new_status: Some(MembershipStatus::Member),
        }]
    );
}

#[tokio::test]
async fn test_promotion_to_pending_terms_is_silent() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Reviewed, &[]).await;

    fx.manager
        .add_member(&group, user.id, MembershipStatus::Pending)
        .await
        .unwrap();
    let membership = fx
        .manager
        .add_member(&group, user.id, MembershipStatus::PendingTerms)
        .await
        .unwrap();

    assert_eq!(membership.status, MembershipStatus::PendingTerms);
    assert!(fx.membership_changes().is_empty());

    let member = fx
        .manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();
    assert_eq!(member.status, MembershipStatus::Member);
    assert_eq!(fx.membership_changes().len(), 1);
}

#[tokio::test]
async fn test_promotion_clears_renewal_flag() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Reviewed, &[]).await;

    let row = fx
        .manager
        .add_member(&group, user.id, MembershipStatus::Pending)
        .await
        .unwrap();
    fx.store.flag_for_renewal(&[row.id]).await.unwrap();

    let promoted = fx
        .manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();
    assert!(!promoted.needs_renewal);
}

#[tokio::test]
async fn test_remove_from_open_group_deletes_row() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Open, &[]).await;
    fx.manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();

    let remaining = fx
        .manager
        .remove_member(&group, &user, Some(MembershipStatus::Pending))
        .await
        .unwrap();

    assert!(remaining.is_none());
    let target = GroupLike::from(group.clone());
    assert!(!fx.manager.has_member(&target, user.id).await.unwrap());
    assert!(!fx.manager.has_pending_member(&target, user.id).await.unwrap());
    assert_eq!(
        fx.membership_changes(),
        vec![Notification::MembershipChanged {
            group: group.id,
            profile: user.id,
            old_status: Some(MembershipStatus::Member),
            new_status: None,
        }]
    );
}

#[tokio::test]
async fn test_remove_from_reviewed_group_demotes_member() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Reviewed, &[]).await;
    fx.manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();

    let remaining = fx
        .manager
        .remove_member(&group, &user, Some(MembershipStatus::Pending))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(remaining.status, MembershipStatus::Pending);
    let stored = fx.store.get_membership(group.id, user.id).await.unwrap().unwrap();
    assert_eq!(stored.status, MembershipStatus::Pending);
    assert_eq!(fx.membership_changes().len(), 1);
}

#[tokio::test]
async fn test_remove_from_closed_group_without_status_deletes() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Closed, &[]).await;
    fx.manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();

    fx.manager.remove_member(&group, &user, None).await.unwrap();
    assert!(fx.store.get_membership(group.id, user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_declining_pending_request_deletes_row_and_invite() {
    let fx = fixture();
    let curator = fx.profile(1).await;
    let user = fx.profile(2).await;
    let group = fx.group("qa", AcceptingMode::Closed, &[&curator]).await;
    fx.store
        .create_invite(&NewInvite {
            group_id: group.id,
            redeemer: user.id,
            inviter: Some(curator.id),
        })
        .await
        .unwrap();
    fx.manager
        .add_member(&group, user.id, MembershipStatus::Pending)
        .await
        .unwrap();

    let remaining = fx
        .manager
        .remove_member(&group, &user, Some(MembershipStatus::Pending))
        .await
        .unwrap();

    assert!(remaining.is_none());
    assert!(fx.store.invites_for_group(group.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_without_membership_is_noop() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Open, &[]).await;

    let remaining = fx.manager.remove_member(&group, &user, None).await.unwrap();
    assert!(remaining.is_none());
    assert!(fx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_notifier_failure_keeps_membership_change() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Reviewed, &[]).await;
    fx.manager
        .add_member(&group, user.id, MembershipStatus::Pending)
        .await
        .unwrap();

    fx.notifier.fail_next(1);
    let promoted = fx
        .manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();

    assert_eq!(promoted.status, MembershipStatus::Member);
    assert!(fx.membership_changes().is_empty());
}

#[tokio::test]
async fn test_concurrent_first_joins_share_one_row() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Reviewed, &[]).await;

    let (a, b) = tokio::join!(
        fx.manager
            .add_member(&group, user.id, MembershipStatus::Pending),
        fx.manager
            .add_member(&group, user.id, MembershipStatus::Pending),
    );

    assert_eq!(a.unwrap().id, b.unwrap().id);
    assert_eq!(fx.store.membership_count().await, 1);
}
