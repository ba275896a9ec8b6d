//! Tests for join/leave policies evaluated against stored memberships.

mod test_utils;

use mozillians_core::{AcceptingMode, GroupLike, MembershipStatus};
use mozillians_interface::MembershipStore;
use test_utils::fixture;

#[tokio::test]
async fn test_sole_curator_cannot_leave_until_second_curator() {
    let fx = fixture();
    let curator = fx.profile(1).await;
    let other = fx.profile(2).await;
    let mut group = fx.group("qa", AcceptingMode::Reviewed, &[&curator]).await;
    fx.manager
        .add_member(&group, curator.id, MembershipStatus::Member)
        .await
        .unwrap();

    let target = GroupLike::from(group.clone());
    assert!(!fx.manager.user_can_leave(&target, &curator).await.unwrap());

    group.curators.insert(other.id);
    fx.manager.save_group(&mut group).await.unwrap();
    let target = GroupLike::from(group);
    assert!(fx.manager.user_can_leave(&target, &curator).await.unwrap());
}

#[tokio::test]
async fn test_non_member_cannot_leave() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Open, &[]).await;

    let target = GroupLike::from(group);
    assert!(!fx.manager.user_can_leave(&target, &user).await.unwrap());
}

#[tokio::test]
async fn test_pending_member_can_leave() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Reviewed, &[]).await;
    fx.manager
        .add_member(&group, user.id, MembershipStatus::Pending)
        .await
        .unwrap();

    let target = GroupLike::from(group);
    assert!(fx.manager.user_can_leave(&target, &user).await.unwrap());
}

#[tokio::test]
async fn test_can_join_requires_vouched_open_and_no_membership() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let mut unvouched = fx.profile(2).await;
    unvouched.vouched = false;
    let open = fx.group("open", AcceptingMode::Open, &[]).await;
    let closed = fx.group("closed", AcceptingMode::Closed, &[]).await;

    let open_target = GroupLike::from(open.clone());
    assert!(fx.manager.user_can_join(&open_target, &user).await.unwrap());
    assert!(!fx.manager.user_can_join(&open_target, &unvouched).await.unwrap());
    let closed_target = GroupLike::from(closed);
    assert!(!fx.manager.user_can_join(&closed_target, &user).await.unwrap());

    fx.manager
        .add_member(&open, user.id, MembershipStatus::Member)
        .await
        .unwrap();
    assert!(!fx.manager.user_can_join(&open_target, &user).await.unwrap());
}

#[tokio::test]
async fn test_renewal_flag_counts_as_pending() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let group = fx.group("qa", AcceptingMode::Reviewed, &[]).await;
    let row = fx
        .manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();
    let target = GroupLike::from(group);
    assert!(!fx.manager.has_pending_member(&target, user.id).await.unwrap());

    fx.store.flag_for_renewal(&[row.id]).await.unwrap();

    assert!(fx.manager.has_pending_member(&target, user.id).await.unwrap());
    assert!(fx.manager.has_member(&target, user.id).await.unwrap());
    assert!(!fx.manager.user_can_join(&target, &user).await.unwrap());
}

#[tokio::test]
async fn test_skill_membership_has_no_pending_state() {
    let fx = fixture();
    let user = fx.profile(1).await;
    let skill = fx.manager.create_skill("Rust").await.unwrap();

    assert!(fx.manager.add_skill_member(&skill, &user).await.unwrap());
    let target = GroupLike::from(skill);
    assert!(fx.manager.has_member(&target, user.id).await.unwrap());
    assert!(!fx.manager.has_pending_member(&target, user.id).await.unwrap());
    assert!(fx.manager.user_can_leave(&target, &user).await.unwrap());
    assert!(!fx.manager.user_can_join(&target, &user).await.unwrap());
}
