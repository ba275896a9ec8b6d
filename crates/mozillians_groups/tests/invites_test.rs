//! Tests for the invitation workflow.

mod test_utils;

use mozillians_core::{AcceptingMode, InviteId, MembershipStatus, NewGroup, Notification};
use mozillians_error::{MembershipErrorKind, MozilliansErrorKind};
use mozillians_interface::{InviteStore, MembershipStore};
use test_utils::fixture;

#[tokio::test]
async fn test_invite_and_accept() {
    let fx = fixture();
    let curator = fx.profile(1).await;
    let user = fx.profile(2).await;
    let group = fx
        .manager
        .create_group(
            NewGroup::builder()
                .name("closed club")
                .accepting_new_members(AcceptingMode::Closed)
                .curators([curator.id].into_iter().collect::<std::collections::BTreeSet<_>>())
                .invite_email_text("Welcome aboard")
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let invite = fx.manager.invite(&group, &curator, user.id).await.unwrap();
    let err = fx.manager.send_invitation(&invite, &user).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        MozilliansErrorKind::Membership(m) if matches!(m.kind, MembershipErrorKind::NotCurator { .. })
    ));
    assert!(fx.notifier.sent().is_empty());
    fx.manager.send_invitation(&invite, &curator).await.unwrap();
    assert!(fx.notifier.sent().contains(&Notification::InvitationSent {
        invite: invite.id,
        custom_text: "Welcome aboard".to_string(),
    }));

    let membership = fx.manager.accept_invitation(invite.id, &user).await.unwrap();
    assert_eq!(membership.status, MembershipStatus::Member);
    let stored = fx.store.get_invite(invite.id).await.unwrap().unwrap();
    assert!(stored.accepted);
    assert!(fx
        .notifier
        .sent()
        .contains(&Notification::InvitationAccepted { invite: invite.id }));
}

#[tokio::test]
async fn test_accept_into_group_with_terms() {
    let fx = fixture();
    let curator = fx.profile(1).await;
    let user = fx.profile(2).await;
    let group = fx
        .manager
        .create_group(
            NewGroup::builder()
                .name("legal")
                .curators([curator.id].into_iter().collect::<std::collections::BTreeSet<_>>())
                .terms("Keep secrets")
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let invite = fx.manager.invite(&group, &curator, user.id).await.unwrap();
    let membership = fx.manager.accept_invitation(invite.id, &user).await.unwrap();
    assert_eq!(membership.status, MembershipStatus::PendingTerms);
}

#[tokio::test]
async fn test_only_curators_invite_once() {
    let fx = fixture();
    let curator = fx.profile(1).await;
    let stranger = fx.profile(2).await;
    let user = fx.profile(3).await;
    let group = fx.group("qa", AcceptingMode::Closed, &[&curator]).await;

    let err = fx.manager.invite(&group, &stranger, user.id).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        MozilliansErrorKind::Membership(m) if matches!(m.kind, MembershipErrorKind::NotCurator { .. })
    ));

    fx.manager.invite(&group, &curator, user.id).await.unwrap();
    let err = fx.manager.invite(&group, &curator, user.id).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        MozilliansErrorKind::Store(s) if s.is_unique_violation()
    ));
}

#[tokio::test]
async fn test_members_are_not_invited() {
    let fx = fixture();
    let curator = fx.profile(1).await;
    let user = fx.profile(2).await;
    let group = fx.group("qa", AcceptingMode::Closed, &[&curator]).await;
    fx.manager
        .add_member(&group, user.id, MembershipStatus::Member)
        .await
        .unwrap();

    let err = fx.manager.invite(&group, &curator, user.id).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        MozilliansErrorKind::Membership(m) if matches!(m.kind, MembershipErrorKind::AlreadyMember { .. })
    ));
}

#[tokio::test]
async fn test_only_redeemer_may_answer() {
    let fx = fixture();
    let curator = fx.profile(1).await;
    let user = fx.profile(2).await;
    let group = fx.group("qa", AcceptingMode::Closed, &[&curator]).await;
    let invite = fx.manager.invite(&group, &curator, user.id).await.unwrap();

    let err = fx
        .manager
        .accept_invitation(invite.id, &curator)
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        MozilliansErrorKind::Membership(m) if matches!(m.kind, MembershipErrorKind::NotRedeemer(_))
    ));

    let err = fx
        .manager
        .reject_invitation(InviteId(999), &user)
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        MozilliansErrorKind::Membership(m) if matches!(m.kind, MembershipErrorKind::InviteNotFound(999))
    ));
}

#[tokio::test]
async fn test_reject_notifies_inviter_and_deletes() {
    let fx = fixture();
    let curator = fx.profile(1).await;
    let user = fx.profile(2).await;
    let group = fx.group("qa", AcceptingMode::Closed, &[&curator]).await;
    let invite = fx.manager.invite(&group, &curator, user.id).await.unwrap();

    fx.manager.reject_invitation(invite.id, &user).await.unwrap();

    assert!(fx.store.get_invite(invite.id).await.unwrap().is_none());
    assert!(fx.notifier.sent().contains(&Notification::InvitationRejected {
        group: group.id,
        redeemer: user.id,
        inviter: Some(curator.id),
    }));
    assert!(fx.store.get_membership(group.id, user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoke_tells_redeemer() {
    let fx = fixture();
    let curator = fx.profile(1).await;
    let user = fx.profile(2).await;
    let group = fx.group("qa", AcceptingMode::Closed, &[&curator]).await;
    let invite = fx.manager.invite(&group, &curator, user.id).await.unwrap();

    assert!(fx.manager.revoke_invite(invite.id, &user).await.is_err());
    fx.manager.revoke_invite(invite.id, &curator).await.unwrap();

    assert!(fx.store.invites_for_group(group.id).await.unwrap().is_empty());
    assert!(fx.notifier.sent().contains(&Notification::InvitationInvalid {
        group: group.id,
        redeemer: user.id,
    }));
}
