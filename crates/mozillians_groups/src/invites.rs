//! Invitations into groups.

use crate::GroupManager;
use crate::workflow::ensure_curator;
use mozillians_core::{
    Group, GroupMembership, Invite, InviteId, MembershipStatus, NewInvite, Notification, Profile,
    ProfileId,
};
use mozillians_error::{MembershipError, MembershipErrorKind, MozilliansResult};
use mozillians_interface::{EntityStore, NotificationPort};
use tracing::{info, instrument};

impl<S, N> GroupManager<S, N>
where
    S: EntityStore,
    N: NotificationPort,
{
    /// Curator invites `redeemer` into `group`.
    ///
    /// Fails with a unique violation if the profile already has an invite
    /// for this group.
    #[instrument(skip(self, group, inviter), fields(group = %group.name, inviter = %inviter.id))]
    pub async fn invite(
        &self,
        group: &Group,
        inviter: &Profile,
        redeemer: ProfileId,
    ) -> MozilliansResult<Invite> {
        ensure_curator(group, inviter)?;
        let current = self.store().get_membership(group.id, redeemer).await?;
        if current.is_some_and(|m| m.status == MembershipStatus::Member) {
            return Err(MembershipError::new(MembershipErrorKind::AlreadyMember {
                profile: redeemer.get(),
                group: group.name.clone(),
            })
            .into());
        }

        let invite = self
            .store()
            .create_invite(&NewInvite {
                group_id: group.id,
                redeemer,
                inviter: Some(inviter.id),
            })
            .await?;
        info!(invite_id = %invite.id, "Invite created");
        Ok(invite)
    }

    /// Curator emails the invitation to its redeemer with the group's custom text.
    #[instrument(skip(self, invite, actor), fields(invite_id = %invite.id, actor = %actor.id))]
    pub async fn send_invitation(&self, invite: &Invite, actor: &Profile) -> MozilliansResult<()> {
        let group = self.load_group(invite).await?;
        ensure_curator(&group, actor)?;
        self.notify(
            "invitation sent",
            self.notifier().enqueue(Notification::InvitationSent {
                invite: invite.id,
                custom_text: group.invite_email_text,
            }),
        );
        Ok(())
    }

    /// The redeemer accepts an invitation.
    ///
    /// They join as a member, or at `pending_terms` when the group has terms.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn accept_invitation(
        &self,
        invite_id: InviteId,
        actor: &Profile,
    ) -> MozilliansResult<GroupMembership> {
        let mut invite = self.redeemable_invite(invite_id, actor).await?;
        let group = self.load_group(&invite).await?;

        let status = if group.has_terms() {
            MembershipStatus::PendingTerms
        } else {
            MembershipStatus::Member
        };
        let membership = self.add_member(&group, actor.id, status).await?;

        invite.accepted = true;
        self.store().update_invite(&invite).await?;
        info!(group = %group.name, "Invitation accepted");
        self.notify(
            "invitation accepted",
            self.notifier()
                .enqueue(Notification::InvitationAccepted { invite: invite.id }),
        );
        Ok(membership)
    }

    /// The redeemer turns an invitation down. The invite is deleted.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn reject_invitation(&self, invite_id: InviteId, actor: &Profile) -> MozilliansResult<()> {
        let invite = self.redeemable_invite(invite_id, actor).await?;
        self.notify(
            "invitation rejected",
            self.notifier().enqueue(Notification::InvitationRejected {
                group: invite.group_id,
                redeemer: invite.redeemer,
                inviter: invite.inviter,
            }),
        );
        self.store().delete_invite(invite.id).await?;
        Ok(())
    }

    /// A curator withdraws an invitation and the redeemer is told.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn revoke_invite(&self, invite_id: InviteId, actor: &Profile) -> MozilliansResult<()> {
        let invite = self
            .store()
            .get_invite(invite_id)
            .await?
            .ok_or_else(|| MembershipError::new(MembershipErrorKind::InviteNotFound(invite_id.get())))?;
        let group = self.load_group(&invite).await?;
        ensure_curator(&group, actor)?;

        self.store().delete_invite(invite.id).await?;
        info!(group = %group.name, redeemer = %invite.redeemer, "Invite revoked");
        self.notify(
            "invitation invalid",
            self.notifier().enqueue(Notification::InvitationInvalid {
                group: invite.group_id,
                redeemer: invite.redeemer,
            }),
        );
        Ok(())
    }

    async fn redeemable_invite(&self, invite_id: InviteId, actor: &Profile) -> MozilliansResult<Invite> {
        let invite = self
            .store()
            .get_invite(invite_id)
            .await?
            .ok_or_else(|| MembershipError::new(MembershipErrorKind::InviteNotFound(invite_id.get())))?;
        if invite.redeemer != actor.id {
            return Err(MembershipError::new(MembershipErrorKind::NotRedeemer(invite_id.get())).into());
        }
        Ok(invite)
    }

    async fn load_group(&self, invite: &Invite) -> MozilliansResult<Group> {
        Ok(self
            .store()
            .get_group(invite.group_id)
            .await?
            .ok_or_else(|| {
                MembershipError::new(MembershipErrorKind::GroupNotFound(invite.group_id.get()))
            })?)
    }
}
