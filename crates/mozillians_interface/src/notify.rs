//! Notification dispatcher port.

use mozillians_core::{GroupId, MembershipStatus, Notification, ProfileId};
use mozillians_error::NotifyResult;

/// Fire-and-forget hand-off to whatever sends emails and newsletter requests.
///
/// `enqueue` must return without waiting for delivery. An error means the
/// notification was not accepted at all (for example the queue is gone);
/// delivery failures after acceptance are the dispatcher's concern.
pub trait NotificationPort: Send + Sync {
    /// Accept a notification for later delivery.
    fn enqueue(&self, notification: Notification) -> NotifyResult<()>;

    /// Tell a member their status in a group changed.
    fn enqueue_membership_change(
        &self,
        group: GroupId,
        profile: ProfileId,
        old_status: Option<MembershipStatus>,
        new_status: Option<MembershipStatus>,
    ) -> NotifyResult<()> {
        self.enqueue(Notification::MembershipChanged {
            group,
            profile,
            old_status,
            new_status,
        })
    }

    /// Subscribe a profile to newsletter lists.
    fn enqueue_newsletter_subscribe(
        &self,
        profile: ProfileId,
        newsletters: Vec<String>,
    ) -> NotifyResult<()> {
        self.enqueue(Notification::NewsletterSubscribe {
            profile,
            newsletters,
        })
    }

    /// Unsubscribe an address from newsletter lists.
    fn enqueue_newsletter_unsubscribe(
        &self,
        email: String,
        newsletters: Vec<String>,
    ) -> NotifyResult<()> {
        self.enqueue(Notification::NewsletterUnsubscribe { email, newsletters })
    }
}

impl<T: NotificationPort + ?Sized> NotificationPort for std::sync::Arc<T> {
    fn enqueue(&self, notification: Notification) -> NotifyResult<()> {
        (**self).enqueue(notification)
    }
}
