//! Queued notification dispatch.
//!
//! [`QueuedNotifier`] is the [`NotificationPort`] the domain layer talks to:
//! enqueueing pushes onto an unbounded channel and returns at once. A
//! [`NotificationWorker`] owns the receiving end and hands each notification
//! to a [`NotificationSink`], retrying failed deliveries with exponential
//! backoff. Delivery is at-least-once; a notification that exhausts its
//! attempts is logged and dropped.

use crate::RetryConfig;
use async_trait::async_trait;
use mozillians_core::{MembershipEmail, Notification};
use mozillians_error::{NotifyError, NotifyErrorKind, NotifyResult};
use mozillians_interface::NotificationPort;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Sending half of the notification queue.
#[derive(Debug, Clone)]
pub struct QueuedNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

/// Receiving half of the notification queue.
#[derive(Debug)]
pub struct NotificationQueue {
    receiver: mpsc::UnboundedReceiver<Notification>,
}

impl QueuedNotifier {
    /// Create a connected notifier and queue.
    pub fn channel() -> (QueuedNotifier, NotificationQueue) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (QueuedNotifier { sender }, NotificationQueue { receiver })
    }
}

impl NotificationPort for QueuedNotifier {
    fn enqueue(&self, notification: Notification) -> NotifyResult<()> {
        debug!(kind = notification.kind(), "Enqueueing notification");
        self.sender
            .send(notification)
            .map_err(|_| NotifyError::new(NotifyErrorKind::QueueClosed))
    }
}

/// Delivers notifications somewhere: email, newsletter service, a log.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification. Errors are retried by the worker.
    async fn deliver(&self, notification: &Notification) -> NotifyResult<()>;
}

/// Sink that logs each notification as JSON.
///
/// Membership changes are logged with the email they select; changes that
/// select none are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notification: &Notification) -> NotifyResult<()> {
        let payload = serde_json::to_string(notification)
            .map_err(|e| NotifyError::new(NotifyErrorKind::Delivery(e.to_string())))?;
        if let Notification::MembershipChanged {
            old_status,
            new_status,
            ..
        } = notification
        {
            let Some(email) = MembershipEmail::for_change(*old_status, *new_status) else {
                debug!(%payload, "Membership change selects no email");
                return Ok(());
            };
            info!(kind = notification.kind(), %email, %payload, "Notification delivered");
            return Ok(());
        }
        info!(kind = notification.kind(), %payload, "Notification delivered");
        Ok(())
    }
}

/// Counts from a worker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Notifications the sink accepted
    pub delivered: usize,
    /// Notifications dropped after exhausting retries
    pub failed: usize,
}

/// Drains a [`NotificationQueue`] into a [`NotificationSink`].
#[derive(Debug)]
pub struct NotificationWorker<K> {
    queue: NotificationQueue,
    sink: K,
    retry: RetryConfig,
}

impl<K: NotificationSink> NotificationWorker<K> {
    /// Create a worker.
    pub fn new(queue: NotificationQueue, sink: K, retry: RetryConfig) -> Self {
        Self { queue, sink, retry }
    }

    /// Deliver until every [`QueuedNotifier`] is dropped and the queue is empty.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> DeliveryStats {
        let mut stats = DeliveryStats::default();
        while let Some(notification) = self.queue.receiver.recv().await {
            self.deliver(&notification, &mut stats).await;
        }
        info!(
            delivered = stats.delivered,
            failed = stats.failed,
            "Notification worker stopped"
        );
        stats
    }

    /// Deliver whatever is queued right now and return.
    #[instrument(skip(self))]
    pub async fn drain(&mut self) -> DeliveryStats {
        let mut stats = DeliveryStats::default();
        while let Ok(notification) = self.queue.receiver.try_recv() {
            self.deliver(&notification, &mut stats).await;
        }
        stats
    }

    /// The sink, for inspection after a run.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    async fn deliver(&self, notification: &Notification, stats: &mut DeliveryStats) {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.sink.deliver(notification).await {
                Ok(()) => {
                    if attempt > 1 {
                        debug!(attempt, "Delivery succeeded after retry");
                    }
                    stats.delivered += 1;
                    return;
                }
                Err(e) if attempt >= self.retry.max_attempts => {
                    warn!(
                        kind = notification.kind(),
                        attempt,
                        error = %e,
                        "All delivery attempts exhausted, dropping notification"
                    );
                    stats.failed += 1;
                    return;
                }
                Err(e) => {
                    let backoff = self.retry.backoff(attempt);
                    debug!(
                        attempt,
                        backoff_ms = backoff.as_millis(),
                        error = %e,
                        "Retrying delivery"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }
}

/// Notifier and sink that keeps everything it is given (for testing).
///
/// Can be told to fail a number of times first, to exercise notifier
/// failures on the enqueue side and retries on the delivery side.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    failures_left: Arc<AtomicUsize>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` calls before recording again.
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Everything recorded so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    fn record(&self, notification: Notification) -> NotifyResult<()> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(NotifyError::new(NotifyErrorKind::Delivery(
                "recorder told to fail".to_string(),
            )));
        }
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
        Ok(())
    }
}

impl NotificationPort for RecordingNotifier {
    fn enqueue(&self, notification: Notification) -> NotifyResult<()> {
        self.record(notification)
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn deliver(&self, notification: &Notification) -> NotifyResult<()> {
        self.record(notification.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mozillians_core::{GroupId, InviteId, MembershipStatus, ProfileId};

    fn accepted(id: i64) -> Notification {
        Notification::InvitationAccepted {
            invite: InviteId(id),
        }
    }

    #[tokio::test]
    async fn test_enqueue_after_queue_dropped_fails() {
        let (notifier, queue) = QueuedNotifier::channel();
        drop(queue);
        let err = notifier.enqueue(accepted(1)).unwrap_err();
        assert_eq!(err.kind, NotifyErrorKind::QueueClosed);
    }

    #[tokio::test]
    async fn test_recorder_fails_then_records() {
        let recorder = RecordingNotifier::new();
        recorder.fail_next(1);
        assert!(recorder.enqueue(accepted(1)).is_err());
        assert!(recorder.enqueue(accepted(2)).is_ok());
        assert_eq!(recorder.sent(), vec![accepted(2)]);
    }

    #[tokio::test]
    async fn test_log_sink_skips_changes_without_email() {
        let silent = Notification::MembershipChanged {
            group: GroupId(1),
            profile: ProfileId(2),
            old_status: Some(MembershipStatus::Pending),
            new_status: Some(MembershipStatus::PendingTerms),
        };
        assert!(LogSink.deliver(&silent).await.is_ok());
        assert!(LogSink.deliver(&accepted(1)).await.is_ok());
    }
}
