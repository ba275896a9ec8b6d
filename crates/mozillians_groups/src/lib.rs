//! Group membership for Mozillians.
//!
//! This crate decides how a profile's membership in a group changes and
//! what happens as a result. It has four layers:
//!
//! 1. **State machine** - which status transitions are legal ([`Transition`], [`Removal`])
//! 2. **Aggregate** - [`GroupManager`] applies transitions through the entity store and enqueues notifications
//! 3. **Workflows** - actor-aware joins, approvals, removals, invitations and periodic jobs
//! 4. **Adapters** - [`InMemoryStore`] and the queued notification dispatcher
//!
//! Illegal transitions are ignored rather than reported, and notification
//! failures never undo a membership change.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod catalog;
mod config;
mod dispatch;
mod invites;
mod maintenance;
mod manager;
mod memory;
mod state_machine;
mod workflow;

pub use config::{MembershipConfig, MembershipConfigBuilder, MembershipConfigBuilderError, RetryConfig};
pub use dispatch::{
    DeliveryStats, LogSink, NotificationQueue, NotificationSink, NotificationWorker,
    QueuedNotifier, RecordingNotifier,
};
pub use maintenance::EmptyRemoval;
pub use manager::GroupManager;
pub use memory::{InMemoryStore, Snapshot};
pub use state_machine::{Removal, Transition};
pub use workflow::JoinOutcome;
