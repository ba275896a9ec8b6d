//! Test utilities for membership tests.
//!
//! Every fixture wires a [`GroupManager`] to an in-memory store and a
//! recording notifier, and keeps clones of both for assertions.

#![allow(dead_code)]

use mozillians_core::{AcceptingMode, Group, NewGroup, Notification, Profile, ProfileId};
use mozillians_groups::{GroupManager, InMemoryStore, MembershipConfig, RecordingNotifier};
use std::collections::BTreeSet;

pub type Manager = GroupManager<InMemoryStore, RecordingNotifier>;

pub struct Fixture {
    pub manager: Manager,
    pub store: InMemoryStore,
    pub notifier: RecordingNotifier,
}

/// Fixture with the default configuration.
pub fn fixture() -> Fixture {
    fixture_with(MembershipConfig::default())
}

pub fn fixture_with(config: MembershipConfig) -> Fixture {
    let store = InMemoryStore::new();
    let notifier = RecordingNotifier::new();
    let manager = GroupManager::new(store.clone(), notifier.clone(), config);
    Fixture {
        manager,
        store,
        notifier,
    }
}

impl Fixture {
    /// Store a vouched profile.
    pub async fn profile(&self, id: i64) -> Profile {
        let profile = Profile::builder()
            .id(ProfileId(id))
            .email(format!("user{}@example.com", id))
            .full_name(format!("User {}", id))
            .vouched(true)
            .build()
            .unwrap();
        self.store.insert_profile(profile.clone()).await;
        profile
    }

    /// Store a site manager.
    pub async fn manager_profile(&self, id: i64) -> Profile {
        let mut profile = self.profile(id).await;
        profile.manager = true;
        self.store.insert_profile(profile.clone()).await;
        profile
    }

    /// Create a group through the manager.
    pub async fn group(&self, name: &str, mode: AcceptingMode, curators: &[&Profile]) -> Group {
        let new = NewGroup::builder()
            .name(name)
            .accepting_new_members(mode)
            .curators(curators.iter().map(|p| p.id).collect::<BTreeSet<_>>())
            .build()
            .unwrap();
        self.manager.create_group(new).await.unwrap()
    }

    /// Notifications recorded so far matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Notification) -> bool) -> usize {
        self.notifier.sent().iter().filter(|n| predicate(n)).count()
    }

    /// Membership change notifications recorded so far.
    pub fn membership_changes(&self) -> Vec<Notification> {
        self.notifier
            .sent()
            .into_iter()
            .filter(|n| matches!(n, Notification::MembershipChanged { .. }))
            .collect()
    }
}
