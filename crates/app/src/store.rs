//! Resource store — the single owner of every [`ResourceState`].
//!
//! The store is an explicit service object: create it once, share it through
//! an `Arc`, and hand it to the dispatcher and the views that read from it.
//! State lives in a tokio [`watch`] channel, so every mutation is serialised
//! and every subscriber sees the latest snapshot.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use hunterdash_domain::id::SubscriptionId;
use hunterdash_domain::resource::{Page, Resource, ResourceState};
use hunterdash_domain::resume::Resume;
use hunterdash_domain::user::User;

/// Snapshot of everything the store holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub user: ResourceState<User>,
    pub resume: ResourceState<Resume>,
}

/// A resource with a dedicated slice in [`StoreState`].
pub trait Slice: Resource {
    fn slice(state: &StoreState) -> &ResourceState<Self>;
    fn slice_mut(state: &mut StoreState) -> &mut ResourceState<Self>;
}

impl Slice for User {
    fn slice(state: &StoreState) -> &ResourceState<Self> {
        &state.user
    }

    fn slice_mut(state: &mut StoreState) -> &mut ResourceState<Self> {
        &mut state.user
    }
}

impl Slice for Resume {
    fn slice(state: &StoreState) -> &ResourceState<Self> {
        &state.resume
    }

    fn slice_mut(state: &mut StoreState) -> &mut ResourceState<Self> {
        &mut state.resume
    }
}

/// In-memory resource store.
#[derive(Debug)]
pub struct ResourceStore {
    sender: watch::Sender<StoreState>,
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceStore {
    /// Create an empty store: every slice idle, no items, zero totals.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(StoreState::default());
        Self { sender }
    }

    /// Clone the current state.
    #[must_use]
    pub fn snapshot(&self) -> StoreState {
        self.sender.borrow().clone()
    }

    /// Register a subscription on the value picked by `selector`.
    ///
    /// The subscription stays registered until it is dropped.
    pub fn subscribe<V, F>(&self, selector: F) -> Subscription<V>
    where
        V: Clone + PartialEq,
        F: Fn(&StoreState) -> V + Send + Sync + 'static,
    {
        let receiver = self.sender.subscribe();
        let last = selector(&receiver.borrow());
        let id = SubscriptionId::new();
        tracing::trace!(subscription = %id, "subscription registered");
        Subscription {
            id,
            receiver,
            selector: Box::new(selector),
            last,
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Apply `mutate` to the state; subscribers are only woken when it
    /// returns `true`.
    pub fn modify(&self, mutate: impl FnOnce(&mut StoreState) -> bool) -> bool {
        self.sender.send_if_modified(mutate)
    }

    /// Mark a fetch of `R` as started.
    pub fn begin<R: Slice>(&self) {
        self.sender.send_modify(|state| R::slice_mut(state).begin());
    }

    /// Store a successfully fetched page of `R`.
    pub fn fulfill<R: Slice>(&self, page: Page<R>, at: DateTime<Utc>) {
        self.sender
            .send_modify(|state| R::slice_mut(state).fulfill(page, at));
    }

    /// Record a failed fetch of `R`.
    pub fn reject<R: Slice>(&self, error: impl Into<String>) {
        let error = error.into();
        self.sender
            .send_modify(|state| R::slice_mut(state).reject(error));
    }

    /// Drop a pending fetch of `R` without an outcome.
    pub fn release<R: Slice>(&self) {
        self.sender.send_modify(|state| R::slice_mut(state).release());
    }

    /// Tear everything down to the initial empty state.
    pub fn reset(&self) {
        self.sender.send_replace(StoreState::default());
    }
}

/// A scoped, read-only view on one value derived from the store.
///
/// Dropping the subscription unregisters it.
pub struct Subscription<V> {
    id: SubscriptionId,
    receiver: watch::Receiver<StoreState>,
    selector: Box<dyn Fn(&StoreState) -> V + Send + Sync>,
    last: V,
}

impl<V: Clone + PartialEq> Subscription<V> {
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The selected value in the latest store state.
    #[must_use]
    pub fn current(&self) -> V {
        (self.selector)(&self.receiver.borrow())
    }

    /// The selected value in the latest store state, marked as seen.
    ///
    /// Later calls to [`changed`](Self::changed) compare against this value.
    pub fn refresh(&mut self) -> V {
        let value = (self.selector)(&self.receiver.borrow_and_update());
        self.last = value.clone();
        value
    }

    /// Wait until the selected value differs from the last one returned.
    ///
    /// Store updates that leave the selected value unchanged are skipped.
    /// Returns `None` once the store is gone. Cancel safe.
    pub async fn changed(&mut self) -> Option<V> {
        loop {
            if self.receiver.changed().await.is_err() {
                return None;
            }
            let next = (self.selector)(&self.receiver.borrow_and_update());
            if next != self.last {
                self.last = next.clone();
                return Some(next);
            }
        }
    }
}

impl<V> Drop for Subscription<V> {
    fn drop(&mut self) {
        tracing::trace!(subscription = %self.id, "subscription released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hunterdash_domain::resource::{FetchStatus, ResourceMeta};
    use std::time::Duration;

    fn page<R>(total: u64) -> Page<R> {
        Page {
            meta: ResourceMeta {
                total,
                ..ResourceMeta::default()
            },
            result: Vec::new(),
        }
    }

    #[test]
    fn should_start_empty() {
        let store = ResourceStore::new();
        let state = store.snapshot();
        assert_eq!(state.user.meta.total, 0);
        assert_eq!(state.resume.status, FetchStatus::Idle);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn should_write_only_the_targeted_slice() {
        let store = ResourceStore::new();
        store.begin::<User>();
        store.fulfill::<User>(page(57), Utc::now());

        let state = store.snapshot();
        assert_eq!(state.user.meta.total, 57);
        assert_eq!(state.resume, ResourceState::default());
    }

    #[test]
    fn should_release_subscription_on_drop() {
        let store = ResourceStore::new();
        let first = store.subscribe(|s| s.user.meta.total);
        let second = store.subscribe(|s| s.resume.meta.total);
        assert_eq!(store.subscriber_count(), 2);
        assert_ne!(first.id(), second.id());

        drop(first);
        assert_eq!(store.subscriber_count(), 1);
        drop(second);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn should_notify_when_selected_value_changes() {
        let store = ResourceStore::new();
        let mut sub = store.subscribe(|s| s.user.meta.total);

        store.begin::<User>();
        store.fulfill::<User>(page(57), Utc::now());

        assert_eq!(sub.changed().await, Some(57));
        assert_eq!(sub.current(), 57);
    }

    #[tokio::test]
    async fn should_notify_return_to_earlier_value_after_refresh() {
        let store = ResourceStore::new();
        store.begin::<User>();
        store.fulfill::<User>(page(57), Utc::now());
        let mut sub = store.subscribe(|s| s.user.status);

        store.begin::<User>();
        assert_eq!(sub.refresh(), FetchStatus::Loading);
        store.fulfill::<User>(page(57), Utc::now());

        let next = tokio::time::timeout(Duration::from_secs(1), sub.changed()).await;
        assert_eq!(next.unwrap(), Some(FetchStatus::Succeeded));
    }

    #[tokio::test]
    async fn should_skip_updates_to_other_slices() {
        let store = ResourceStore::new();
        let mut sub = store.subscribe(|s| s.user.meta.total);

        store.begin::<Resume>();
        store.fulfill::<Resume>(page(9), Utc::now());

        let waited = tokio::time::timeout(Duration::from_millis(50), sub.changed()).await;
        assert!(waited.is_err(), "resume update must not wake a user subscription");
    }

    #[tokio::test]
    async fn should_end_subscription_when_store_is_dropped() {
        let store = ResourceStore::new();
        let mut sub = store.subscribe(|s| s.user.meta.total);
        drop(store);
        assert_eq!(sub.changed().await, None);
    }

    #[test]
    fn should_not_wake_subscribers_when_modify_reports_no_change() {
        let store = ResourceStore::new();
        let sub = store.subscribe(|s| s.user.status);
        let changed = store.modify(|_| false);
        assert!(!changed);
        assert!(!sub.receiver.has_changed().unwrap());
    }

    #[test]
    fn should_reset_to_initial_state() {
        let store = ResourceStore::new();
        store.begin::<User>();
        store.fulfill::<User>(page(5), Utc::now());
        store.reset();
        assert_eq!(store.snapshot(), StoreState::default());
    }
}
