//! Fetch actions — asynchronous requests that write their result into the store.
//!
//! [`FetchDispatcher::dispatch`] marks the target slice as loading, spawns the
//! request as its own task and returns a [`FetchHandle`]. The handle can be
//! awaited for the outcome or cancelled; once cancelled, the fetch never
//! writes to the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use hunterdash_domain::error::DashError;
use hunterdash_domain::id::FetchId;
use hunterdash_domain::query::Query;
use hunterdash_domain::resource::ResourceKind;

use crate::ports::ResourceSource;
use crate::store::{ResourceStore, Slice, StoreState};

const PENDING: u8 = 0;
const COMMITTED: u8 = 1;
const CANCELLED: u8 = 2;

/// How a fetch ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The page was stored; `total` is the new `meta.total`.
    Fulfilled { total: u64 },
    /// The request failed; the slice kept its previous items and metadata.
    Failed(DashError),
    /// The fetch was cancelled and wrote nothing.
    Cancelled,
}

impl FetchOutcome {
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }

    /// The stored total, or why nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`DashError::Cancelled`] for a cancelled fetch.
    pub fn into_result(self) -> Result<u64, DashError> {
        match self {
            Self::Fulfilled { total } => Ok(total),
            Self::Failed(err) => Err(err),
            Self::Cancelled => Err(DashError::Cancelled),
        }
    }
}

/// Decides, exactly once, whether a fetch commits or is cancelled.
#[derive(Debug, Default)]
struct FetchGate(AtomicU8);

impl FetchGate {
    fn try_commit(&self) -> bool {
        self.0
            .compare_exchange(PENDING, COMMITTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn try_cancel(&self) -> bool {
        self.0
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Spawns fetch actions against a [`ResourceSource`] and commits their
/// results into a [`ResourceStore`].
pub struct FetchDispatcher<S> {
    source: Arc<S>,
    store: Arc<ResourceStore>,
}

impl<S> Clone for FetchDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> FetchDispatcher<S>
where
    S: ResourceSource + Send + Sync + 'static,
{
    /// Create a dispatcher writing into `store`.
    pub fn new(source: Arc<S>, store: Arc<ResourceStore>) -> Self {
        Self { source, store }
    }

    /// The source fetches are issued against.
    #[must_use]
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// The store this dispatcher writes into.
    #[must_use]
    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    /// Start fetching the page of `R` matching `query`.
    ///
    /// The slice is marked loading before this returns; the request itself
    /// runs on a spawned task. Must be called from within a tokio runtime.
    pub fn dispatch<R: Slice>(&self, query: Query) -> FetchHandle {
        let id = FetchId::new();
        let gate = Arc::new(FetchGate::default());

        self.store.begin::<R>();
        debug!(fetch = %id, resource = %R::KIND, query = %query, "dispatching fetch");

        let task = tokio::spawn(run_fetch::<S, R>(
            Arc::clone(&self.source),
            Arc::clone(&self.store),
            query,
            id,
            Arc::clone(&gate),
        ));

        FetchHandle {
            id,
            kind: R::KIND,
            task,
            gate,
            store: Arc::clone(&self.store),
            release: release_slice::<R>,
        }
    }
}

async fn run_fetch<S, R>(
    source: Arc<S>,
    store: Arc<ResourceStore>,
    query: Query,
    id: FetchId,
    gate: Arc<FetchGate>,
) -> FetchOutcome
where
    S: ResourceSource + Send + Sync,
    R: Slice,
{
    let _unwind = ReleaseOnUnwind {
        gate: Arc::clone(&gate),
        store: Arc::clone(&store),
        release: release_slice::<R>,
    };
    match source.fetch_page::<R>(&query).await {
        Ok(page) => {
            let total = page.meta.total;
            let at = chrono::Utc::now();
            let committed = store.modify(|state| {
                if !gate.try_commit() {
                    return false;
                }
                R::slice_mut(state).fulfill(page, at);
                true
            });
            if committed {
                info!(fetch = %id, resource = %R::KIND, total, "fetch fulfilled");
                FetchOutcome::Fulfilled { total }
            } else {
                debug!(fetch = %id, resource = %R::KIND, "discarding page of cancelled fetch");
                FetchOutcome::Cancelled
            }
        }
        Err(err) => {
            let report = err.report();
            let committed = store.modify(|state| {
                if !gate.try_commit() {
                    return false;
                }
                R::slice_mut(state).reject(report.clone());
                true
            });
            if committed {
                warn!(fetch = %id, resource = %R::KIND, error = %report, "fetch failed");
                FetchOutcome::Failed(err)
            } else {
                debug!(fetch = %id, resource = %R::KIND, "discarding error of cancelled fetch");
                FetchOutcome::Cancelled
            }
        }
    }
}

fn release_slice<R: Slice>(state: &mut StoreState) {
    R::slice_mut(state).release();
}

/// Releases the loading mark of a fetch whose task ends without deciding,
/// i.e. when the source panics.
struct ReleaseOnUnwind {
    gate: Arc<FetchGate>,
    store: Arc<ResourceStore>,
    release: fn(&mut StoreState),
}

impl Drop for ReleaseOnUnwind {
    fn drop(&mut self) {
        let release = self.release;
        let released = self.store.modify(|state| {
            if !self.gate.try_cancel() {
                return false;
            }
            release(state);
            true
        });
        if released {
            warn!("fetch ended without an outcome, loading mark released");
        }
    }
}

/// Tracks one dispatched fetch.
///
/// Dropping the handle detaches the fetch; it still completes and commits.
#[derive(Debug)]
pub struct FetchHandle {
    id: FetchId,
    kind: ResourceKind,
    task: JoinHandle<FetchOutcome>,
    gate: Arc<FetchGate>,
    store: Arc<ResourceStore>,
    release: fn(&mut StoreState),
}

impl FetchHandle {
    #[must_use]
    pub fn id(&self) -> FetchId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Whether the spawned task has run to completion (or was aborted).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the fetch.
    ///
    /// Returns `true` if the fetch had not committed yet; in that case its
    /// loading mark is released and nothing else is written. Returns `false`
    /// when the result was already stored.
    pub fn cancel(&self) -> bool {
        let release = self.release;
        let cancelled = self.store.modify(|state| {
            if !self.gate.try_cancel() {
                return false;
            }
            release(state);
            true
        });
        self.task.abort();
        if cancelled {
            debug!(fetch = %self.id, resource = %self.kind, "fetch cancelled");
        }
        cancelled
    }

    /// Wait for the fetch to finish.
    pub async fn outcome(self) -> FetchOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => FetchOutcome::Cancelled,
            Err(err) => {
                warn!(fetch = %self.id, resource = %self.kind, error = %err, "fetch task panicked");
                FetchOutcome::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hunterdash_domain::error::StatusError;
    use hunterdash_domain::resource::{FetchStatus, Page, Resource, ResourceMeta};
    use hunterdash_domain::resume::Resume;
    use hunterdash_domain::user::User;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Serves fixed totals per kind, optionally failing or waiting on a gate.
    #[derive(Default)]
    struct FakeSource {
        totals: Mutex<HashMap<ResourceKind, u64>>,
        failing: Mutex<Vec<ResourceKind>>,
        calls: Mutex<Vec<(ResourceKind, Query)>>,
        hold: Option<Arc<Notify>>,
    }

    impl FakeSource {
        fn with_totals(user: u64, resume: u64) -> Self {
            let source = Self::default();
            source
                .totals
                .lock()
                .unwrap()
                .extend([(ResourceKind::User, user), (ResourceKind::Resume, resume)]);
            source
        }
    }

    impl ResourceSource for FakeSource {
        fn fetch_page<R: Resource>(
            &self,
            query: &Query,
        ) -> impl Future<Output = Result<Page<R>, DashError>> + Send {
            self.calls.lock().unwrap().push((R::KIND, query.clone()));
            let total = self
                .totals
                .lock()
                .unwrap()
                .get(&R::KIND)
                .copied()
                .unwrap_or(0);
            let fails = self.failing.lock().unwrap().contains(&R::KIND);
            let hold = self.hold.clone();
            async move {
                if let Some(hold) = hold {
                    hold.notified().await;
                }
                if fails {
                    return Err(StatusError {
                        status: 500,
                        message: Some("boom".to_string()),
                    }
                    .into());
                }
                Ok(Page {
                    meta: ResourceMeta {
                        page: 1,
                        page_size: 10,
                        pages: total.div_ceil(10).try_into().unwrap(),
                        total,
                    },
                    result: Vec::new(),
                })
            }
        }
    }

    fn dispatcher(source: FakeSource) -> FetchDispatcher<FakeSource> {
        FetchDispatcher::new(Arc::new(source), Arc::new(ResourceStore::new()))
    }

    #[tokio::test]
    async fn should_store_total_when_fetch_succeeds() {
        let dispatcher = dispatcher(FakeSource::with_totals(57, 1_023));

        let outcome = dispatcher.dispatch::<User>(Query::empty()).outcome().await;

        assert_eq!(outcome.into_result().unwrap(), 57);
        let state = dispatcher.store().snapshot();
        assert_eq!(state.user.meta.total, 57);
        assert_eq!(state.user.meta.pages, 6);
        assert_eq!(state.user.status, FetchStatus::Succeeded);
    }

    #[tokio::test]
    async fn should_mark_slice_loading_before_returning() {
        let source = FakeSource {
            hold: Some(Arc::new(Notify::new())),
            ..FakeSource::default()
        };
        let dispatcher = dispatcher(source);

        let handle = dispatcher.dispatch::<Resume>(Query::empty());

        assert_eq!(dispatcher.store().snapshot().resume.status, FetchStatus::Loading);
        handle.cancel();
    }

    #[tokio::test]
    async fn should_keep_total_when_fetch_fails() {
        let source = FakeSource::with_totals(57, 0);
        let dispatcher = dispatcher(source);
        dispatcher.dispatch::<User>(Query::empty()).outcome().await;

        dispatcher
            .source
            .failing
            .lock()
            .unwrap()
            .push(ResourceKind::User);
        let outcome = dispatcher.dispatch::<User>(Query::empty()).outcome().await;

        assert!(matches!(outcome, FetchOutcome::Failed(DashError::Status(_))));
        let state = dispatcher.store().snapshot();
        assert_eq!(state.user.meta.total, 57);
        assert_eq!(state.user.status, FetchStatus::Failed);
        assert_eq!(
            state.user.error.as_deref(),
            Some("backend rejected request: HTTP 500: boom")
        );
    }

    #[tokio::test]
    async fn should_leave_total_unchanged_when_same_fetch_repeats() {
        let dispatcher = dispatcher(FakeSource::with_totals(0, 1_023));

        dispatcher.dispatch::<Resume>(Query::empty()).outcome().await;
        dispatcher.dispatch::<Resume>(Query::empty()).outcome().await;

        let state = dispatcher.store().snapshot();
        assert_eq!(state.resume.meta.total, 1_023);
        assert_eq!(state.resume.in_flight(), 0);
    }

    #[tokio::test]
    async fn should_isolate_failure_to_its_own_slice() {
        let source = FakeSource::with_totals(57, 1_023);
        source.failing.lock().unwrap().push(ResourceKind::User);
        let dispatcher = dispatcher(source);

        let user = dispatcher.dispatch::<User>(Query::empty());
        let resume = dispatcher.dispatch::<Resume>(Query::empty());
        let (user, resume) = tokio::join!(user.outcome(), resume.outcome());

        assert!(matches!(user, FetchOutcome::Failed(_)));
        assert!(resume.is_fulfilled());
        let state = dispatcher.store().snapshot();
        assert_eq!(state.user.meta.total, 0);
        assert_eq!(state.resume.meta.total, 1_023);
    }

    #[tokio::test]
    async fn should_forward_query_to_source() {
        let dispatcher = dispatcher(FakeSource::default());
        let query = Query::empty().page(2).size(5);

        dispatcher.dispatch::<User>(query.clone()).outcome().await;

        let calls = dispatcher.source.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(ResourceKind::User, query)]);
    }

    #[tokio::test]
    async fn should_release_loading_mark_when_cancelled() {
        let hold = Arc::new(Notify::new());
        let source = FakeSource {
            hold: Some(Arc::clone(&hold)),
            ..FakeSource::with_totals(57, 0)
        };
        let dispatcher = dispatcher(source);

        let handle = dispatcher.dispatch::<User>(Query::empty());
        assert!(handle.cancel());
        hold.notify_waiters();

        assert!(matches!(
            handle.outcome().await.into_result(),
            Err(DashError::Cancelled)
        ));
        let state = dispatcher.store().snapshot();
        assert_eq!(state.user.status, FetchStatus::Idle);
        assert_eq!(state.user.meta.total, 0);
    }

    struct PanickingSource;

    impl ResourceSource for PanickingSource {
        fn fetch_page<R: Resource>(
            &self,
            _query: &Query,
        ) -> impl Future<Output = Result<Page<R>, DashError>> + Send {
            async { panic!("source exploded") }
        }
    }

    #[tokio::test]
    async fn should_release_loading_mark_when_source_panics() {
        let dispatcher =
            FetchDispatcher::new(Arc::new(PanickingSource), Arc::new(ResourceStore::new()));

        let outcome = dispatcher.dispatch::<User>(Query::empty()).outcome().await;

        assert!(matches!(outcome, FetchOutcome::Cancelled));
        let state = dispatcher.store().snapshot();
        assert_eq!(state.user.status, FetchStatus::Idle);
        assert_eq!(state.user.in_flight(), 0);
    }

    #[tokio::test]
    async fn should_not_cancel_after_commit() {
        let dispatcher = dispatcher(FakeSource::with_totals(3, 0));
        let handle = dispatcher.dispatch::<User>(Query::empty());
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }

        assert!(!handle.cancel());
        assert_eq!(dispatcher.store().snapshot().user.meta.total, 3);
    }

    #[tokio::test]
    async fn should_complete_detached_fetch_when_handle_dropped() {
        let dispatcher = dispatcher(FakeSource::with_totals(8, 0));
        let mut sub = dispatcher.store().subscribe(|s| s.user.meta.total);

        drop(dispatcher.dispatch::<User>(Query::empty()));

        assert_eq!(sub.changed().await, Some(8));
    }
}
