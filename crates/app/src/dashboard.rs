//! Admin dashboard view — total users and total résumés.
//!
//! Mounting the view dispatches one unfiltered fetch per resource kind and
//! subscribes to both slices of the store. A render task rebuilds the
//! [`Dashboard`] every time one of the subscribed values changes. Unmounting
//! (or dropping) the view cancels fetches that are still pending and releases
//! the subscriptions.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use hunterdash_domain::count_up::{CountUp, DEFAULT_DURATION};
use hunterdash_domain::format::format_thousands;
use hunterdash_domain::query::Query;
use hunterdash_domain::resource::{FetchStatus, ResourceKind};
use hunterdash_domain::resume::Resume;
use hunterdash_domain::user::User;

use crate::dispatch::{FetchDispatcher, FetchHandle};
use crate::ports::ResourceSource;
use crate::store::{Slice, StoreState, Subscription};

/// What the dashboard shows while a fetch is pending or after it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Only the last known total is shown; loading and errors stay invisible.
    #[default]
    Silent,
    /// A loading marker and the last error are shown next to the total.
    Surface,
}

impl std::str::FromStr for FailureMode {
    type Err = UnknownFailureMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "surface" => Ok(Self::Surface),
            _ => Err(UnknownFailureMode(s.to_string())),
        }
    }
}

/// Returned when parsing an unrecognised [`FailureMode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown failure mode `{0}` (expected `silent` or `surface`)")]
pub struct UnknownFailureMode(pub String);

/// View settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    pub failure_mode: FailureMode,
    /// Length of the count-up animation.
    pub animation: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            failure_mode: FailureMode::Silent,
            animation: DEFAULT_DURATION,
        }
    }
}

/// The part of a resource slice a statistic card depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatSlice {
    pub total: u64,
    pub status: FetchStatus,
    pub error: Option<String>,
}

/// Selector for the slice of `R`.
#[must_use]
pub fn select_stat<R: Slice>(state: &StoreState) -> StatSlice {
    let slice = R::slice(state);
    StatSlice {
        total: slice.meta.total,
        status: slice.status,
        error: slice.error.clone(),
    }
}

/// Extra state displayed next to a total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indicator {
    None,
    Loading,
    Error(String),
}

/// One labelled statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub kind: ResourceKind,
    pub title: &'static str,
    pub label: &'static str,
    pub total: u64,
    pub status: FetchStatus,
    pub indicator: Indicator,
    pub animation: CountUp,
}

impl StatCard {
    fn render(kind: ResourceKind, stat: &StatSlice, config: &DashboardConfig) -> Self {
        let (title, label) = match kind {
            ResourceKind::User => ("Tổng số User", "User"),
            ResourceKind::Resume => ("Tổng số CV", "CV"),
        };
        let indicator = match (config.failure_mode, stat.status, &stat.error) {
            (FailureMode::Silent, _, _) => Indicator::None,
            (FailureMode::Surface, FetchStatus::Loading, _) => Indicator::Loading,
            (FailureMode::Surface, FetchStatus::Failed, Some(err)) => Indicator::Error(err.clone()),
            (FailureMode::Surface, _, _) => Indicator::None,
        };
        Self {
            kind,
            title,
            label,
            total: stat.total,
            status: stat.status,
            indicator,
            animation: CountUp::new(stat.total).with_duration(config.animation),
        }
    }

    /// The settled value with thousands separators.
    #[must_use]
    pub fn display_value(&self) -> String {
        format_thousands(self.total)
    }

    /// The animated value `elapsed` after this card was rendered.
    #[must_use]
    pub fn value_at(&self, elapsed: Duration) -> String {
        self.animation.formatted_at(elapsed)
    }

    fn continuing_from(mut self, previous: &Self) -> Self {
        self.animation = if self.total == previous.total {
            previous.animation
        } else {
            self.animation.starting_at(previous.animation.end())
        };
        self
    }
}

impl fmt::Display for StatCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n  {}: {}", self.title, self.label, self.display_value())?;
        match &self.indicator {
            Indicator::None => Ok(()),
            Indicator::Loading => f.write_str(" (loading…)"),
            Indicator::Error(err) => write!(f, " (error: {err})"),
        }
    }
}

/// The rendered dashboard: one card per resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub users: StatCard,
    pub resumes: StatCard,
}

impl Dashboard {
    /// Render from the two subscribed slices. Pure.
    #[must_use]
    pub fn render(users: &StatSlice, resumes: &StatSlice, config: &DashboardConfig) -> Self {
        Self {
            users: StatCard::render(ResourceKind::User, users, config),
            resumes: StatCard::render(ResourceKind::Resume, resumes, config),
        }
    }

    /// Render straight from a store snapshot.
    #[must_use]
    pub fn from_state(state: &StoreState, config: &DashboardConfig) -> Self {
        Self::render(
            &select_stat::<User>(state),
            &select_stat::<Resume>(state),
            config,
        )
    }

    #[must_use]
    pub fn cards(&self) -> [&StatCard; 2] {
        [&self.users, &self.resumes]
    }

    /// Whether no fetch is pending for either card.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.cards()
            .iter()
            .all(|card| card.status != FetchStatus::Loading)
    }

    /// Animate each card whose total changed from the value `previous` was
    /// heading to; unchanged cards keep their running animation.
    fn continuing_from(self, previous: &Self) -> Self {
        Self {
            users: self.users.continuing_from(&previous.users),
            resumes: self.resumes.continuing_from(&previous.resumes),
        }
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.users, self.resumes)
    }
}

/// A mounted dashboard.
pub struct DashboardView {
    fetches: Vec<FetchHandle>,
    rendered: watch::Receiver<Dashboard>,
    render_task: Option<JoinHandle<()>>,
}

impl DashboardView {
    /// Mount the view: subscribe to both slices, dispatch one unfiltered
    /// fetch per resource kind without awaiting either, and start rendering.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount<S>(dispatcher: &FetchDispatcher<S>, config: DashboardConfig) -> Self
    where
        S: ResourceSource + Send + Sync + 'static,
    {
        let store = dispatcher.store();
        let mut users = store.subscribe(select_stat::<User>);
        let mut resumes = store.subscribe(select_stat::<Resume>);

        let fetches = vec![
            dispatcher.dispatch::<User>(Query::empty()),
            dispatcher.dispatch::<Resume>(Query::empty()),
        ];

        let initial = Dashboard::render(&users.refresh(), &resumes.refresh(), &config);
        let (sender, rendered) = watch::channel(initial);
        let render_task = tokio::spawn(async move {
            render_loop(&mut users, &mut resumes, &sender, &config).await;
        });

        debug!("dashboard mounted");
        Self {
            fetches,
            rendered,
            render_task: Some(render_task),
        }
    }

    /// The latest rendered dashboard.
    #[must_use]
    pub fn current(&self) -> Dashboard {
        self.rendered.borrow().clone()
    }

    /// Wait for the first render satisfying `predicate`.
    ///
    /// Returns `None` if rendering stopped before that happened.
    pub async fn wait_until(&self, predicate: impl FnMut(&Dashboard) -> bool) -> Option<Dashboard> {
        let mut renders = self.rendered.clone();
        let found = renders
            .wait_for(predicate)
            .await
            .ok()
            .map(|dashboard| Dashboard::clone(&dashboard));
        found
    }

    /// Fetches dispatched on mount.
    #[must_use]
    pub fn fetches(&self) -> &[FetchHandle] {
        &self.fetches
    }

    /// Tear the view down and wait until its subscriptions are released.
    pub async fn unmount(mut self) {
        self.cancel_fetches();
        if let Some(task) = self.render_task.take() {
            task.abort();
            let _ = task.await;
        }
        debug!("dashboard unmounted");
    }

    fn cancel_fetches(&mut self) {
        for fetch in self.fetches.drain(..) {
            fetch.cancel();
        }
    }
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        self.cancel_fetches();
        if let Some(task) = self.render_task.take() {
            task.abort();
        }
    }
}

async fn render_loop(
    users: &mut Subscription<StatSlice>,
    resumes: &mut Subscription<StatSlice>,
    sender: &watch::Sender<Dashboard>,
    config: &DashboardConfig,
) {
    let mut user_stat = users.refresh();
    let mut resume_stat = resumes.refresh();
    loop {
        sender.send_if_modified(|shown| {
            let next = Dashboard::render(&user_stat, &resume_stat, config).continuing_from(shown);
            if *shown == next {
                return false;
            }
            *shown = next;
            true
        });
        tokio::select! {
            Some(next) = users.changed() => user_stat = next,
            Some(next) = resumes.changed() => resume_stat = next,
            else => break,
        }
    }
}
