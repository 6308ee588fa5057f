//! Resources, pages and per-resource state.
//!
//! A *resource* is a backend-managed collection (users, résumés). Each fetch
//! of a resource yields a [`Page`]: one slice of items plus the [`ResourceMeta`]
//! describing the whole matching set. The store keeps one [`ResourceState`]
//! per kind.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The resource collections the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    User,
    Resume,
}

impl ResourceKind {
    /// REST collection path on the backend.
    #[must_use]
    pub fn collection_path(self) -> &'static str {
        match self {
            Self::User => "/api/v1/users",
            Self::Resume => "/api/v1/resumes",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Resume => f.write_str("resume"),
        }
    }
}

/// An item type that can be listed from the backend.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Which collection this item belongs to.
    const KIND: ResourceKind;
}

/// Pagination metadata reported by the backend.
///
/// Only `total` is required on the wire. It counts every item matching the
/// query and is independent of `page_size`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub pages: u32,
    pub total: u64,
}

/// One page of items returned by a successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub meta: ResourceMeta,
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
}

/// Lifecycle of the fetches targeting one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading => f.write_str("loading"),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Everything the store knows about one resource kind.
///
/// `meta` only ever changes when a fetch succeeds: it stays stale while a
/// newer fetch is in flight and is left untouched when a fetch fails.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub items: Vec<T>,
    pub meta: ResourceMeta,
    pub status: FetchStatus,
    /// Error text of the last failed fetch, cleared by the next success.
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    in_flight: usize,
    settled: FetchStatus,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            meta: ResourceMeta::default(),
            status: FetchStatus::Idle,
            error: None,
            updated_at: None,
            in_flight: 0,
            settled: FetchStatus::Idle,
        }
    }
}

impl<T> ResourceState<T> {
    /// Number of fetches started but not yet completed or released.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Whether at least one fetch is pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Record that a fetch has started.
    pub fn begin(&mut self) {
        self.in_flight += 1;
        self.status = FetchStatus::Loading;
    }

    /// Replace items and metadata with a freshly fetched page.
    pub fn fulfill(&mut self, page: Page<T>, at: DateTime<Utc>) {
        self.items = page.result;
        self.meta = page.meta;
        self.error = None;
        self.updated_at = Some(at);
        self.settled = FetchStatus::Succeeded;
        self.finish();
    }

    /// Record a failed fetch; items and metadata are kept as they were.
    pub fn reject(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.settled = FetchStatus::Failed;
        self.finish();
    }

    /// Drop a pending fetch without recording any outcome.
    pub fn release(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.status = if self.in_flight > 0 {
            FetchStatus::Loading
        } else {
            self.settled
        };
    }
}
