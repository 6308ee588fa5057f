//! # hunterdash-app
//!
//! Application layer — the resource store, fetch actions and the dashboard
//! view, plus the **port definitions** (traits) adapters implement.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ResourceSource` — list one page of a resource from the backend
//! - Provide the **resource store**: one `ResourceState` per resource kind,
//!   mutated only by fetch actions, observed through scoped subscriptions
//! - Provide the **fetch dispatcher**: spawns each fetch as a tracked,
//!   cancellable task
//! - Provide the **dashboard view**: refreshes the user and résumé totals on
//!   mount and re-renders whenever the store changes
//!
//! ## Dependency rule
//! Depends on `hunterdash-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod dashboard;
pub mod dispatch;
pub mod ports;
pub mod store;
