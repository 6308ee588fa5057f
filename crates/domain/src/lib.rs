//! # hunterdash-domain
//!
//! Pure domain model for the job-hunter admin dashboard.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define **Resources** (users, résumés) as they are served by the backend
//! - Define **Pages** and their pagination metadata (`meta.total`, …)
//! - Define per-resource **state** (items, metadata, fetch status)
//! - Define **Queries** passed to list endpoints
//! - Number presentation: thousands separators and the count-up animation
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod count_up;
pub mod format;
pub mod query;
pub mod resource;
pub mod resume;
pub mod user;
