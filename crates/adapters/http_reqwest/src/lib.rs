//! # hunterdash-adapter-http-reqwest
//!
//! HTTP adapter for the job-hunter REST API using [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the `ResourceSource` port defined in `hunterdash-app::ports`
//! - Build list URLs (`/api/v1/users`, `/api/v1/resumes`) with query parameters
//! - Attach the bearer token and enforce the request timeout
//! - Decode the backend response envelope and map failures to domain errors
//!
//! ## Dependency rule
//! Depends on `hunterdash-app` (for port traits) and `hunterdash-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod client;
mod envelope;
mod error;

pub use client::{Config, HttpResourceSource};
pub use error::HttpError;
