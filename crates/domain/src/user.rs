//! User — an account registered on the job board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{Resource, ResourceKind};

/// Self-declared gender of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Lightweight `{ id, name }` reference to a related record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// A user as listed by `GET /api/v1/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub company: Option<NamedRef>,
    pub role: Option<NamedRef>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;
}
