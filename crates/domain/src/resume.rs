//! Resume — a CV submitted by a user for a job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{Resource, ResourceKind};
use crate::user::NamedRef;

/// Review progress of a submitted résumé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResumeStatus {
    #[default]
    Pending,
    Reviewing,
    Approved,
    Rejected,
}

/// A résumé as listed by `GET /api/v1/resumes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: ResumeStatus,
    pub company_name: Option<String>,
    pub user: Option<NamedRef>,
    pub job: Option<NamedRef>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl Resource for Resume {
    const KIND: ResourceKind = ResourceKind::Resume;
}
