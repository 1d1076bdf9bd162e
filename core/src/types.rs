//! Domain DTOs for the Clockwork API.
//!
//! # Design
//! These types are the schema side of the trust boundary: ids are `Uuid`,
//! timestamps are `DateTime<Utc>` and durations are unsigned, so a payload
//! that deserializes has already been checked for shape. They are defined
//! independently from the mock server's types; the integration tests catch
//! drift between the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category under a project. `parent_category_id == None` means top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub project_id: Uuid,
    pub parent_category_id: Option<Uuid>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tracked interval. Running entries have neither `stopped_at` nor
/// `duration_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Uuid,
    pub category_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeEntry {
    pub fn is_running(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Seconds elapsed so far for a running entry, or the recorded duration.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        match self.duration_seconds {
            Some(secs) => u64::from(secs),
            None => u64::try_from((now - self.started_at).num_seconds()).unwrap_or(0),
        }
    }
}

/// Payload for creating or updating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for creating or updating a category.
///
/// `parent_category_id` is always sent; `null` places the category at the top
/// level (and moves it there on update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_category_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTimer {
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbStatus {
    Up,
    Down,
}

/// Body of `/healthz`; older deployments answer with a bare `{status}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Health {
    Detailed {
        ok: bool,
        db: DbStatus,
        time: DateTime<Utc>,
    },
    Status {
        status: String,
    },
}

impl Health {
    pub fn is_ok(&self) -> bool {
        match self {
            Health::Detailed { ok, .. } => *ok,
            Health::Status { status } => status.eq_ignore_ascii_case("ok"),
        }
    }
}
