use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::client::{Endpoint, RequestOptions};
use crate::error::ClientError;
use crate::http::HttpMethod;
use crate::schema::{Json, Nullable};
use crate::types::{StartTimer, TimeEntry};

/// Filters for listing entries of one category. `from`/`to` bound `startedAt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntriesParams {
    pub category_id: Uuid,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ListEntriesParams {
    pub fn new(category_id: Uuid) -> Self {
        Self {
            category_id,
            from: None,
            to: None,
        }
    }

    /// `categoryId`, then `from`, then `to`; absent bounds are omitted.
    pub fn query_string(&self) -> String {
        let mut pairs = vec![("categoryId", self.category_id.to_string())];
        if let Some(from) = self.from {
            pairs.push(("from", format_timestamp(from)));
        }
        if let Some(to) = self.to {
            pairs.push(("to", format_timestamp(to)));
        }
        pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Starting while another timer runs stops that one first (server side).
pub fn start(category_id: Uuid) -> Result<Endpoint<Json<TimeEntry>>, ClientError> {
    let options = RequestOptions::new(HttpMethod::Post).json(&StartTimer { category_id })?;
    Ok(Endpoint::new("/api/time/start", options, Json::new()))
}

/// Fails with 409 `no_active_timer` when nothing is running.
pub fn stop() -> Endpoint<Json<TimeEntry>> {
    Endpoint::new("/api/time/stop", RequestOptions::new(HttpMethod::Post), Json::new())
}

pub fn active() -> Endpoint<Nullable<Json<TimeEntry>>> {
    Endpoint::get("/api/time/active", Nullable(Json::new()))
}

pub fn list_entries(params: &ListEntriesParams) -> Endpoint<Json<Vec<TimeEntry>>> {
    Endpoint::get(format!("/api/time/entries?{}", params.query_string()), Json::new())
}
