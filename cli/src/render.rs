//! Plain-text formatting of API data for the terminal.

use chrono::{DateTime, SecondsFormat, Utc};
use clockwork_core::tree::walk_forest;
use clockwork_core::{Category, CategoryNode, DbStatus, Health, Project, TimeEntry};

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `1h 02m 03s`, dropping leading zero units.
pub fn duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

pub fn health(status: &Health) -> String {
    match status {
        Health::Detailed { ok, db, time } => {
            let state = if *ok { "ok" } else { "degraded" };
            let db = match db {
                DbStatus::Up => "up",
                DbStatus::Down => "down",
            };
            format!("{state} (db: {db}, server time: {})", timestamp(*time))
        }
        Health::Status { status } => status.clone(),
    }
}

pub fn project(project: &Project) -> String {
    match &project.description {
        Some(description) => format!("{}  {}  {}", project.id, project.name, description),
        None => format!("{}  {}", project.id, project.name),
    }
}

pub fn projects(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects.".to_string();
    }
    projects.iter().map(project).collect::<Vec<_>>().join("\n")
}

pub fn categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories.".to_string();
    }
    categories
        .iter()
        .map(|c| match c.parent_category_id {
            Some(parent) => format!("{}  {}  (parent {parent})", c.id, c.name),
            None => format!("{}  {}", c.id, c.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indented pre-order listing, two spaces per level.
pub fn tree(forest: &[CategoryNode]) -> String {
    if forest.is_empty() {
        return "No categories.".to_string();
    }
    walk_forest(forest)
        .map(|(depth, node)| {
            format!("{}{}  {}", "  ".repeat(depth), node.category.name, node.category.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn entry(entry: &TimeEntry, now: DateTime<Utc>) -> String {
    let elapsed = duration(entry.elapsed_seconds(now));
    match entry.stopped_at {
        Some(stopped) => format!(
            "{}  {} .. {}  {elapsed}",
            entry.id,
            timestamp(entry.started_at),
            timestamp(stopped)
        ),
        None => format!("{}  {} ..  running {elapsed}", entry.id, timestamp(entry.started_at)),
    }
}

pub fn entries(entries: &[TimeEntry], now: DateTime<Utc>) -> String {
    if entries.is_empty() {
        return "No entries.".to_string();
    }
    let total: u64 = entries.iter().map(|e| e.elapsed_seconds(now)).sum();
    let mut lines: Vec<String> = entries.iter().map(|e| entry(e, now)).collect();
    lines.push(format!("total {}", duration(total)));
    lines.join("\n")
}

pub fn timer(active: Option<&TimeEntry>, now: DateTime<Utc>) -> String {
    match active {
        Some(entry) => format!(
            "Running on category {} for {} (since {})",
            entry.category_id,
            duration(entry.elapsed_seconds(now)),
            timestamp(entry.started_at)
        ),
        None => "No active timer.".to_string(),
    }
}
