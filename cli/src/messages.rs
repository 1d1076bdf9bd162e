//! User-facing copy for failures.
//!
//! Known error codes get a sentence a person can act on; anything else falls
//! back to the server's message. The code and request id are appended when
//! present so a report can be traced back to server logs.

use clockwork_core::{ErrorCode, ViewError};

use crate::error::CliError;

/// Friendly text for a known code, or `None` to use the raw message.
pub fn friendly(code: &ErrorCode) -> Option<&'static str> {
    let text = match code {
        ErrorCode::InvalidParent => {
            "Invalid parent category. The parent category does not exist or does not belong to this project."
        }
        ErrorCode::CrossProjectParent => "Cannot use a parent category from a different project.",
        ErrorCode::CategoryCycle => {
            "Cannot create a cycle. A category cannot be its own parent or ancestor."
        }
        ErrorCode::NoActiveTimer => "No active timer to stop.",
        ErrorCode::InvalidId => "Invalid ID. Please select a valid project or category.",
        ErrorCode::InvalidTime => "Invalid date format. Please check your date filters.",
        ErrorCode::InvalidTimeRange => {
            "Invalid date range. The \"from\" date must be before the \"to\" date."
        }
        ErrorCode::InvalidProjectName => "Project name must not be empty.",
        ErrorCode::NotFound => "Not found. It may have been deleted.",
        _ => return None,
    };
    Some(text)
}

/// Headline plus optional code and request id lines.
pub fn describe_view_error(err: &ViewError) -> String {
    let headline = err
        .error_code()
        .as_ref()
        .and_then(friendly)
        .map_or_else(|| err.message.clone(), str::to_string);

    let mut out = format!("Error: {headline}");
    if let Some(code) = &err.code {
        out.push_str(&format!("\n  code: {code}"));
    }
    if let Some(request_id) = &err.request_id {
        out.push_str(&format!("\n  request id: {request_id}"));
    }
    out
}

pub fn describe(err: &CliError) -> String {
    match err.view_error() {
        Some(view) => describe_view_error(&view),
        None => format!("Error: {err}"),
    }
}
