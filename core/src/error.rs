//! Error types for the Clockwork API client.
//!
//! # Design
//! `ApiError` is what the server said went wrong: status, optional machine
//! code, optional request id, and the raw body for diagnostics. Everything
//! else that can fail on the way (serializing a body, the transport, schema
//! validation of a success payload, cancellation) is a separate `ClientError`
//! variant so callers can match on `Api` for user-facing handling and treat
//! the rest as hard failures.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::http::TransportError;
use crate::schema::SchemaError;

/// Structured error envelope sent by the server with non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: String,
}

impl ErrorResponse {
    /// Interpret a parsed body as an envelope. All three fields must be strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        ErrorResponse::deserialize(value).ok()
    }
}

/// A non-2xx response from the server.
///
/// `message` is `"<code>: <message>"` when the body was a structured
/// `ErrorResponse`, otherwise `"HTTP <status>: <status text>"`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    pub code: Option<String>,
    pub request_id: Option<String>,
    pub response_body: Option<Value>,
}

impl ApiError {
    pub fn structured(status: u16, envelope: ErrorResponse, body: Value) -> Self {
        Self {
            message: format!("{}: {}", envelope.code, envelope.message),
            status,
            code: Some(envelope.code),
            request_id: Some(envelope.request_id),
            response_body: Some(body),
        }
    }

    pub fn unstructured(status: u16, status_text: &str, raw: &str) -> Self {
        Self {
            message: format!("HTTP {status}: {status_text}"),
            status,
            code: None,
            request_id: None,
            response_body: (!raw.is_empty()).then(|| Value::String(raw.to_string())),
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code.as_deref().map(ErrorCode::parse)
    }
}

/// Machine-readable error codes the backend is known to emit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidId,
    InvalidJson,
    InvalidTime,
    InvalidTimeRange,
    InvalidProjectName,
    InvalidParent,
    CrossProjectParent,
    CategoryCycle,
    NoActiveTimer,
    NotFound,
    Internal,
    Other(String),
}

impl ErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "invalid_id" => ErrorCode::InvalidId,
            "invalid_json" => ErrorCode::InvalidJson,
            "invalid_time" => ErrorCode::InvalidTime,
            "invalid_time_range" => ErrorCode::InvalidTimeRange,
            "invalid_project_name" => ErrorCode::InvalidProjectName,
            "invalid_parent" => ErrorCode::InvalidParent,
            "cross_project_parent" => ErrorCode::CrossProjectParent,
            "category_cycle" => ErrorCode::CategoryCycle,
            "no_active_timer" => ErrorCode::NoActiveTimer,
            "not_found" => ErrorCode::NotFound,
            "internal" => ErrorCode::Internal,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::InvalidJson => "invalid_json",
            ErrorCode::InvalidTime => "invalid_time",
            ErrorCode::InvalidTimeRange => "invalid_time_range",
            ErrorCode::InvalidProjectName => "invalid_project_name",
            ErrorCode::InvalidParent => "invalid_parent",
            ErrorCode::CrossProjectParent => "cross_project_parent",
            ErrorCode::CategoryCycle => "category_cycle",
            ErrorCode::NoActiveTimer => "no_active_timer",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Internal => "internal",
            ErrorCode::Other(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way an `ApiClient` call can fail.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A 2xx payload did not match the expected shape. This is a contract
    /// break between client and server, not a user-facing condition.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Transport(TransportError),

    #[error("request cancelled")]
    Cancelled,

    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Cancelled => ClientError::Cancelled,
            other => ClientError::Transport(other),
        }
    }
}

impl ClientError {
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.as_api().and_then(ApiError::error_code)
    }
}
