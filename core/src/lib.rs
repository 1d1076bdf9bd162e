//! Client core for the Clockwork time-tracking API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values; the host
//! supplies a `Transport` that performs the actual round-trip. On top of that
//! sit declarative resource bindings, the category tree builder and small
//! per-view state containers for presentation code.
//!
//! # Design
//! - `ApiClient` is stateless: it holds only `base_url`.
//! - Every call goes through `ApiClient::request_json`, which applies the
//!   header policy, maps non-2xx responses to `ApiError` and validates 2xx
//!   payloads against a `Schema`.
//! - DTOs are defined independently from the mock server; integration tests
//!   catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod resources;
pub mod schema;
pub mod tree;
pub mod types;
pub mod views;

pub use client::{ApiClient, Endpoint, RequestOptions};
pub use error::{ApiError, ClientError, ErrorCode, ErrorResponse};
pub use http::{CancelToken, HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use resources::time::ListEntriesParams;
pub use schema::{Json, NoContent, Nullable, Schema, SchemaError};
pub use tree::{build_tree, CategoryNode};
pub use types::{
    Category, CategoryInput, DbStatus, Health, Project, ProjectInput, StartTimer, TimeEntry,
};
pub use views::{
    ActiveTimerView, CategoriesView, EntriesView, LoadStatus, Loadable, ProjectsView, ViewError,
};
