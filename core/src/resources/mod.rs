//! Declarative bindings for every REST endpoint.
//!
//! Each function returns an `Endpoint` (path, method, body, schema) and does
//! nothing else; `ApiClient::call` executes it. Errors from the client are
//! propagated unchanged.

pub mod categories;
pub mod health;
pub mod projects;
pub mod time;
