//! Runtime validation of response payloads.
//!
//! A `Schema` turns the parsed body of a successful response into a typed
//! value or fails loudly. The payload is `None` only for 204 responses; an
//! empty body on any other status arrives as `Some(Value::Null)`, and a body
//! that was not valid JSON arrives as a `Value::String` holding the raw text.

use std::any::type_name;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("expected {expected}, but the response had no body")]
    Missing { expected: &'static str },

    #[error("response does not match {expected}: {source}")]
    Mismatch {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected no content, got {found}")]
    UnexpectedContent { found: String },
}

pub trait Schema {
    type Output;

    fn validate(&self, payload: Option<&Value>) -> Result<Self::Output, SchemaError>;
}

/// A present payload that deserializes into `T`.
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    pub fn new() -> Self {
        Json(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Schema for Json<T> {
    type Output = T;

    fn validate(&self, payload: Option<&Value>) -> Result<T, SchemaError> {
        let value = payload.ok_or(SchemaError::Missing {
            expected: type_name::<T>(),
        })?;
        T::deserialize(value).map_err(|source| SchemaError::Mismatch {
            expected: type_name::<T>(),
            source,
        })
    }
}

/// Accepts an absent payload or JSON `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

impl Schema for NoContent {
    type Output = ();

    fn validate(&self, payload: Option<&Value>) -> Result<(), SchemaError> {
        match payload {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(SchemaError::UnexpectedContent {
                found: truncate(&other.to_string(), 80),
            }),
        }
    }
}

/// `null` becomes `None`; anything else is validated by the inner schema.
pub struct Nullable<S>(pub S);

impl<S: Schema> Schema for Nullable<S> {
    type Output = Option<S::Output>;

    fn validate(&self, payload: Option<&Value>) -> Result<Self::Output, SchemaError> {
        match payload {
            Some(Value::Null) => Ok(None),
            other => self.0.validate(other).map(Some),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
