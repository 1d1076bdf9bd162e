//! Stateless request builder, response parser and dispatcher.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls, so concurrent calls never interact. A call is split the same way
//! everywhere: `build_request` produces an `HttpRequest`, the host's
//! `Transport` executes it, and `parse_response` turns the `HttpResponse` into
//! either the schema's output or a `ClientError`. `request_json` strings the
//! three together; `build_request` and `parse_response` stay public so hosts
//! that drive their own I/O can use them directly.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ClientError, ErrorResponse};
use crate::http::{CancelToken, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::schema::Schema;

const ACCEPT: &str = "accept";
const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";

/// Per-call configuration: method, extra headers, body and cancellation.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub cancel: Option<CancelToken>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn cancel_with(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// A declarative binding: where to send, how, and what shape to expect back.
pub struct Endpoint<S> {
    pub path: String,
    pub options: RequestOptions,
    pub schema: S,
}

impl<S> Endpoint<S> {
    pub fn new(path: impl Into<String>, options: RequestOptions, schema: S) -> Self {
        Self {
            path: path.into(),
            options,
            schema,
        }
    }

    pub fn get(path: impl Into<String>, schema: S) -> Self {
        Self::new(path, RequestOptions::default(), schema)
    }

    pub fn cancel_with(mut self, token: CancelToken) -> Self {
        self.options.cancel = Some(token);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs (`http://`, `https://`, `//`) pass through unchanged;
    /// anything else is appended to the base URL with a leading slash.
    pub fn resolve_url(&self, path: &str) -> String {
        if is_absolute_url(path) {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub fn build_request(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ClientError> {
        let mut headers = vec![(ACCEPT.to_string(), APPLICATION_JSON.to_string())];
        for (name, value) in &options.headers {
            match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
                Some(existing) => existing.1 = value.clone(),
                None => headers.push((name.clone(), value.clone())),
            }
        }

        let body = match &options.body {
            Some(value) => {
                if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(CONTENT_TYPE)) {
                    headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
                }
                Some(serde_json::to_string(value)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: options.method,
            url: self.resolve_url(path),
            headers,
            body,
        })
    }

    pub fn parse_response<S: Schema>(
        &self,
        response: HttpResponse,
        schema: &S,
    ) -> Result<S::Output, ClientError> {
        if response.status == 204 {
            return Ok(schema.validate(None)?);
        }

        let payload = parse_payload(&response.body);

        if !response.is_success() {
            return Err(error_from_response(&response, payload).into());
        }

        Ok(schema.validate(Some(&payload))?)
    }

    pub fn request_json<S: Schema, T: Transport>(
        &self,
        transport: &T,
        path: &str,
        options: RequestOptions,
        schema: &S,
    ) -> Result<S::Output, ClientError> {
        let request = self.build_request(path, &options)?;
        let cancel = options.cancel.as_ref();
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ClientError::Cancelled);
        }

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = transport.execute(request, cancel)?;
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ClientError::Cancelled);
        }
        tracing::debug!(status = response.status, "received response");

        self.parse_response(response, schema).inspect_err(|err| {
            if let ClientError::Api(api) = err {
                tracing::warn!(
                    status = api.status,
                    code = api.code.as_deref().unwrap_or("-"),
                    request_id = api.request_id.as_deref().unwrap_or("-"),
                    "api error: {}",
                    api.message
                );
            }
        })
    }

    pub fn call<S: Schema, T: Transport>(
        &self,
        transport: &T,
        endpoint: Endpoint<S>,
    ) -> Result<S::Output, ClientError> {
        self.request_json(transport, &endpoint.path, endpoint.options, &endpoint.schema)
    }
}

fn is_absolute_url(path: &str) -> bool {
    let has_scheme = |scheme: &str| {
        path.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    };
    has_scheme("http://") || has_scheme("https://") || path.starts_with("//")
}

/// Empty text is `null`; text that is not JSON is kept as a string value.
fn parse_payload(body: &str) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn error_from_response(response: &HttpResponse, payload: Value) -> ApiError {
    match ErrorResponse::from_value(&payload) {
        Some(envelope) => ApiError::structured(response.status, envelope, payload),
        None => ApiError::unstructured(response.status, &response.status_text, &response.body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::error::ErrorCode;
    use crate::http::TransportError;
    use crate::schema::{Json, NoContent, SchemaError};
    use crate::types::Project;
    use serde_json::json;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8080")
    }

    /// Replays a canned response and records the request it was given.
    struct Canned {
        response: HttpResponse,
        seen: RefCell<Option<HttpRequest>>,
    }

    impl Canned {
        fn new(status: u16, status_text: &str, body: &str) -> Self {
            Self {
                response: HttpResponse::new(status, status_text, body),
                seen: RefCell::new(None),
            }
        }
    }

    impl Transport for Canned {
        fn execute(
            &self,
            request: HttpRequest,
            _cancel: Option<&CancelToken>,
        ) -> Result<HttpResponse, TransportError> {
            *self.seen.borrow_mut() = Some(request);
            Ok(self.response.clone())
        }
    }

    const PROJECT: &str = r#"{"id":"11111111-1111-4111-8111-111111111111","name":"Alpha","createdAt":"2025-11-02T10:00:00Z","updatedAt":"2025-11-02T10:00:00Z"}"#;

    #[test]
    fn relative_paths_are_joined_to_base() {
        assert_eq!(client().resolve_url("/api/projects"), "http://localhost:8080/api/projects");
        assert_eq!(client().resolve_url("api/projects"), "http://localhost:8080/api/projects");
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let client = ApiClient::new("http://localhost:8080///");
        assert_eq!(client.resolve_url("/healthz"), "http://localhost:8080/healthz");
    }

    #[test]
    fn absolute_urls_pass_through() {
        let c = client();
        assert_eq!(c.resolve_url("https://other.example/x"), "https://other.example/x");
        assert_eq!(c.resolve_url("HTTP://other.example/x"), "HTTP://other.example/x");
        assert_eq!(c.resolve_url("//cdn.example/x"), "//cdn.example/x");
    }

    #[test]
    fn get_without_body_sends_accept_only() {
        let req = client().build_request("/api/projects", &RequestOptions::default()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.headers, vec![("accept".to_string(), "application/json".to_string())]);
        assert!(req.body.is_none());
    }

    #[test]
    fn body_defaults_content_type_to_json() {
        let opts = RequestOptions::new(HttpMethod::Post).json(&json!({"name": "A"})).unwrap();
        let req = client().build_request("/api/projects", &opts).unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "A"}));
    }

    #[test]
    fn explicit_content_type_is_kept() {
        let opts = RequestOptions::new(HttpMethod::Post)
            .header("Content-Type", "application/merge-patch+json")
            .json(&json!({"name": "A"}))
            .unwrap();
        let req = client().build_request("/x", &opts).unwrap();
        let content_types: Vec<_> = req
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(req.header("content-type"), Some("application/merge-patch+json"));
    }

    #[test]
    fn caller_headers_override_accept() {
        let opts = RequestOptions::default().header("Accept", "text/plain");
        let req = client().build_request("/x", &opts).unwrap();
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("accept"), Some("text/plain"));
    }

    #[test]
    fn no_content_type_without_body() {
        let opts = RequestOptions::new(HttpMethod::Post);
        let req = client().build_request("/api/time/stop", &opts).unwrap();
        assert!(req.header("content-type").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn status_204_validates_absent_payload() {
        let response = HttpResponse::new(204, "No Content", "this is never read");
        client().parse_response(response, &NoContent).unwrap();
    }

    #[test]
    fn status_204_fails_for_schemas_that_need_content() {
        let response = HttpResponse::new(204, "No Content", "");
        let err = client().parse_response(response, &Json::<Project>::new()).unwrap_err();
        assert!(matches!(err, ClientError::Schema(SchemaError::Missing { .. })));
    }

    #[test]
    fn success_payload_is_validated() {
        let response = HttpResponse::new(200, "OK", PROJECT);
        let project = client().parse_response(response, &Json::<Project>::new()).unwrap();
        assert_eq!(project.name, "Alpha");
    }

    #[test]
    fn success_with_wrong_shape_is_a_schema_error() {
        let response = HttpResponse::new(200, "OK", r#"{"id":"nope"}"#);
        let err = client().parse_response(response, &Json::<Project>::new()).unwrap_err();
        assert!(matches!(err, ClientError::Schema(SchemaError::Mismatch { .. })));
    }

    #[test]
    fn success_with_non_json_body_is_a_schema_error() {
        let response = HttpResponse::new(200, "OK", "hello");
        let err = client().parse_response(response, &Json::<Project>::new()).unwrap_err();
        assert!(matches!(err, ClientError::Schema(_)));
    }

    #[test]
    fn structured_error_exposes_fields_verbatim() {
        let body = r#"{"code":"no_active_timer","message":"service: no active timer","requestId":"abc/123"}"#;
        let response = HttpResponse::new(409, "Conflict", body);
        let err = client().parse_response(response, &Json::<Project>::new()).unwrap_err();
        let api = err.as_api().unwrap();
        assert_eq!(api.status, 409);
        assert_eq!(api.code.as_deref(), Some("no_active_timer"));
        assert_eq!(api.request_id.as_deref(), Some("abc/123"));
        assert_eq!(api.message, "no_active_timer: service: no active timer");
        assert_eq!(api.response_body, Some(serde_json::from_str::<Value>(body).unwrap()));
        assert_eq!(err.error_code(), Some(ErrorCode::NoActiveTimer));
    }

    #[test]
    fn unparseable_error_uses_status_line() {
        let response = HttpResponse::new(500, "Internal Server Error", "<h1>boom</h1>");
        let err = client().parse_response(response, &NoContent).unwrap_err();
        let api = err.as_api().unwrap();
        assert_eq!(api.message, "HTTP 500: Internal Server Error");
        assert!(api.message.contains("500"));
        assert!(api.code.is_none());
        assert_eq!(api.response_body, Some(Value::String("<h1>boom</h1>".into())));
    }

    #[test]
    fn json_error_without_envelope_is_unstructured() {
        let response = HttpResponse::new(400, "Bad Request", r#"{"error":"bad"}"#);
        let err = client().parse_response(response, &NoContent).unwrap_err();
        let api = err.as_api().unwrap();
        assert_eq!(api.message, "HTTP 400: Bad Request");
        assert_eq!(api.response_body, Some(Value::String(r#"{"error":"bad"}"#.into())));
    }

    #[test]
    fn request_json_round_trips_through_transport() {
        let transport = Canned::new(200, "OK", PROJECT);
        let project = client()
            .request_json(&transport, "/api/projects/x", RequestOptions::default(), &Json::<Project>::new())
            .unwrap();
        assert_eq!(project.name, "Alpha");
        let seen = transport.seen.borrow().clone().unwrap();
        assert_eq!(seen.url, "http://localhost:8080/api/projects/x");
    }

    #[test]
    fn cancelled_before_send_never_reaches_transport() {
        let transport = Canned::new(200, "OK", PROJECT);
        let token = CancelToken::new();
        token.cancel();
        let opts = RequestOptions::default().cancel_with(token);
        let err = client()
            .request_json(&transport, "/x", opts, &Json::<Project>::new())
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert!(transport.seen.borrow().is_none());
    }

    #[test]
    fn transport_failure_propagates() {
        struct Down;
        impl Transport for Down {
            fn execute(
                &self,
                request: HttpRequest,
                _cancel: Option<&CancelToken>,
            ) -> Result<HttpResponse, TransportError> {
                Err(TransportError::Connection {
                    url: request.url,
                    reason: "connection refused".into(),
                })
            }
        }
        let err = client()
            .request_json(&Down, "/healthz", RequestOptions::default(), &NoContent)
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
