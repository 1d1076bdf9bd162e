//! Blocking HTTP transport backed by `ureq`.

use clockwork_core::{CancelToken, HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
use ureq::RequestBuilder;

/// Performs requests with a shared `ureq::Agent`.
///
/// Non-2xx statuses come back as ordinary responses so the core can turn
/// them into `ApiError`s. Cancellation is checked before the request is sent
/// and again once the body has been read; an in-flight request is not
/// interrupted.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn cancelled(cancel: Option<&CancelToken>) -> bool {
    cancel.is_some_and(CancelToken::is_cancelled)
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        request: HttpRequest,
        cancel: Option<&CancelToken>,
    ) -> Result<HttpResponse, TransportError> {
        if cancelled(cancel) {
            return Err(TransportError::Cancelled);
        }

        let HttpRequest { method, url, headers, body } = request;
        let result = match method {
            HttpMethod::Get => with_headers(self.agent.get(&url), &headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), &headers).call(),
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
                let builder = match method {
                    HttpMethod::Post => self.agent.post(&url),
                    HttpMethod::Put => self.agent.put(&url),
                    _ => self.agent.patch(&url),
                };
                let builder = with_headers(builder, &headers);
                match &body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let connection_error = |reason: String| TransportError::Connection {
            url: url.clone(),
            reason,
        };
        let mut response = result.map_err(|e| connection_error(e.to_string()))?;
        let status = response.status();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| connection_error(e.to_string()))?;

        if cancelled(cancel) {
            return Err(TransportError::Cancelled);
        }
        tracing::trace!(%method, %url, status = status.as_u16(), "response received");
        Ok(HttpResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            text,
        ))
    }
}
