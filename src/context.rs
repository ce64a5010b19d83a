//! Per-request context handed to hooks and handlers.
//!
//! A [`Context`] is built fresh by the dispatcher for every matched request
//! and dropped when the response is rendered. It carries the request, its
//! id and tracing span, headers the handler wants on the response, and a
//! small string-keyed store for passing values between hooks and handlers.

use anyhow::Context as _;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{info_span, Span};

use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::server::HttpRequest;

pub struct Context {
    request_id: RequestId,
    request: HttpRequest,
    span: Span,
    started: Instant,
    deadline: Option<Instant>,
    response_headers: RefCell<HeaderMap>,
    values: RefCell<HashMap<String, Value>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("method", self.request.method())
            .field("path", &self.request.path())
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Wrap `request`, taking the request id from `x-request-id` when valid.
    #[must_use]
    pub fn new(request: HttpRequest) -> Self {
        let request_id = RequestId::from_header_or_new(request.header(REQUEST_ID_HEADER));
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %request.method(),
            path = %request.path(),
        );
        Self {
            request_id,
            request,
            span,
            started: Instant::now(),
            deadline: None,
            response_headers: RefCell::new(HeaderMap::new()),
            values: RefCell::new(HashMap::new()),
        }
    }

    /// Attach a cooperative deadline `timeout` from now.
    ///
    /// Nothing enforces it; long-running handlers poll [`Context::is_expired`].
    #[must_use]
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.deadline = Some(self.started + timeout);
        self
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.request.query(name)
    }

    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Set a header on the eventual response, replacing earlier values.
    ///
    /// Each distinct `name: value` line is kept for the life of the process,
    /// and only [`MAX_HEADER_LINES`](crate::server::MAX_HEADER_LINES) of them
    /// are kept. Once that many are held, headers with a new value are dropped
    /// with a warning. Avoid values that vary per request, such as echoed
    /// user input.
    ///
    /// # Errors
    ///
    /// Fails when `name` or `value` is not valid HTTP.
    pub fn set_header(&self, name: &str, value: &str) -> anyhow::Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name {name:?}"))?;
        let value =
            HeaderValue::from_str(value).with_context(|| format!("invalid value for {name}"))?;
        self.response_headers.borrow_mut().insert(name, value);
        Ok(())
    }

    /// Store a value for later hooks or the handler.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.values.borrow_mut().insert(key.into(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    pub(crate) fn take_response_headers(&self) -> HeaderMap {
        std::mem::take(&mut *self.response_headers.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_request_id_from_header() {
        let id = RequestId::new();
        let req = HttpRequest::new(Method::GET, "/").with_header(REQUEST_ID_HEADER, &id.to_string());
        assert_eq!(Context::new(req).request_id(), id);
    }

    #[test]
    fn test_store_and_headers() {
        let ctx = Context::new(HttpRequest::new(Method::GET, "/?a=1"));
        ctx.set("user", Value::from("neo"));
        assert_eq!(ctx.get("user"), Some(Value::from("neo")));
        assert_eq!(ctx.query("a"), Some("1"));
        ctx.set_header("x-trace", "abc").unwrap();
        assert!(ctx.set_header("bad header", "x").is_err());
        let headers = ctx.take_response_headers();
        assert_eq!(headers.get("x-trace").unwrap(), "abc");
    }

    #[test]
    fn test_deadline() {
        let ctx = Context::new(HttpRequest::new(Method::GET, "/"));
        assert!(!ctx.is_expired());
        let ctx = ctx.with_deadline(Duration::ZERO);
        assert!(ctx.is_expired());
    }
}
