use dashmap::DashMap;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use may_minihttp::Response;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{error, warn};

/// Fixed body of the not-found response.
pub const NOT_FOUND_BODY: &str = "404 Not Found";

/// Value of the `Server` header stamped on every response.
pub const SERVER_NAME: &str = "jetrouter";

/// Transport-independent response produced by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

fn content_type(value: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
    headers
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// `200` with a rendered value: strings go out raw as `text/plain`,
    /// everything else as JSON.
    #[must_use]
    pub fn success(value: Value) -> Self {
        match value {
            Value::String(s) => {
                Self::new(StatusCode::OK, content_type("text/plain"), s.into_bytes())
            }
            other => Self::json(StatusCode::OK, &other),
        }
    }

    /// `200` with no body.
    #[must_use]
    pub fn empty_success() -> Self {
        Self::new(StatusCode::OK, HeaderMap::new(), Vec::new())
    }

    /// Error status with the error text as a `text/plain` body.
    #[must_use]
    pub fn failure(status: StatusCode, message: &str) -> Self {
        Self::new(
            status,
            content_type("text/plain"),
            message.as_bytes().to_vec(),
        )
    }

    /// Any status with a JSON body.
    #[must_use]
    pub fn json(status: StatusCode, value: &Value) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::new(status, content_type("application/json"), body),
            Err(e) => {
                error!(error = %e, "Response serialization failed");
                Self::failure(StatusCode::INTERNAL_SERVER_ERROR, "response serialization failed")
            }
        }
    }

    /// The fixed not-found response.
    #[must_use]
    pub fn not_found() -> Self {
        Self::failure(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body as UTF-8 text, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Merge `headers` in, replacing existing values for the same names.
    pub fn merge_headers(&mut self, headers: &HeaderMap) {
        let mut last: Option<HeaderName> = None;
        for (name, value) in headers {
            if last.as_ref() != Some(name) {
                self.headers.remove(name);
                last = Some(name.clone());
            }
            self.headers.append(name.clone(), value.clone());
        }
    }

    /// Write status, headers and body into a `may_minihttp` response.
    pub fn write_to(self, res: &mut Response) {
        let reason = self.status.canonical_reason().unwrap_or("Unknown");
        res.status_code(usize::from(self.status.as_u16()), reason);
        for (name, value) in &self.headers {
            let line = format!(
                "{}: {}",
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes())
            );
            match static_header_line(line) {
                Some(line) => {
                    res.header(line);
                }
                None => warn!(header = %name, "Header line cache full, dropping header"),
            }
        }
        res.body_vec(self.body);
    }
}

/// Distinct header lines kept for the life of the process.
pub const MAX_HEADER_LINES: usize = 4096;

static HEADER_LINES: OnceLock<HeaderLines> = OnceLock::new();

/// `may_minihttp` only takes `'static` header lines. Each distinct line is
/// leaked once and reused; `None` once [`MAX_HEADER_LINES`] are held.
fn static_header_line(line: String) -> Option<&'static str> {
    HEADER_LINES
        .get_or_init(|| HeaderLines::with_capacity(MAX_HEADER_LINES))
        .intern(line)
}

/// Bounded set of leaked header lines.
struct HeaderLines {
    capacity: usize,
    lines: DashMap<String, &'static str>,
}

impl HeaderLines {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            lines: DashMap::new(),
        }
    }

    fn intern(&self, line: String) -> Option<&'static str> {
        if let Some(cached) = self.lines.get(&line) {
            return Some(*cached);
        }
        if self.lines.len() >= self.capacity {
            return None;
        }
        let entry = self
            .lines
            .entry(line.clone())
            .or_insert_with(|| Box::leak(line.into_boxed_str()));
        Some(*entry)
    }
}
