use std::time::Duration;

use tracing::{error, info, warn};

use super::Middleware;
use crate::ids::REQUEST_ID_HEADER;
use crate::server::{HttpRequest, HttpResponse};

/// Logs every request and its outcome.
///
/// Requests slower than `slow_threshold` and `5xx` responses are logged at
/// higher levels.
pub struct TracingMiddleware {
    slow_threshold: Duration,
}

impl Default for TracingMiddleware {
    fn default() -> Self {
        Self {
            slow_threshold: Duration::from_millis(500),
        }
    }
}

impl TracingMiddleware {
    #[must_use]
    pub fn new(slow_threshold: Duration) -> Self {
        Self { slow_threshold }
    }
}

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HttpRequest) -> Option<HttpResponse> {
        info!(
            method = %req.method(),
            path = %req.path(),
            request_id = req.header(REQUEST_ID_HEADER).unwrap_or_default(),
            "Request received"
        );
        None
    }

    fn after(&self, req: &HttpRequest, res: &mut HttpResponse, latency: Duration) {
        let status = res.status.as_u16();
        let latency_ms = latency.as_millis() as u64;
        if res.status.is_server_error() {
            error!(
                method = %req.method(),
                path = %req.path(),
                status,
                latency_ms,
                "Request failed"
            );
        } else if latency > self.slow_threshold {
            warn!(
                method = %req.method(),
                path = %req.path(),
                status,
                latency_ms,
                threshold_ms = self.slow_threshold.as_millis() as u64,
                "Slow request"
            );
        } else {
            info!(
                method = %req.method(),
                path = %req.path(),
                status,
                latency_ms,
                "Request completed"
            );
        }
    }
}
