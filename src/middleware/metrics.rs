use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::server::{HttpRequest, HttpResponse};

/// Request counters and latency totals.
///
/// All counters are updated with relaxed atomics; the per-status table is a
/// sharded map so concurrent requests rarely contend.
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    server_errors: AtomicUsize,
    stack_size: AtomicUsize,
    status_counts: DashMap<u16, usize>,
}

impl Default for MetricsMiddleware {
    fn default() -> Self {
        Self {
            request_count: AtomicUsize::new(0),
            total_latency_ns: AtomicU64::new(0),
            server_errors: AtomicUsize::new(0),
            stack_size: AtomicUsize::new(0),
            status_counts: DashMap::new(),
        }
    }
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of requests seen by `before`.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean latency over all completed requests; zero before the first.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.completed() as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    #[must_use]
    pub fn server_errors(&self) -> usize {
        self.server_errors.load(Ordering::Relaxed)
    }

    /// Responses seen with `status`.
    #[must_use]
    pub fn status_count(&self, status: u16) -> usize {
        self.status_counts.get(&status).map_or(0, |c| *c)
    }

    /// Stack size of the coroutine that served the latest request.
    #[must_use]
    pub fn stack_size(&self) -> usize {
        self.stack_size.load(Ordering::Relaxed)
    }

    fn completed(&self) -> usize {
        self.status_counts.iter().map(|entry| *entry.value()).sum()
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &HttpRequest) -> Option<HttpResponse> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &HttpRequest, res: &mut HttpResponse, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        *self.status_counts.entry(res.status.as_u16()).or_insert(0) += 1;
        if res.status.is_server_error() {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }
        let size = if may::coroutine::is_coroutine() {
            may::coroutine::current().stack_size()
        } else {
            may::config().get_stack_size()
        };
        self.stack_size.store(size, Ordering::Relaxed);
    }
}
