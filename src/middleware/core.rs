use std::time::Duration;

use crate::server::{HttpRequest, HttpResponse};

/// Observes or short-circuits requests around dispatch.
///
/// `before` runs in registration order; the first `Some` response skips
/// dispatch (later middlewares still see the request). `after` runs for
/// every request with the final response and the elapsed time.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HttpRequest) -> Option<HttpResponse> {
        None
    }
    fn after(&self, _req: &HttpRequest, _res: &mut HttpResponse, _latency: Duration) {}
}
