//! # Middleware Module
//!
//! Cross-cutting request processing around the dispatcher: logging and
//! metrics. Middlewares see the transport-level [`HttpRequest`] and
//! [`HttpResponse`](crate::server::HttpResponse), so they also observe
//! `404`s and recovered panics.
//!
//! [`HttpRequest`]: crate::server::HttpRequest

mod core;
mod metrics;
mod tracing;

pub use self::core::Middleware;
pub use metrics::MetricsMiddleware;
pub use self::tracing::TracingMiddleware;
