//! # Server Module
//!
//! Adapts the `may_minihttp` transport to the dispatcher.
//!
//! - [`HttpRequest`] / [`HttpResponse`] are the transport-independent request
//!   and response the rest of the crate works with
//! - [`AppService`] implements `may_minihttp::HttpService`: it converts the
//!   request, runs middlewares, dispatches under panic recovery and writes
//!   the response
//! - [`HttpServer`] starts the service and returns a [`ServerHandle`]
//!
//! ```rust,no_run
//! use jetrouter::dispatcher::Dispatcher;
//! use jetrouter::router::Router;
//! use jetrouter::server::{AppService, HttpServer};
//! use std::sync::Arc;
//!
//! let dispatcher = Arc::new(Dispatcher::new(Arc::new(Router::default())));
//! let handle = HttpServer(AppService::new(dispatcher)).start("127.0.0.1:8080")?;
//! handle.wait_ready()?;
//! handle.stop();
//! # Ok::<(), std::io::Error>(())
//! ```

mod http_server;
mod request;
mod response;
mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{ContentKind, HttpRequest, UploadedFile};
pub use response::{HttpResponse, MAX_HEADER_LINES, NOT_FOUND_BODY, SERVER_NAME};
pub use service::{AppService, PANIC_BODY};
