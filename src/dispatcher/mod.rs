//! # Dispatcher Module
//!
//! Runs a matched request through its handler record and renders the result.
//!
//! ## Request Flow
//!
//! 1. [`Router::route`](crate::router::Router::route) maps the method and
//!    path to a handler record plus captured args. A miss renders the fixed
//!    `404 Not Found`.
//! 2. A fresh [`Context`](crate::context::Context) is built and the
//!    dispatcher's context-init hooks run.
//! 3. Pre-execute hooks run; the first failure aborts.
//! 4. The data parameter, if the handler declares one, is populated from the
//!    captured args and the request body or query. A parse failure is `400`.
//! 5. Post-params-parse hooks inspect the populated parameter.
//! 6. The handler is invoked with its arguments in declared order.
//! 7. The results are rendered according to the return shape. Only
//!    `(data, error)` handlers pass their data through post-execute hooks.
//!
//! Every response carries `server: jetrouter`, and headers the handler set
//! through [`Context::set_header`](crate::context::Context::set_header)
//! are merged in.
//!
//! ## Error Handling
//!
//! - Errors carrying a [`StatusError`](crate::handler::StatusError) keep
//!   their status
//! - Parameter parse errors return `400`
//! - Everything else returns `500` with the error text
//!
//! Handler panics are not caught here; see
//! [`AppService`](crate::server::AppService).
//!
//! ## Example
//!
//! ```rust
//! use jetrouter::dispatcher::{DispatchState, Dispatcher};
//! use jetrouter::router::Router;
//! use jetrouter::server::HttpRequest;
//! use http::{Method, StatusCode};
//! use std::sync::Arc;
//!
//! let dispatcher = Dispatcher::new(Arc::new(Router::default()));
//! let (res, state) = dispatcher.dispatch_with_state(HttpRequest::new(Method::GET, "/nowhere"));
//! assert_eq!(res.status, StatusCode::NOT_FOUND);
//! assert!(matches!(state, DispatchState::Aborted(_)));
//! ```

mod core;

pub use self::core::{error_response, AbortReason, DispatchState, Dispatcher};
