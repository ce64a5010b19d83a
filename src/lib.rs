//! # jetrouter
//!
//! **jetrouter** is a coroutine-powered HTTP router that derives its routes
//! from controller method names and dispatches requests through a typed
//! handler protocol with a hook pipeline.
//!
//! ## Overview
//!
//! A controller exposes methods such as `GetUser_Info`. The naming strategy
//! turns each name into a route key (`get/user/*/info`), the router stores
//! it in a segment trie, and the dispatcher populates the method's data
//! parameter from the request, calls it and renders what it returns.
//!
//! ## Architecture
//!
//! - **[`router`]** - Segment trie, route keys and name-to-route conventions
//! - **[`signature`]** - Handler signature classification
//! - **[`handler`]** - Endpoints, adapters from Rust functions and handler records
//! - **[`params`]** - Populating typed data parameters from requests
//! - **[`hooks`]** - Pre-execute, post-parse, post-execute and context-init hooks
//! - **[`registry`]** - Registering controllers into a router
//! - **[`dispatcher`]** - The per-request pipeline and response rendering
//! - **[`context`]** - Per-request context handed to handlers
//! - **[`server`]** - HTTP server built on `may_minihttp` with request/response types
//! - **[`middleware`]** - Tracing and metrics middleware
//! - **[`logging`]** - Structured logging setup
//! - **[`runtime_config`]** - Environment-driven settings
//! - **[`cli`]** - The `jetrouter` binary's commands
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as HttpServer<br/>(may_minihttp)
//!     participant Service as AppService
//!     participant Router
//!     participant Dispatcher
//!     participant Handler
//!
//!     Client->>Server: GET /user/42/info
//!     Server->>Service: HttpRequest
//!     Service->>Service: middleware before
//!     Service->>Dispatcher: dispatch(request)
//!     Dispatcher->>Router: route(GET, /user/42/info)
//!     Router-->>Dispatcher: record + args ["42"]
//!     Dispatcher->>Dispatcher: context-init and pre-execute hooks
//!     Dispatcher->>Dispatcher: populate data param, post-parse hooks
//!     Dispatcher->>Handler: invoke
//!     Handler-->>Dispatcher: returns
//!     Dispatcher->>Dispatcher: post-execute hooks, render
//!     Dispatcher-->>Service: HttpResponse
//!     Service->>Service: middleware after
//!     Service-->>Client: 200 {"id":"42"}
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use jetrouter::dispatcher::Dispatcher;
//! use jetrouter::handler::Endpoint;
//! use jetrouter::registry::{Controller, Registry};
//! use jetrouter::router::Router;
//! use jetrouter::server::HttpRequest;
//! use http::{Method, StatusCode};
//! use std::sync::Arc;
//!
//! struct Hello;
//!
//! impl Hello {
//!     fn get_hello(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! impl Controller for Hello {
//!     fn endpoints(&self) -> Vec<Endpoint<Self>> {
//!         vec![Endpoint::named("GetHello", Hello::get_hello)]
//!     }
//! }
//!
//! let router = Arc::new(Router::default());
//! Registry::new(Arc::clone(&router)).register(Arc::new(Hello));
//!
//! let dispatcher = Dispatcher::new(router);
//! let response = dispatcher.dispatch(HttpRequest::new(Method::GET, "/hello"));
//! assert_eq!(response.status, StatusCode::OK);
//! assert_eq!(response.body, b"hello");
//! ```
//!
//! ## Running the Demo
//!
//! ```bash
//! JET_LOG_FORMAT=pretty cargo run -- serve --addr 127.0.0.1:8080
//! curl 'http://127.0.0.1:8080/echo?name=neo&age=30'
//! curl http://127.0.0.1:8080/user/42/info
//! ```

// Lets the derive macros refer to `::jetrouter` from inside this crate.
extern crate self as jetrouter;

pub mod cli;
pub mod context;
pub mod dispatcher;
pub mod echo;
pub mod handler;
pub mod hooks;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod params;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod signature;

pub use context::Context;
pub use dispatcher::Dispatcher;
pub use handler::{Endpoint, ErrorFirst, StatusError};
pub use registry::{Controller, Registry};
pub use router::Router;
