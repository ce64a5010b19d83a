//! Integration tests for the HTTP service and server
//!
//! # Test Coverage
//!
//! - Panic recovery in [`AppService::handle`]
//! - Middleware ordering, short-circuiting and metrics
//! - A real `may_minihttp` server serving the demo controller
//!
//! # Important Notes
//!
//! - Tests use May coroutines with 32KB stack size
//! - The live server binds a free loopback port and is stopped on drop

use http::{Method, StatusCode};
use jetrouter::cli::{build_router, build_service};
use jetrouter::dispatcher::Dispatcher;
use jetrouter::handler::Endpoint;
use jetrouter::middleware::{MetricsMiddleware, Middleware};
use jetrouter::registry::{Controller, Registry};
use jetrouter::router::Router;
use jetrouter::runtime_config::RuntimeConfig;
use jetrouter::server::{
    AppService, HttpRequest, HttpResponse, HttpServer, ServerHandle, PANIC_BODY, SERVER_NAME,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

mod common;
use common::http::{parse_response, send_request};
use common::test_server::{free_addr, setup_may_runtime};

struct Fragile;

impl Fragile {
    fn get_boom(&self) -> String {
        panic!("handler exploded")
    }

    fn get_fine(&self) -> String {
        "fine".to_string()
    }
}

impl Controller for Fragile {
    fn endpoints(&self) -> Vec<Endpoint<Self>> {
        vec![
            Endpoint::named("GetBoom", Fragile::get_boom),
            Endpoint::named("GetFine", Fragile::get_fine),
        ]
    }
}

fn fragile_service() -> (AppService, Arc<MetricsMiddleware>) {
    let router = Arc::new(Router::default());
    Registry::new(Arc::clone(&router)).register(Arc::new(Fragile));
    let metrics = Arc::new(MetricsMiddleware::new());
    let service = AppService::new(Arc::new(Dispatcher::new(router)))
        .with_middleware(Arc::clone(&metrics) as Arc<dyn Middleware>);
    (service, metrics)
}

#[test]
fn test_handler_panic_becomes_500_and_service_survives() {
    let (service, metrics) = fragile_service();

    let response = service.handle(HttpRequest::new(Method::GET, "/boom"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, PANIC_BODY.as_bytes());
    assert_eq!(response.header("server"), Some(SERVER_NAME));

    let response = service.handle(HttpRequest::new(Method::GET, "/fine"));
    assert_eq!(response.status, StatusCode::OK);

    assert_eq!(metrics.request_count(), 2);
    assert_eq!(metrics.server_errors(), 1);
    assert_eq!(metrics.status_count(200), 1);
}

struct Maintenance;

impl Middleware for Maintenance {
    fn before(&self, req: &HttpRequest) -> Option<HttpResponse> {
        (req.path() != "/fine").then(|| {
            HttpResponse::failure(StatusCode::SERVICE_UNAVAILABLE, "maintenance")
        })
    }
}

#[test]
fn test_middleware_short_circuit_skips_dispatch() {
    let (service, metrics) = fragile_service();
    let service = service.with_middleware(Arc::new(Maintenance));

    let response = service.handle(HttpRequest::new(Method::GET, "/boom"));
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body, b"maintenance");
    // Metrics registered first still observed the request.
    assert_eq!(metrics.request_count(), 1);
    assert_eq!(metrics.status_count(503), 1);
    assert_eq!(metrics.server_errors(), 1);

    let response = service.handle(HttpRequest::new(Method::GET, "/fine"));
    assert_eq!(response.status, StatusCode::OK);
}

/// Stops the live server when the test ends, pass or fail.
struct LiveServer {
    handle: Option<ServerHandle>,
    addr: SocketAddr,
}

impl LiveServer {
    fn start() -> Self {
        setup_may_runtime();
        let router = build_router(&RuntimeConfig::default());
        let service = build_service(router, None);
        let handle = HttpServer(service).start(free_addr()).unwrap();
        handle.wait_ready().unwrap();
        let addr = handle.addr();
        Self {
            handle: Some(handle),
            addr,
        }
    }

    fn get(&self, path: &str) -> (u16, Vec<String>, String) {
        let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        parse_response(&send_request(&self.addr, &req))
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

#[test]
fn test_live_server_round_trip() {
    let server = LiveServer::start();

    let (status, headers, body) = server.get("/echo?name=neo&age=30");
    assert_eq!(status, 200);
    assert!(headers.iter().any(|h| h == "server: jetrouter"));
    assert!(headers.iter().any(|h| h == "x-echo-named: true"));
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"name": "neo", "age": 30}));

    let (status, _, body) = server.get("/user/42/info");
    assert_eq!(status, 200);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"id": "42"}));

    let (status, _, body) = server.get("/nowhere");
    assert_eq!(status, 404);
    assert_eq!(body, "404 Not Found");
}

#[test]
fn test_live_server_json_post() {
    let server = LiveServer::start();
    let payload = r#"{"hello":"world"}"#;
    let req = format!(
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{payload}",
        payload.len()
    );
    let (status, _, body) = parse_response(&send_request(&server.addr, &req));
    assert_eq!(status, 200);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"hello": "world"}));
}
