//! Integration tests for controller registration
//!
//! # Test Coverage
//!
//! - Route keys derived from handler names
//! - Hook-named and unroutable endpoints are skipped, not fatal
//! - Unsupported signatures are rejected at registration
//! - Calling conventions recorded on the handler
//! - Explicit routes, overwrites and custom naming tokens

use http::{Method, StatusCode};
use jetrouter::context::Context;
use jetrouter::dispatcher::Dispatcher;
use jetrouter::handler::{Endpoint, RawMethod, Returns};
use jetrouter::registry::{Controller, RegistrationError, Registry};
use jetrouter::router::{CamelCaseNames, NamingError, Router};
use jetrouter::server::HttpRequest;
use jetrouter::signature::{ParamShape, ReturnShape, Signature, SignatureError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

struct Shop;

impl Shop {
    fn get_items(&self) -> Value {
        json!(["apple", "pear"])
    }

    fn get_item_(&self, ctx: &Context, query: HashMap<String, String>) -> anyhow::Result<Value> {
        Ok(json!({ "path": ctx.request().path(), "query": query }))
    }

    fn auth_hook(&self) {}

    fn fetch_items(&self) -> Value {
        Value::Null
    }
}

impl Controller for Shop {
    fn endpoints(&self) -> Vec<Endpoint<Self>> {
        vec![
            Endpoint::named("GetItems", Shop::get_items),
            Endpoint::named("GetItem_", Shop::get_item_),
            Endpoint::named("AuthHook", Shop::auth_hook),
            Endpoint::named("FetchItems", Shop::fetch_items),
            Endpoint::raw(
                "PostItems",
                RawMethod::new(
                    Signature::new()
                        .context()
                        .data::<String>()
                        .data::<u32>()
                        .returns_error(),
                    |_: &Shop, _| Ok(Returns::new()),
                ),
            ),
        ]
    }
}

#[test]
fn test_register_reports_routes_and_skips() {
    let router = Arc::new(Router::default());
    let report = Registry::new(Arc::clone(&router)).register(Arc::new(Shop));

    assert_eq!(report.registered, vec!["get/items", "get/item/*"]);
    assert!(!report.is_complete());

    let skipped: HashMap<_, _> = report.skipped.into_iter().collect();
    assert_eq!(
        skipped["AuthHook"],
        RegistrationError::HookName("AuthHook".to_string())
    );
    assert_eq!(
        skipped["FetchItems"],
        RegistrationError::Naming(NamingError::UnsupportedVerb("Fetch".to_string()))
    );
    assert_eq!(
        skipped["PostItems"],
        RegistrationError::Signature {
            endpoint: "PostItems".to_string(),
            source: SignatureError::TooManyParams(3),
        }
    );
    assert_eq!(router.len(), 2);
}

#[test]
fn test_calling_convention_is_recorded() {
    let router = Arc::new(Router::default());
    Registry::new(Arc::clone(&router)).register(Arc::new(Shop));

    let matched = router.route(&Method::GET, "/item/9").unwrap();
    let convention = matched.record.convention();
    assert!(matches!(convention.params, ParamShape::ContextThenData(_)));
    assert_eq!(convention.returns, ReturnShape::DataThenError);

    let matched = router.route(&Method::GET, "/items").unwrap();
    assert_eq!(matched.record.convention().params, ParamShape::None);
    assert_eq!(matched.record.convention().returns, ReturnShape::DataOnly);
}

#[test]
fn test_registered_handler_serves_requests() {
    let router = Arc::new(Router::default());
    Registry::new(Arc::clone(&router)).register(Arc::new(Shop));
    let dispatcher = Dispatcher::new(router);

    let response = dispatcher.dispatch(HttpRequest::new(Method::GET, "/item/9?color=red"));
    assert_eq!(response.status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body, json!({"path": "/item/9", "query": {"color": "red"}}));
}

struct Legacy;

impl Legacy {
    fn status(&self) -> String {
        "v1".to_string()
    }

    fn status_v2(&self) -> String {
        "v2".to_string()
    }
}

impl Controller for Legacy {
    fn endpoints(&self) -> Vec<Endpoint<Self>> {
        vec![
            Endpoint::route(Method::GET, "/api/{version}/status", Legacy::status),
            Endpoint::route(Method::GET, "/api/:v/status", Legacy::status_v2),
        ]
    }
}

#[test]
fn test_explicit_routes_and_overwrite() {
    let router = Arc::new(Router::default());
    let report = Registry::new(Arc::clone(&router)).register(Arc::new(Legacy));

    assert_eq!(report.registered, vec!["get/api/*/status", "get/api/*/status"]);
    assert_eq!(router.len(), 1);

    let dispatcher = Dispatcher::new(router);
    let response = dispatcher.dispatch(HttpRequest::new(Method::GET, "/api/1/status"));
    assert_eq!(response.body, b"v2");
}

#[test]
fn test_custom_marker_and_wildcard() {
    let router = Arc::new(Router::new(":"));
    let report = Registry::new(Arc::clone(&router))
        .with_naming(CamelCaseNames::new("By", ":"))
        .register(Arc::new(Shop));

    // `GetItem_` has no `By` marker under this naming, so `_` stays a word.
    assert!(report.registered.contains(&"get/items".to_string()));
    assert!(router.contains("get/item_"));
}

struct Orders;

impl Orders {
    fn get_order_by(&self, ctx: &Context) -> String {
        ctx.request().path().to_string()
    }
}

impl Controller for Orders {
    fn endpoints(&self) -> Vec<Endpoint<Self>> {
        vec![Endpoint::named("GetOrderBy", Orders::get_order_by)]
    }
}

#[test]
fn test_multi_letter_marker_routes_wildcard() {
    let router = Arc::new(Router::new(":"));
    let report = Registry::new(Arc::clone(&router))
        .with_naming(CamelCaseNames::new("By", ":"))
        .register(Arc::new(Orders));

    assert_eq!(report.registered, vec!["get/order/:"]);
    let matched = router.route(&Method::GET, "/order/77").unwrap();
    assert_eq!(matched.arg(0), Some("77"));
}
