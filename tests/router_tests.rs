//! Integration tests for the route table
//!
//! # Test Coverage
//!
//! - Static and wildcard registration through [`Router::add`]
//! - Literal segments winning over wildcards, with no backtracking
//! - Wildcard capture order
//! - Removal, clearing and listing
//! - Concurrent add/route/remove on disjoint key families

use http::Method;
use jetrouter::handler::{Endpoint, HandlerRecord};
use jetrouter::hooks::HookSet;
use jetrouter::router::{route_key, Router, RouterError};
use std::sync::Arc;
use std::thread;

struct Noop;

impl Noop {
    fn call(&self) -> String {
        "ok".to_string()
    }
}

fn record(name: &str) -> Arc<HandlerRecord> {
    let record = Endpoint::named(name, Noop::call)
        .into_record(Arc::new(Noop), HookSet::new())
        .unwrap();
    Arc::new(record)
}

fn handler_for(router: &Router, method: Method, path: &str) -> Option<String> {
    router
        .route(&method, path)
        .map(|m| m.record.name().to_string())
}

#[test]
fn test_static_and_dynamic_routes_resolve() {
    let router = Router::default();
    router.add("get/user/info", record("GetUserInfo")).unwrap();
    router.add("get/user/*/info", record("GetUser_Info")).unwrap();
    router.add("post/user", record("PostUser")).unwrap();
    assert_eq!(router.len(), 3);

    assert_eq!(
        handler_for(&router, Method::GET, "/user/info").as_deref(),
        Some("GetUserInfo")
    );
    let matched = router.route(&Method::GET, "/user/42/info").unwrap();
    assert_eq!(matched.record.name(), "GetUser_Info");
    assert_eq!(matched.arg(0), Some("42"));
    assert_eq!(matched.key, "get/user/42/info");

    assert_eq!(handler_for(&router, Method::POST, "/user/").as_deref(), Some("PostUser"));
    assert!(handler_for(&router, Method::DELETE, "/user").is_none());
}

#[test]
fn test_wildcards_capture_left_to_right() {
    let router = Router::default();
    router.add("get/org/*/team/*", record("GetOrg_Team_")).unwrap();

    let matched = router.route(&Method::GET, "/org/acme/team/core").unwrap();
    assert_eq!(matched.args.as_slice(), ["acme", "core"]);
    assert!(router.route(&Method::GET, "/org/acme/team").is_none());
}

#[test]
fn test_literal_beats_wildcard_without_backtracking() {
    let router = Router::default();
    router.add("get/a/*/c", record("wild")).unwrap();
    router.add("get/a/b/d", record("literal")).unwrap();
    router.add("get/a/b/*/e", record("deep")).unwrap();

    // `b` is taken literally; that branch ends without a value at `c`.
    assert!(router.route(&Method::GET, "/a/b/c").is_none());
    assert_eq!(handler_for(&router, Method::GET, "/a/x/c").as_deref(), Some("wild"));
    assert_eq!(handler_for(&router, Method::GET, "/a/b/d").as_deref(), Some("literal"));
    assert_eq!(handler_for(&router, Method::GET, "/a/b/z/e").as_deref(), Some("deep"));
}

#[test]
fn test_remove_then_lookup_misses() {
    let router = Router::default();
    router.add("get/item/*", record("GetItem_")).unwrap();
    router.add("get/items", record("GetItems")).unwrap();

    let removed = router.remove("get/item/*").unwrap();
    assert_eq!(removed.map(|r| r.name().to_string()).as_deref(), Some("GetItem_"));
    assert!(router.route(&Method::GET, "/item/7").is_none());
    assert!(router.remove("get/item/*").unwrap().is_none());

    assert!(router.remove("get/items").unwrap().is_some());
    assert!(router.is_empty());
}

#[test]
fn test_empty_key_is_rejected() {
    let router = Router::default();
    assert_eq!(
        router.add("", record("x")).unwrap_err(),
        RouterError::InvalidKey(String::new())
    );
    assert!(router.remove("/").is_err());
}

#[test]
fn test_contains_starts_with_and_clear() {
    let router = Router::default();
    router.add("get/user/*/info", record("GetUser_Info")).unwrap();
    router.add("get/health", record("GetHealth")).unwrap();

    assert!(router.contains("get/user/*/info"));
    assert!(router.contains("get/user/9/info"));
    assert!(!router.contains("get/user/9"));
    assert!(router.starts_with("get/user"));
    assert!(router.starts_with("get/health"));
    assert!(!router.starts_with("get/heal"));

    router.clear();
    assert!(router.is_empty());
    assert!(!router.contains("get/health"));
}

#[test]
fn test_routes_lists_static_then_dynamic() {
    let router = Router::default();
    router.add("get/user/*/info", record("GetUser_Info")).unwrap();
    router.add("get/health", record("GetHealth")).unwrap();

    assert_eq!(
        router.routes(),
        vec![
            ("get/health".to_string(), "GetHealth".to_string()),
            ("get/user/*/info".to_string(), "GetUser_Info".to_string()),
        ]
    );
}

#[test]
fn test_custom_wildcard_token() {
    let router = Router::new(":");
    router.add("get/doc/:", record("GetDoc_")).unwrap();
    let matched = router.route(&Method::GET, "/doc/readme").unwrap();
    assert_eq!(matched.arg(0), Some("readme"));
    assert_eq!(router.wildcard(), ":");
}

#[test]
fn test_concurrent_disjoint_add_get_remove() {
    let router = Arc::new(Router::default());
    router.add("get/ping", record("GetPing")).unwrap();

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let router = Arc::clone(&router);
            thread::spawn(move || {
                for j in 0..50 {
                    let dynamic = format!("get/t{i}/*/n{j}");
                    let fixed = format!("get/t{i}/s{j}");
                    assert!(router.add(&dynamic, record("dynamic")).unwrap().is_none());
                    assert!(router.add(&fixed, record("fixed")).unwrap().is_none());

                    let arg = format!("id{j}");
                    let matched = router
                        .route(&Method::GET, &format!("/t{i}/{arg}/n{j}"))
                        .unwrap();
                    assert_eq!(matched.arg(0), Some(arg.as_str()));
                    let matched = router.route(&Method::GET, &format!("/t{i}/s{j}")).unwrap();
                    assert_eq!(matched.arg(0), None);

                    assert!(router.remove(&dynamic).unwrap().is_some());
                    assert!(router.remove(&fixed).unwrap().is_some());
                    assert!(router.route(&Method::GET, &format!("/t{i}/{arg}/n{j}")).is_none());
                    assert!(router.route(&Method::GET, &format!("/t{i}/s{j}")).is_none());
                }
                // Keep the last key of each family to check the final table.
                router.add(&format!("get/t{i}/*/last"), record("last")).unwrap();
            })
        })
        .collect();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let router = Arc::clone(&router);
            thread::spawn(move || {
                for _ in 0..200 {
                    assert!(router.route(&Method::GET, "/ping").is_some());
                }
            })
        })
        .collect();

    for handle in workers.into_iter().chain(readers) {
        handle.join().unwrap();
    }
    assert_eq!(router.len(), 1 + 8);
    assert!(router.route(&Method::GET, "/t0/x/n0").is_none());
    let matched = router.route(&Method::GET, "/t7/x/last").unwrap();
    assert_eq!(matched.arg(0), Some("x"));
}

#[test]
fn test_route_key_matches_registration_form() {
    assert_eq!(route_key(&Method::PATCH, "/a//b/"), "patch/a/b");
}
