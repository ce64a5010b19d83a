//! Integration tests for request parameter population
//!
//! Exercises `#[derive(RequestParams)]` from outside the crate together
//! with [`populate`] on query, form and JSON requests.

use http::Method;
use jetrouter::params::{populate, ParseError, RequestParams};
use jetrouter::server::HttpRequest;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize, RequestParams)]
#[serde(default)]
struct Paging {
    #[param(default)]
    limit: u32,
    offset: u32,
}

#[derive(Debug, Deserialize, RequestParams)]
#[serde(default)]
struct Listing {
    #[param(args)]
    args: Vec<String>,
    #[param(name = "q")]
    query: String,
    #[param(has = "sort_given")]
    sort: String,
    #[serde(skip)]
    sort_given: bool,
    #[param(flatten)]
    paging: Paging,
    #[param(skip)]
    internal: String,
}

impl Default for Listing {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            query: String::new(),
            sort: String::new(),
            sort_given: false,
            paging: Paging {
                limit: 25,
                offset: 0,
            },
            internal: "untouched".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, RequestParams)]
struct OnlyArgs {
    #[param(args)]
    args: Vec<String>,
}

#[test]
fn test_query_binding_with_attributes() {
    let req = HttpRequest::new(Method::GET, "/shelf/7/books?q=rust&offset=20&internal=x");
    let listing: Listing = populate(&req, &["7".to_string()]).unwrap();

    assert_eq!(listing.args, ["7"]);
    assert_eq!(listing.query, "rust");
    assert!(!listing.sort_given);
    assert_eq!(listing.paging.limit, 25);
    assert_eq!(listing.paging.offset, 20);
    assert_eq!(listing.internal, "untouched");
}

#[test]
fn test_presence_companion_set_when_value_given() {
    let req = HttpRequest::new(Method::GET, "/books?sort=title&limit=5");
    let listing: Listing = populate(&req, &[]).unwrap();

    assert!(listing.sort_given);
    assert_eq!(listing.sort, "title");
    assert_eq!(listing.paging.limit, 5);
}

#[test]
fn test_args_only_struct_ignores_query() {
    let req = HttpRequest::new(Method::GET, "/a/b?args=zzz");
    let only: OnlyArgs = populate(&req, &["a".to_string(), "b".to_string()]).unwrap();
    assert_eq!(only.args, ["a", "b"]);
}

#[test]
fn test_form_values_fall_back_to_query() {
    let req = HttpRequest::new(Method::POST, "/books?offset=3")
        .with_form(&[("q", "form value"), ("sort", "year")]);
    let listing: Listing = populate(&req, &[]).unwrap();

    assert_eq!(listing.query, "form value");
    assert!(listing.sort_given);
    assert_eq!(listing.paging.offset, 3);
}

#[test]
fn test_json_body_decodes_with_serde() {
    let req = HttpRequest::new(Method::POST, "/books/9")
        .with_json(&json!({"query": "from body", "paging": {"limit": 1, "offset": 2}}));
    let listing: Listing = populate(&req, &["9".to_string()]).unwrap();

    assert_eq!(listing.query, "from body");
    assert_eq!(listing.paging.limit, 1);
    assert_eq!(listing.args, ["9"]);
}

#[test]
fn test_empty_json_body_keeps_defaults() {
    let req = HttpRequest::new(Method::POST, "/books").with_header("content-type", "application/json");
    let listing: Listing = populate(&req, &[]).unwrap();
    assert_eq!(listing.paging.limit, 25);
}

#[test]
fn test_conversion_failure_names_the_field() {
    let req = HttpRequest::new(Method::GET, "/books?offset=-1");
    let err = populate::<Listing>(&req, &[]).unwrap_err();
    match err {
        ParseError::Field { ref field, .. } => assert_eq!(field, "offset"),
        other => panic!("expected field error, got {other:?}"),
    }
}

#[test]
fn test_repeated_values_collect_into_vec() {
    let req = HttpRequest::new(Method::GET, "/ids?id=1&id=2&id=3");
    let ids: Vec<u64> = populate(&req, &[]).unwrap();
    assert_eq!(ids, [1, 2, 3]);
}

#[derive(Debug, Deserialize, RequestParams)]
#[serde(default)]
struct Filter {
    #[param(has = "page_given", default)]
    page: u32,
    #[serde(skip)]
    page_given: bool,
    tag: Vec<u32>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            page: 1,
            page_given: false,
            tag: Vec::new(),
        }
    }
}

#[test]
fn test_form_presence_with_default() {
    let req = HttpRequest::new(Method::POST, "/filter").with_form(&[("tag", "4")]);
    let filter: Filter = populate(&req, &[]).unwrap();
    assert_eq!(filter.page, 1);
    assert!(!filter.page_given);

    let req = HttpRequest::new(Method::POST, "/filter").with_form(&[("page", "3")]);
    let filter: Filter = populate(&req, &[]).unwrap();
    assert_eq!(filter.page, 3);
    assert!(filter.page_given);

    // Absent from the form, present in the query.
    let req = HttpRequest::new(Method::POST, "/filter?page=7").with_form(&[("tag", "4")]);
    let filter: Filter = populate(&req, &[]).unwrap();
    assert_eq!(filter.page, 7);
    assert!(filter.page_given);
}

#[test]
fn test_repeated_form_values_fill_vec_field() {
    let req = HttpRequest::new(Method::POST, "/filter")
        .with_form(&[("tag", "1"), ("page", "2"), ("tag", "2")]);
    let filter: Filter = populate(&req, &[]).unwrap();
    assert_eq!(filter.tag, [1, 2]);
    assert_eq!(filter.page, 2);

    let req = HttpRequest::new(Method::POST, "/filter?tag=9").with_form(&[("page", "2")]);
    let filter: Filter = populate(&req, &[]).unwrap();
    assert_eq!(filter.tag, [9]);
}
