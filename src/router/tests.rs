use super::route_key;
use http::Method;

#[test]
fn test_route_key_lowercases_method() {
    assert_eq!(route_key(&Method::GET, "/user/info"), "get/user/info");
    assert_eq!(route_key(&Method::DELETE, "/item/3"), "delete/item/3");
}

#[test]
fn test_route_key_trims_trailing_slash_and_query() {
    assert_eq!(route_key(&Method::GET, "/user/42/"), "get/user/42");
    assert_eq!(route_key(&Method::GET, "/echo?name=neo"), "get/echo");
    assert_eq!(route_key(&Method::GET, "/"), "get");
}
