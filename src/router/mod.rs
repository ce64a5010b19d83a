//! # Router Module
//!
//! The router module maps a request's method and path to a registered
//! [`HandlerRecord`](crate::handler::HandlerRecord) and extracts the path
//! segments that matched wildcard positions.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Storing route keys in a concurrent segment trie with a static fast path
//! - Matching incoming requests, preferring literal segments over wildcards
//! - Returning captured wildcard segments by value, per request
//! - Deriving route keys from handler names ([`NameStrategy`])
//!
//! ## Route Keys
//!
//! Keys are the lowercased method followed by the path segments:
//!
//! | Request / registration      | Key               |
//! |-----------------------------|-------------------|
//! | `GET /user/42/info`         | `get/user/42/info`|
//! | handler `GetUser_Info`      | `get/user/*/info` |
//! | `Endpoint::route(GET, "/user/{id}")` | `get/user/*` |
//!
//! ## Example
//!
//! ```rust
//! use jetrouter::router::RouteTrie;
//!
//! let trie = RouteTrie::default();
//! trie.add("get/user/*/info", "user_info").unwrap();
//!
//! let (value, args) = trie.get_and_args("get/user/42/info").unwrap();
//! assert_eq!(value, "user_info");
//! assert_eq!(args.as_slice(), ["42".to_string()]);
//! ```
//!
//! ## Performance
//!
//! - Static keys: a single hash probe
//! - Dynamic keys: O(k) in the number of segments, no backtracking
//! - Captured args are stack-allocated for up to 8 wildcards

mod core;
mod naming;
#[cfg(test)]
mod tests;
mod trie;

pub use self::core::{route_key, RouteMatch, Router};
pub use naming::{
    key_for, prefix_of, split_camel_case, CamelCaseNames, NameStrategy, NamingError,
    RouteDescriptor, DEFAULT_NAME_MARKER, SUPPORTED_VERBS,
};
pub use trie::{CapturedArgs, RouteTrie, RouterError, DEFAULT_WILDCARD, MAX_INLINE_ARGS};
