//! # Parameter Population
//!
//! Turns an incoming request plus the wildcard captures of its route into
//! the typed data argument a handler declared.
//!
//! ## Binding Rules
//!
//! [`populate`] follows a fixed order:
//!
//! 1. **Positional args** - captured wildcard segments fill the field marked
//!    `#[param(args)]`. If that is the struct's only field, binding stops.
//! 2. **JSON** (`application/json`) - the body is decoded with serde. An
//!    empty body leaves the defaults in place.
//! 3. **Form** (`application/x-www-form-urlencoded`, `multipart/form-data`) -
//!    each field binds from form values, falling back to the query string.
//! 4. **Anything else** - each field binds from the query string.
//!
//! For query and form binding, a field with no value is reset to its type's
//! default unless it is marked `#[param(default)]`, in which case the value
//! from the struct's `Default` impl is kept. Sequence fields collect every
//! repeated value.
//!
//! ## Deriving
//!
//! ```rust
//! use jetrouter::params::{populate, RequestParams};
//! use jetrouter::server::HttpRequest;
//! use http::Method;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize, RequestParams)]
//! #[serde(default)]
//! struct Search {
//!     #[param(name = "q")]
//!     query: String,
//!     #[param(has)]
//!     page: u32,
//!     #[serde(skip)]
//!     has_page: bool,
//!     tags: Vec<String>,
//! }
//!
//! let req = HttpRequest::new(Method::GET, "/search?q=rust&tags=a&tags=b");
//! let search: Search = populate(&req, &[]).unwrap();
//! assert_eq!(search.query, "rust");
//! assert!(!search.has_page);
//! assert_eq!(search.tags, ["a", "b"]);
//! ```
//!
//! ### Field attributes
//!
//! | Attribute                  | Effect                                           |
//! |----------------------------|--------------------------------------------------|
//! | `#[param(args)]`           | receives wildcard captures (`Vec<String>`)      |
//! | `#[param(name = "x")]`     | binds from `x` instead of the field name         |
//! | `#[param(has)]`            | sets `has_<field>` to whether a value was present|
//! | `#[param(has = "flag")]`   | same, with an explicit companion field           |
//! | `#[param(default)]`        | keeps the `Default` value when absent            |
//! | `#[param(flatten)]`        | binds a nested `RequestParams` struct            |
//! | `#[param(skip)]`           | never bound from the query or form              |

mod core;
mod source;
mod value;

pub use self::core::{bind_field, populate, populate_boxed, ParseError, RequestParams};
pub use jetrouter_macros::RequestParams;
pub use source::{FormSource, QuerySource, ValueSource};
pub use value::{ParamValue, ValueError};
