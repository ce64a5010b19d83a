//! Route derivation from handler names.
//!
//! The default [`CamelCaseNames`] strategy turns an exported handler name
//! into a route key: the leading capitalized word is the HTTP verb, every
//! following capitalized word is a path segment, and each occurrence of the
//! name marker (`_` by default) becomes the wildcard segment.
//!
//! | Name              | Key                     |
//! |-------------------|-------------------------|
//! | `GetUser`         | `get/user`              |
//! | `GetUser_Info`    | `get/user/*/info`       |
//! | `PostOrder_Item_` | `post/order/*/item/*`   |

use http::Method;
use std::fmt;

use super::trie::DEFAULT_WILDCARD;

/// Default marker inside handler names that stands for a wildcard segment.
pub const DEFAULT_NAME_MARKER: &str = "_";

/// Verbs a handler name may start with.
pub const SUPPORTED_VERBS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
];

/// Why a handler name could not be turned into a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    /// The name has no leading capitalized word followed by more text.
    MissingPrefix(String),
    /// The leading word is not a supported HTTP verb.
    UnsupportedVerb(String),
}

impl fmt::Display for NamingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingError::MissingPrefix(name) => {
                write!(f, "handler name {name:?} has no verb prefix")
            }
            NamingError::UnsupportedVerb(verb) => write!(f, "unsupported verb prefix {verb:?}"),
        }
    }
}

impl std::error::Error for NamingError {}

/// Leading capitalized word of `name`.
///
/// Returns `None` unless the name starts with an uppercase letter and the
/// run of lowercase letters after it is followed by something else:
/// `GetUser` yields `Get`, while `Get` and `getUser` yield nothing.
#[must_use]
pub fn prefix_of(name: &str) -> Option<&str> {
    let mut chars = name.char_indices();
    let (_, first) = chars.next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    chars
        .find(|(_, c)| !c.is_ascii_lowercase())
        .map(|(index, _)| &name[..index])
}

fn push_camel_words(out: &mut Vec<String>, chunk: &str) {
    let mut start = 0;
    for (index, c) in chunk.char_indices().skip(1) {
        if c.is_ascii_uppercase() {
            out.push(chunk[start..index].to_string());
            start = index;
        }
    }
    out.push(chunk[start..].to_string());
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split a camel-case handler name into route words.
///
/// Occurrences of `marker` are kept verbatim as their own entries; every
/// other word has its first letter lowercased.
///
/// ```
/// use jetrouter::router::split_camel_case;
///
/// assert_eq!(split_camel_case("GetUser_Info", "_"), ["get", "user", "_", "info"]);
/// ```
#[must_use]
pub fn split_camel_case(name: &str, marker: &str) -> Vec<String> {
    let mut words = Vec::new();
    if marker.is_empty() {
        push_camel_words(&mut words, name);
    } else {
        let mut rest = name;
        while !rest.is_empty() {
            match rest.find(marker) {
                None => {
                    push_camel_words(&mut words, rest);
                    break;
                }
                Some(pos) => {
                    if pos > 0 {
                        push_camel_words(&mut words, &rest[..pos]);
                    }
                    words.push(marker.to_string());
                    rest = &rest[pos + marker.len()..];
                }
            }
        }
    }
    words
        .into_iter()
        .map(|word| {
            if word == marker {
                word
            } else {
                lower_first(&word)
            }
        })
        .collect()
}

/// Build the router key for an explicit method and path.
///
/// Path parameters written as `{name}` or `:name` are mapped to the
/// wildcard token so that `GET /user/{id}` becomes `get/user/*`.
#[must_use]
pub fn key_for(method: &Method, path: &str, wildcard: &str) -> String {
    let mut key = method.as_str().to_ascii_lowercase();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        key.push('/');
        let is_param =
            (segment.starts_with('{') && segment.ends_with('}')) || segment.starts_with(':');
        if is_param {
            key.push_str(wildcard);
        } else {
            key.push_str(segment);
        }
    }
    key
}

/// Explicit route for an endpoint that should not be derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub method: Method,
    pub path: String,
}

impl RouteDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

/// Maps a handler name to its router key.
pub trait NameStrategy: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`NamingError`] when the name cannot be routed.
    fn route_key(&self, name: &str) -> Result<String, NamingError>;
}

/// Verb-prefixed camel-case naming (`GetUser_Info` to `get/user/*/info`).
#[derive(Debug, Clone)]
pub struct CamelCaseNames {
    marker: String,
    wildcard: String,
}

impl Default for CamelCaseNames {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_MARKER, DEFAULT_WILDCARD)
    }
}

impl CamelCaseNames {
    pub fn new(marker: impl Into<String>, wildcard: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            wildcard: wildcard.into(),
        }
    }
}

impl NameStrategy for CamelCaseNames {
    fn route_key(&self, name: &str) -> Result<String, NamingError> {
        let prefix = prefix_of(name).ok_or_else(|| NamingError::MissingPrefix(name.to_string()))?;
        let verb = prefix.to_ascii_uppercase();
        if !SUPPORTED_VERBS.iter().any(|m| m.as_str() == verb) {
            return Err(NamingError::UnsupportedVerb(prefix.to_string()));
        }
        let words: Vec<String> = split_camel_case(name, &self.marker)
            .into_iter()
            .map(|word| {
                if word == self.marker {
                    self.wildcard.clone()
                } else {
                    word
                }
            })
            .collect();
        Ok(words.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_of() {
        assert_eq!(prefix_of("GetUser"), Some("Get"));
        assert_eq!(prefix_of("Get_User"), Some("Get"));
        assert_eq!(prefix_of("Get"), None);
        assert_eq!(prefix_of("getUser"), None);
        assert_eq!(prefix_of(""), None);
    }

    #[test]
    fn test_split_camel_case_with_marker() {
        assert_eq!(
            split_camel_case("Apple_Banana", "_"),
            vec!["apple", "_", "banana"]
        );
        assert_eq!(
            split_camel_case("GetUserInfo_", "_"),
            vec!["get", "user", "info", "_"]
        );
    }

    #[test]
    fn test_camel_case_route_key() {
        let names = CamelCaseNames::default();
        assert_eq!(names.route_key("GetUser").unwrap(), "get/user");
        assert_eq!(names.route_key("GetUser_Info").unwrap(), "get/user/*/info");
        assert_eq!(
            names.route_key("PostOrder_Item_").unwrap(),
            "post/order/*/item/*"
        );
    }

    #[test]
    fn test_camel_case_rejects_unknown_verb() {
        let names = CamelCaseNames::default();
        assert_eq!(
            names.route_key("FetchUser"),
            Err(NamingError::UnsupportedVerb("Fetch".to_string()))
        );
        assert_eq!(
            names.route_key("Get"),
            Err(NamingError::MissingPrefix("Get".to_string()))
        );
    }

    #[test]
    fn test_key_for_explicit_paths() {
        assert_eq!(key_for(&Method::GET, "/user/{id}/info", "*"), "get/user/*/info");
        assert_eq!(key_for(&Method::DELETE, "/item/:id", "*"), "delete/item/*");
        assert_eq!(key_for(&Method::POST, "/", "*"), "post");
    }
}
