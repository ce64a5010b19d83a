//! Router core module - hot path for request routing.
//!
//! Wraps a [`RouteTrie`] of handler records behind method-qualified keys.
//! A request `GET /user/42/info` is looked up as `get/user/42/info`.

use http::Method;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::trie::{CapturedArgs, RouteTrie, RouterError, DEFAULT_WILDCARD};
use crate::handler::HandlerRecord;

/// Result of successfully matching a request to a registered handler.
#[derive(Clone)]
pub struct RouteMatch {
    /// The matched handler record (shared, immutable)
    pub record: Arc<HandlerRecord>,
    /// Segments captured by wildcard positions, left to right
    pub args: CapturedArgs,
    /// The normalized key the request was looked up under
    pub key: String,
}

impl RouteMatch {
    /// Captured segment at `index`, counted from the left.
    #[inline]
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

impl std::fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("handler", &self.record.name())
            .field("args", &self.args)
            .field("key", &self.key)
            .finish()
    }
}

/// Normalize a method and request path into a route key.
///
/// The method is lowercased and prefixed, any query string is dropped, and
/// empty segments are collapsed so trailing slashes never matter:
/// `GET /user/42/` and `GET /user/42` both become `get/user/42`, and the
/// root path becomes the bare method.
#[must_use]
pub fn route_key(method: &Method, path: &str) -> String {
    let path = path.split('?').next().unwrap_or_default();
    let mut key = String::with_capacity(method.as_str().len() + path.len() + 1);
    key.push_str(&method.as_str().to_ascii_lowercase());
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        key.push('/');
        key.push_str(segment);
    }
    key
}

/// Method-aware router over a concurrent segment trie.
///
/// Cheap to share: wrap it in an `Arc` and hand the same instance to the
/// [`Registry`](crate::registry::Registry) that fills it and the
/// [`Dispatcher`](crate::dispatcher::Dispatcher) that reads it.
#[derive(Debug)]
pub struct Router {
    trie: RouteTrie<Arc<HandlerRecord>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(DEFAULT_WILDCARD)
    }
}

impl Router {
    /// Create an empty router using `wildcard` as the dynamic segment token.
    pub fn new(wildcard: impl Into<String>) -> Self {
        Self {
            trie: RouteTrie::new(wildcard),
        }
    }

    #[must_use]
    pub fn wildcard(&self) -> &str {
        self.trie.wildcard()
    }

    /// Register `record` under an already normalized key.
    ///
    /// Returns the record previously stored under the key, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidKey`] for an empty key.
    pub fn add(
        &self,
        key: &str,
        record: Arc<HandlerRecord>,
    ) -> Result<Option<Arc<HandlerRecord>>, RouterError> {
        let dynamic = self.trie.is_dynamic(key);
        let previous = self.trie.add(key, record)?;
        debug!(
            key = %key,
            dynamic = dynamic,
            overwritten = previous.is_some(),
            "Route registered"
        );
        Ok(previous)
    }

    /// Remove the route stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidKey`] for an empty key.
    pub fn remove(&self, key: &str) -> Result<Option<Arc<HandlerRecord>>, RouterError> {
        let removed = self.trie.remove(key)?;
        info!(key = %key, removed = removed.is_some(), "Route removed");
        Ok(removed)
    }

    /// Match an HTTP request to a handler record.
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - the record plus wildcard captures
    /// * `None` - no route matches (results in 404)
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let key = route_key(method, path);

        debug!(
            method = %method,
            path = %path,
            key = %key,
            "Route match attempt"
        );

        let match_start = Instant::now();
        let result = self.trie.get_and_args(&key);
        let match_duration = match_start.elapsed();

        if let Some((record, args)) = result {
            if match_duration > Duration::from_millis(1) {
                warn!(
                    method = %method,
                    path = %path,
                    handler = %record.name(),
                    args = ?args,
                    duration_us = match_duration.as_micros(),
                    "Slow route matching detected"
                );
            } else {
                info!(
                    method = %method,
                    path = %path,
                    handler = %record.name(),
                    args = ?args,
                    duration_us = match_duration.as_micros(),
                    "Route matched"
                );
            }
            return Some(RouteMatch { record, args, key });
        }

        warn!(
            method = %method,
            path = %path,
            duration_us = match_duration.as_micros(),
            "No route matched"
        );
        None
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.trie.contains(key)
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.trie.starts_with(prefix)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    pub fn clear(&self) {
        self.trie.clear();
        info!("Routing table cleared");
    }

    /// Registered keys paired with their handler names, for listing.
    #[must_use]
    pub fn routes(&self) -> Vec<(String, String)> {
        self.trie
            .keys()
            .into_iter()
            .filter_map(|key| {
                let record = self.trie.get(&key)?;
                Some((key, record.name().to_string()))
            })
            .collect()
    }
}
