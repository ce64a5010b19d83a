//! Segment trie backing the router.
//!
//! Keys are `/`-separated segment sequences such as `get/user/*/info`. A key
//! that contains the wildcard token as one of its segments is *dynamic* and
//! is stored in the trie; every other key is *static* and lives in an
//! exact-match map that is probed before the trie is walked.
//!
//! ## Matching
//!
//! Lookups descend one segment at a time. At each level the literal child
//! wins; only when no literal child exists is the wildcard child taken, and
//! the request segment it consumed is captured. There is no backtracking: a
//! miss at any level is a miss for the whole path.
//!
//! ## Concurrency
//!
//! All state sits behind a single `parking_lot::RwLock`. Lookups share the
//! read lock and never touch node state; captured segments are accumulated
//! in a call-local [`CapturedArgs`] and returned by value.
//!
//! ## Removal
//!
//! Removing a dynamic key clears the terminal node's value. A node left with
//! neither a value nor children is pruned, and the pruning walks back up
//! through ancestors that become empty as a result. Cleared nodes that still
//! have children stay in the tree and are treated as misses.

use parking_lot::RwLock;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// Wildcard segments captured before spilling to the heap.
pub const MAX_INLINE_ARGS: usize = 8;

/// Request segments consumed by wildcard nodes, left to right.
pub type CapturedArgs = SmallVec<[String; MAX_INLINE_ARGS]>;

/// Default wildcard segment token.
pub const DEFAULT_WILDCARD: &str = "*";

/// Errors raised by trie mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The key is empty or consists only of separators.
    InvalidKey(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::InvalidKey(key) => write!(f, "invalid route key {key:?}"),
        }
    }
}

impl std::error::Error for RouterError {}

struct TrieNode<V> {
    children: HashMap<String, TrieNode<V>>,
    /// `Some` exactly when this node terminates a registered key.
    value: Option<V>,
}

impl<V> Default for TrieNode<V> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            value: None,
        }
    }
}

impl<V> TrieNode<V> {
    fn is_end(&self) -> bool {
        self.value.is_some()
    }

    fn is_prunable(&self) -> bool {
        !self.is_end() && self.children.is_empty()
    }

    /// Literal child first, wildcard child second.
    fn step<'a>(&'a self, segment: &str, wildcard: &str) -> Option<(&'a TrieNode<V>, bool)> {
        if let Some(child) = self.children.get(segment) {
            return Some((child, false));
        }
        self.children.get(wildcard).map(|child| (child, true))
    }

    fn walk<'a>(
        &'a self,
        segments: &[&str],
        wildcard: &str,
        mut args: Option<&mut CapturedArgs>,
    ) -> Option<&'a TrieNode<V>> {
        let mut node = self;
        for segment in segments {
            let (child, captured) = node.step(segment, wildcard)?;
            if captured {
                if let Some(args) = args.as_deref_mut() {
                    args.push((*segment).to_string());
                }
            }
            node = child;
        }
        Some(node)
    }

    fn remove(&mut self, segments: &[&str], wildcard: &str) -> Option<V> {
        let Some((head, rest)) = segments.split_first() else {
            return self.value.take();
        };
        let key = if self.children.contains_key(*head) {
            *head
        } else {
            wildcard
        };
        let child = self.children.get_mut(key)?;
        let removed = child.remove(rest, wildcard);
        if removed.is_some() && child.is_prunable() {
            self.children.remove(key);
        }
        removed
    }

    fn collect_keys(&self, prefix: &mut Vec<String>, out: &mut Vec<String>) {
        if self.is_end() {
            out.push(prefix.join("/"));
        }
        for (segment, child) in &self.children {
            prefix.push(segment.clone());
            child.collect_keys(prefix, out);
            prefix.pop();
        }
    }
}

struct TrieState<V> {
    root: TrieNode<V>,
    statics: HashMap<String, V>,
    size: usize,
}

impl<V> Default for TrieState<V> {
    fn default() -> Self {
        Self {
            root: TrieNode::default(),
            statics: HashMap::new(),
            size: 0,
        }
    }
}

/// Concurrent, mutable route table with static fast path and wildcard capture.
pub struct RouteTrie<V> {
    wildcard: String,
    state: RwLock<TrieState<V>>,
}

impl<V> Default for RouteTrie<V> {
    fn default() -> Self {
        Self::new(DEFAULT_WILDCARD)
    }
}

impl<V> fmt::Debug for RouteTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTrie")
            .field("wildcard", &self.wildcard)
            .field("size", &self.len())
            .finish()
    }
}

fn split_segments(path: &str) -> SmallVec<[&str; 16]> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn check_key(path: &str) -> Result<(), RouterError> {
    if path.split('/').all(str::is_empty) {
        return Err(RouterError::InvalidKey(path.to_string()));
    }
    Ok(())
}

impl<V> RouteTrie<V> {
    /// Create an empty trie using `wildcard` as the dynamic segment token.
    pub fn new(wildcard: impl Into<String>) -> Self {
        Self {
            wildcard: wildcard.into(),
            state: RwLock::new(TrieState::default()),
        }
    }

    #[must_use]
    pub fn wildcard(&self) -> &str {
        &self.wildcard
    }

    /// Whether `path` would be stored in the trie rather than the static map.
    #[must_use]
    pub fn is_dynamic(&self, path: &str) -> bool {
        path.split('/').any(|s| s == self.wildcard)
    }

    /// Insert or overwrite `path`, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidKey`] for an empty key.
    pub fn add(&self, path: &str, value: V) -> Result<Option<V>, RouterError> {
        check_key(path)?;
        let mut guard = self.state.write();
        let state = &mut *guard;

        let previous = if self.is_dynamic(path) {
            let mut node = &mut state.root;
            for segment in split_segments(path) {
                node = node.children.entry(segment.to_string()).or_default();
            }
            node.value.replace(value)
        } else {
            state.statics.insert(path.to_string(), value)
        };

        if previous.is_none() {
            state.size += 1;
        }
        Ok(previous)
    }

    /// Remove `path`, returning the value it held.
    ///
    /// Static keys are deleted from the exact-match map. Otherwise the
    /// terminal node reached by the normal lookup walk is cleared, so both a
    /// registered pattern (`get/user/*`) and a concrete path it matches
    /// (`get/user/42`) locate the same node.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidKey`] for an empty key.
    pub fn remove(&self, path: &str) -> Result<Option<V>, RouterError> {
        check_key(path)?;
        let mut guard = self.state.write();
        let state = &mut *guard;

        if let Some(previous) = state.statics.remove(path) {
            state.size -= 1;
            return Ok(Some(previous));
        }

        let removed = state.root.remove(&split_segments(path), &self.wildcard);
        if removed.is_some() {
            state.size -= 1;
        }
        Ok(removed)
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every key.
    pub fn clear(&self) {
        let mut state = self.state.write();
        *state = TrieState::default();
    }

    /// Whether `path` resolves to a registered key.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let state = self.state.read();
        if state.statics.contains_key(path) {
            return true;
        }
        state
            .root
            .walk(&split_segments(path), &self.wildcard, None)
            .is_some_and(TrieNode::is_end)
    }

    /// Whether any registered key continues `prefix` at a segment boundary.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        let segments = split_segments(prefix);
        if segments.is_empty() {
            return false;
        }
        let state = self.state.read();
        let static_hit = state.statics.keys().any(|key| {
            let key_segments = split_segments(key);
            key_segments.len() >= segments.len() && key_segments[..segments.len()] == segments[..]
        });
        static_hit
            || state
                .root
                .walk(&segments, &self.wildcard, None)
                .is_some()
    }
}

impl<V: Clone> RouteTrie<V> {
    /// Resolve `path` to its value.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<V> {
        self.get_and_args(path).map(|(value, _)| value)
    }

    /// Resolve `path` to its value plus the segments consumed by wildcards.
    ///
    /// The static map is probed first and a static hit carries no args. An
    /// empty path is a miss.
    #[must_use]
    pub fn get_and_args(&self, path: &str) -> Option<(V, CapturedArgs)> {
        if path.is_empty() {
            return None;
        }
        let state = self.state.read();
        if let Some(value) = state.statics.get(path) {
            return Some((value.clone(), CapturedArgs::new()));
        }

        let mut args = CapturedArgs::new();
        let node = state
            .root
            .walk(&split_segments(path), &self.wildcard, Some(&mut args))?;
        node.value.clone().map(|value| (value, args))
    }

    /// Every registered key, static keys first, sorted within each group.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let state = self.state.read();
        let mut statics: Vec<String> = state.statics.keys().cloned().collect();
        statics.sort();
        let mut dynamics = Vec::new();
        state.root.collect_keys(&mut Vec::new(), &mut dynamics);
        dynamics.sort();
        statics.extend(dynamics);
        statics
    }
}
