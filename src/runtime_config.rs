//! # Runtime Configuration Module
//!
//! Environment-driven settings read once at startup.
//!
//! ## Environment Variables
//!
//! ### `JET_STACK_SIZE`
//!
//! Stack size for request coroutines. Accepts decimal (`65536`) or
//! hexadecimal (`0x10000`). Default: `0x10000` (64 KB).
//!
//! ### `JET_WILDCARD`
//!
//! The path segment that marks a dynamic position in route keys.
//! Default: `*`.
//!
//! ### `JET_NAME_MARKER`
//!
//! The character sequence in handler names that stands for a path
//! parameter, as in `GetUser_Info`. Default: `_`.
//!
//! ### `JET_ADDR`
//!
//! Listen address. Default: `0.0.0.0:8080`.
//!
//! ## Usage
//!
//! ```rust
//! use jetrouter::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use std::env;

use crate::router::{DEFAULT_NAME_MARKER, DEFAULT_WILDCARD};

pub const DEFAULT_STACK_SIZE: usize = 0x10000;
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Coroutine stack size in bytes
    pub stack_size: usize,
    /// Dynamic segment token
    pub wildcard: String,
    /// Path parameter marker in handler names
    pub name_marker: String,
    pub addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            wildcard: DEFAULT_WILDCARD.to_string(),
            name_marker: DEFAULT_NAME_MARKER.to_string(),
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

/// Parse a size given in decimal or `0x` hexadecimal.
#[must_use]
pub fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl RuntimeConfig {
    /// Load configuration from environment variables. Unset, empty or
    /// unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            stack_size: non_empty("JET_STACK_SIZE")
                .and_then(|v| parse_size(&v))
                .unwrap_or(defaults.stack_size),
            wildcard: non_empty("JET_WILDCARD").unwrap_or(defaults.wildcard),
            name_marker: non_empty("JET_NAME_MARKER").unwrap_or(defaults.name_marker),
            addr: non_empty("JET_ADDR").unwrap_or(defaults.addr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("0x4000"), Some(0x4000));
        assert_eq!(parse_size("0X10"), Some(16));
        assert_eq!(parse_size(" 32768 "), Some(32768));
        assert_eq!(parse_size("lots"), None);
        assert_eq!(parse_size("0xzz"), None);
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.stack_size, 0x10000);
        assert_eq!(config.wildcard, "*");
        assert_eq!(config.name_marker, "_");
        assert_eq!(config.addr, "0.0.0.0:8080");
    }
}
