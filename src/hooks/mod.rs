//! # Hooks Module
//!
//! Callbacks that run around a handler invocation.
//!
//! | Hook               | Signature                                  | Runs                          |
//! |--------------------|--------------------------------------------|-------------------------------|
//! | context init       | `Fn(&Context)`                             | after the context is built    |
//! | pre-execute        | `Fn(&Context) -> anyhow::Result<()>`       | before parameters are parsed  |
//! | post-params-parse  | `Fn(&dyn Any) -> anyhow::Result<()>`       | after the data parameter is populated |
//! | post-method-execute| `Fn(Value) -> anyhow::Result<Value>`       | on data from `(data, error)` handlers |
//!
//! Context-init hooks belong to the
//! [`Dispatcher`](crate::dispatcher::Dispatcher). The other three live in a
//! [`HookSet`] attached to each handler record: a controller's own hooks
//! first, then the registry's global hooks.
//!
//! A failing hook aborts the request. An error carrying a
//! [`StatusError`](crate::handler::StatusError) is rendered with that
//! status, anything else as `500`.
//!
//! ```rust
//! use jetrouter::hooks::{self, HookSet};
//!
//! let hooks = HookSet::new()
//!     .pre_execute(|ctx| {
//!         if ctx.header("authorization").is_none() {
//!             anyhow::bail!("missing credentials");
//!         }
//!         Ok(())
//!     })
//!     .post_execute(hooks::rest_json());
//! assert!(hooks.has_post_execute());
//! ```

mod builtin;
mod core;

pub use self::core::{ContextInitHook, HookSet, PostExecuteHook, PostParseHook, PreExecuteHook};
pub use builtin::{field_errors, rest_json, validate, FieldError};
pub use validator::Validate;
