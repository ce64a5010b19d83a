//! # Handler Module
//!
//! Turns controller methods into handler records the router can store and
//! the dispatcher can drive.
//!
//! ## Overview
//!
//! A controller lists its [`Endpoint`]s. Each endpoint wraps a plain Rust
//! function through [`IntoCallable`], which derives the declared
//! [`Signature`](crate::signature::Signature) from the function shape:
//!
//! ```rust
//! use jetrouter::context::Context;
//! use jetrouter::handler::{Endpoint, ErrorFirst};
//! use std::collections::HashMap;
//!
//! struct Users;
//!
//! impl Users {
//!     fn get_user(&self, ctx: &Context, query: HashMap<String, String>) -> anyhow::Result<String> {
//!         Ok(format!("{} {:?}", ctx.request().path(), query.get("id")))
//!     }
//!
//!     fn get_health(&self) -> ErrorFirst<&'static str> {
//!         ErrorFirst::ok("ok")
//!     }
//! }
//!
//! let endpoints: Vec<Endpoint<Users>> = vec![
//!     Endpoint::named("GetUser", Users::get_user),
//!     Endpoint::named("GetHealth", Users::get_health),
//! ];
//! assert_eq!(endpoints.len(), 2);
//! ```
//!
//! Return types map to return shapes through [`IntoReturn`]. Shapes the
//! typed adapters cannot express go through [`RawMethod`], which carries an
//! explicitly declared signature.
//!
//! At registration an endpoint is classified and bound to its controller,
//! producing an immutable [`HandlerRecord`] shared via `Arc`.

mod adapt;
mod core;
mod status;

pub use adapt::{
    CtxArg, CtxData, Data, DataArg, DataCtx, Endpoint, ErrorFirst, IntoCallable, IntoReturn,
    NoArgs, RawMethod,
};
pub use self::core::{Argument, Arguments, HandlerRecord, Invoke, InvokeError, ReturnValue, Returns};
pub use status::StatusError;
