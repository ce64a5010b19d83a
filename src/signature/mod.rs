//! # Signature Module
//!
//! Registration-time classification of handler callables into a closed set
//! of calling conventions.
//!
//! ## Overview
//!
//! A callable declares an ordered parameter list and an ordered return
//! list ([`Signature`]). [`classify`] maps that declaration onto one
//! [`ParamShape`] and one [`ReturnShape`]; anything outside the accepted
//! shapes is rejected with a [`SignatureError`] and the endpoint is skipped.
//!
//! | Parameters         | Returns            |
//! |--------------------|--------------------|
//! | `()`               | `()`               |
//! | `(ctx)`            | `(error)`          |
//! | `(data)`           | `(data)`           |
//! | `(ctx, data)`      | `(error, data)`    |
//! | `(data, ctx)`      | `(data, error)`    |
//!
//! Typed handlers get their signature derived from the Rust function shape
//! (see [`handler`](crate::handler)); [`RawMethod`](crate::handler::RawMethod)
//! lets an author declare one explicitly.
//!
//! The convention is computed once and cached on the
//! [`HandlerRecord`](crate::handler::HandlerRecord); the dispatcher never
//! inspects types per request.

mod core;

pub use self::core::{
    classify, CallingConvention, DataType, ParamKind, ParamShape, PopulateFn, ReturnKind,
    ReturnShape, Signature, SignatureError, MAX_PARAMS, MAX_RETURNS,
};
