use serde_json::Value;
use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::hooks::HookSet;
use crate::signature::{CallingConvention, Signature};

/// One assembled argument, in the order the callable declared it.
pub enum Argument<'a> {
    Context(&'a Context),
    Data(Box<dyn Any + Send>),
}

impl fmt::Debug for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Context(_) => f.write_str("Context"),
            Argument::Data(_) => f.write_str("Data"),
        }
    }
}

/// One value produced by a callable. `None` is the nil value.
#[derive(Debug)]
pub enum ReturnValue {
    Error(Option<anyhow::Error>),
    Data(Option<Value>),
}

/// Arguments handed to an invocation; never more than two.
pub type Arguments<'a> = SmallVec<[Argument<'a>; 2]>;

/// Values returned by an invocation, in declared order.
pub type Returns = SmallVec<[ReturnValue; 2]>;

/// A fault in the invocation machinery itself, as opposed to an error the
/// handler chose to return. Rendered as `500`.
#[derive(Debug)]
pub enum InvokeError {
    /// An argument did not have the kind or type the callable expects.
    ArgumentMismatch { expected: &'static str },
    /// The number of arguments differs from the declared arity.
    Arity { expected: usize, actual: usize },
    /// Returned data could not be turned into JSON.
    Serialize(serde_json::Error),
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::ArgumentMismatch { expected } => {
                write!(f, "argument mismatch: expected {expected}")
            }
            InvokeError::Arity { expected, actual } => {
                write!(f, "expected {expected} arguments, got {actual}")
            }
            InvokeError::Serialize(e) => write!(f, "failed to serialize handler data: {e}"),
        }
    }
}

impl std::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvokeError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for InvokeError {
    fn from(e: serde_json::Error) -> Self {
        InvokeError::Serialize(e)
    }
}

/// A callable bound to its receiver, ready to be invoked per request.
pub trait Invoke: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`InvokeError`] when the arguments do not fit the callable
    /// or its data cannot be serialized.
    fn invoke(&self, args: Arguments<'_>) -> Result<Returns, InvokeError>;
}

/// Bound callable plus everything the dispatcher needs to drive it.
///
/// Built once at registration and immutable afterwards.
pub struct HandlerRecord {
    name: String,
    invoker: Arc<dyn Invoke>,
    signature: Signature,
    convention: CallingConvention,
    hooks: HookSet,
}

impl HandlerRecord {
    pub fn new(
        name: impl Into<String>,
        invoker: Arc<dyn Invoke>,
        signature: Signature,
        convention: CallingConvention,
        hooks: HookSet,
    ) -> Self {
        Self {
            name: name.into(),
            invoker,
            signature,
            convention,
            hooks,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[must_use]
    pub fn convention(&self) -> CallingConvention {
        self.convention
    }

    #[must_use]
    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    /// Invoke the callable with already assembled arguments.
    ///
    /// # Errors
    ///
    /// See [`Invoke::invoke`].
    pub fn invoke(&self, args: Arguments<'_>) -> Result<Returns, InvokeError> {
        self.invoker.invoke(args)
    }
}

impl fmt::Debug for HandlerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRecord")
            .field("name", &self.name)
            .field("convention", &self.convention.to_string())
            .field("hooks", &self.hooks)
            .finish()
    }
}
