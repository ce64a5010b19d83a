use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::core::{Argument, Arguments, HandlerRecord, Invoke, InvokeError, ReturnValue, Returns};
use crate::context::Context;
use crate::hooks::HookSet;
use crate::params::RequestParams;
use crate::router::RouteDescriptor;
use crate::signature::{classify, DataType, ParamKind, ReturnKind, Signature, SignatureError};

type CallFn<C> = Arc<dyn Fn(&C, Arguments<'_>) -> Result<Returns, InvokeError> + Send + Sync>;

fn to_data<T: Serialize>(value: T) -> Result<Option<Value>, InvokeError> {
    match serde_json::to_value(value)? {
        Value::Null => Ok(None),
        v => Ok(Some(v)),
    }
}

/// Converts a handler's return value into the values the dispatcher renders.
///
/// | Rust return                   | Declared returns |
/// |-------------------------------|------------------|
/// | `()`                          | none             |
/// | `Option<anyhow::Error>`       | error            |
/// | `Data<T>`, `Value`, `String`  | data             |
/// | `ErrorFirst<T>`               | error, data      |
/// | `Result<T, E>`                | data, error      |
///
/// Data serializing to JSON `null` counts as nil.
pub trait IntoReturn {
    fn return_kinds() -> &'static [ReturnKind];

    /// # Errors
    ///
    /// Returns [`InvokeError::Serialize`] when the data is not JSON-serializable.
    fn into_returns(self) -> Result<Returns, InvokeError>;
}

impl IntoReturn for () {
    fn return_kinds() -> &'static [ReturnKind] {
        &[]
    }

    fn into_returns(self) -> Result<Returns, InvokeError> {
        Ok(Returns::new())
    }
}

impl IntoReturn for Option<anyhow::Error> {
    fn return_kinds() -> &'static [ReturnKind] {
        &[ReturnKind::Error]
    }

    fn into_returns(self) -> Result<Returns, InvokeError> {
        Ok(smallvec::smallvec![ReturnValue::Error(self)])
    }
}

/// Data-only return for any serializable value.
#[derive(Debug, Clone, PartialEq)]
pub struct Data<T>(pub T);

impl<T: Serialize> IntoReturn for Data<T> {
    fn return_kinds() -> &'static [ReturnKind] {
        &[ReturnKind::Data]
    }

    fn into_returns(self) -> Result<Returns, InvokeError> {
        Ok(smallvec::smallvec![ReturnValue::Data(to_data(self.0)?)])
    }
}

impl IntoReturn for Value {
    fn return_kinds() -> &'static [ReturnKind] {
        &[ReturnKind::Data]
    }

    fn into_returns(self) -> Result<Returns, InvokeError> {
        Data(self).into_returns()
    }
}

impl IntoReturn for String {
    fn return_kinds() -> &'static [ReturnKind] {
        &[ReturnKind::Data]
    }

    fn into_returns(self) -> Result<Returns, InvokeError> {
        Data(self).into_returns()
    }
}

/// Error-then-data return. A present error wins over the data.
#[derive(Debug)]
pub struct ErrorFirst<T> {
    pub error: Option<anyhow::Error>,
    pub data: Option<T>,
}

impl<T> ErrorFirst<T> {
    pub fn ok(data: T) -> Self {
        Self {
            error: None,
            data: Some(data),
        }
    }

    pub fn err(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: Some(error.into()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoReturn for ErrorFirst<T> {
    fn return_kinds() -> &'static [ReturnKind] {
        &[ReturnKind::Error, ReturnKind::Data]
    }

    fn into_returns(self) -> Result<Returns, InvokeError> {
        let data = match self.data {
            Some(data) => to_data(data)?,
            None => None,
        };
        Ok(smallvec::smallvec![
            ReturnValue::Error(self.error),
            ReturnValue::Data(data)
        ])
    }
}

impl<T, E> IntoReturn for Result<T, E>
where
    T: Serialize,
    E: Into<anyhow::Error>,
{
    fn return_kinds() -> &'static [ReturnKind] {
        &[ReturnKind::Data, ReturnKind::Error]
    }

    fn into_returns(self) -> Result<Returns, InvokeError> {
        Ok(match self {
            Ok(data) => smallvec::smallvec![ReturnValue::Data(to_data(data)?), ReturnValue::Error(None)],
            Err(e) => smallvec::smallvec![ReturnValue::Data(None), ReturnValue::Error(Some(e.into()))],
        })
    }
}

/// A Rust function usable as an endpoint of controller `C`.
///
/// Implemented for `Fn(&C)`, `Fn(&C, &Context)`, `Fn(&C, P)`,
/// `Fn(&C, &Context, P)` and `Fn(&C, P, &Context)` where `P` is a
/// [`RequestParams`] type and the return type implements [`IntoReturn`].
/// `M` is a marker that keeps the five shapes apart; callers never name it.
pub trait IntoCallable<C, M>: Send + Sync + 'static {
    /// The declared signature derived from the function shape.
    fn signature() -> Signature;

    /// # Errors
    ///
    /// Returns an [`InvokeError`] when `args` do not fit the function.
    fn call(&self, receiver: &C, args: Arguments<'_>) -> Result<Returns, InvokeError>;
}

pub struct NoArgs<R>(PhantomData<fn() -> R>);
pub struct CtxArg<R>(PhantomData<fn() -> R>);
pub struct DataArg<P, R>(PhantomData<fn() -> (P, R)>);
pub struct CtxData<P, R>(PhantomData<fn() -> (P, R)>);
pub struct DataCtx<P, R>(PhantomData<fn() -> (P, R)>);

fn declared<R: IntoReturn>(params: Vec<ParamKind>) -> Signature {
    Signature {
        params,
        returns: R::return_kinds().to_vec(),
    }
}

fn check_arity(args: &Arguments<'_>, expected: usize) -> Result<(), InvokeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(InvokeError::Arity {
            expected,
            actual: args.len(),
        })
    }
}

fn context_arg(arg: Argument<'_>) -> Result<&Context, InvokeError> {
    match arg {
        Argument::Context(ctx) => Ok(ctx),
        Argument::Data(_) => Err(InvokeError::ArgumentMismatch { expected: "context" }),
    }
}

fn data_arg<P: 'static>(arg: Argument<'_>) -> Result<P, InvokeError> {
    let mismatch = InvokeError::ArgumentMismatch {
        expected: type_name::<P>(),
    };
    match arg {
        Argument::Data(boxed) => boxed.downcast::<P>().map(|p| *p).map_err(|_| mismatch),
        Argument::Context(_) => Err(mismatch),
    }
}

impl<C, F, R> IntoCallable<C, NoArgs<R>> for F
where
    F: Fn(&C) -> R + Send + Sync + 'static,
    R: IntoReturn,
{
    fn signature() -> Signature {
        declared::<R>(Vec::new())
    }

    fn call(&self, receiver: &C, args: Arguments<'_>) -> Result<Returns, InvokeError> {
        check_arity(&args, 0)?;
        (self)(receiver).into_returns()
    }
}

impl<C, F, R> IntoCallable<C, CtxArg<R>> for F
where
    F: Fn(&C, &Context) -> R + Send + Sync + 'static,
    R: IntoReturn,
{
    fn signature() -> Signature {
        declared::<R>(vec![ParamKind::Context])
    }

    fn call(&self, receiver: &C, args: Arguments<'_>) -> Result<Returns, InvokeError> {
        check_arity(&args, 1)?;
        let mut args = args.into_iter();
        let ctx = args.next().map_or_else(|| Err(arity(1, 0)), context_arg)?;
        (self)(receiver, ctx).into_returns()
    }
}

impl<C, F, P, R> IntoCallable<C, DataArg<P, R>> for F
where
    F: Fn(&C, P) -> R + Send + Sync + 'static,
    P: RequestParams,
    R: IntoReturn,
{
    fn signature() -> Signature {
        declared::<R>(vec![ParamKind::Data(DataType::of::<P>())])
    }

    fn call(&self, receiver: &C, args: Arguments<'_>) -> Result<Returns, InvokeError> {
        check_arity(&args, 1)?;
        let mut args = args.into_iter();
        let data = args.next().map_or_else(|| Err(arity(1, 0)), data_arg::<P>)?;
        (self)(receiver, data).into_returns()
    }
}

impl<C, F, P, R> IntoCallable<C, CtxData<P, R>> for F
where
    F: Fn(&C, &Context, P) -> R + Send + Sync + 'static,
    P: RequestParams,
    R: IntoReturn,
{
    fn signature() -> Signature {
        declared::<R>(vec![
            ParamKind::Context,
            ParamKind::Data(DataType::of::<P>()),
        ])
    }

    fn call(&self, receiver: &C, args: Arguments<'_>) -> Result<Returns, InvokeError> {
        check_arity(&args, 2)?;
        let mut args = args.into_iter();
        let ctx = args.next().map_or_else(|| Err(arity(2, 0)), context_arg)?;
        let data = args.next().map_or_else(|| Err(arity(2, 1)), data_arg::<P>)?;
        (self)(receiver, ctx, data).into_returns()
    }
}

impl<C, F, P, R> IntoCallable<C, DataCtx<P, R>> for F
where
    F: Fn(&C, P, &Context) -> R + Send + Sync + 'static,
    P: RequestParams,
    R: IntoReturn,
{
    fn signature() -> Signature {
        declared::<R>(vec![
            ParamKind::Data(DataType::of::<P>()),
            ParamKind::Context,
        ])
    }

    fn call(&self, receiver: &C, args: Arguments<'_>) -> Result<Returns, InvokeError> {
        check_arity(&args, 2)?;
        let mut args = args.into_iter();
        let data = args.next().map_or_else(|| Err(arity(2, 0)), data_arg::<P>)?;
        let ctx = args.next().map_or_else(|| Err(arity(2, 1)), context_arg)?;
        (self)(receiver, data, ctx).into_returns()
    }
}

fn arity(expected: usize, actual: usize) -> InvokeError {
    InvokeError::Arity { expected, actual }
}

/// A callable with an explicitly declared signature.
///
/// The escape hatch for shapes the typed adapters cannot express. The
/// signature is still classified at registration, so a declaration with
/// three parameters or two errors is rejected there.
pub struct RawMethod<C> {
    signature: Signature,
    call: CallFn<C>,
}

impl<C> RawMethod<C> {
    pub fn new<F>(signature: Signature, f: F) -> Self
    where
        F: Fn(&C, Arguments<'_>) -> Result<Returns, InvokeError> + Send + Sync + 'static,
    {
        Self {
            signature,
            call: Arc::new(f),
        }
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// One handler exposed by a controller, before registration.
pub struct Endpoint<C> {
    name: String,
    route: Option<RouteDescriptor>,
    signature: Signature,
    call: CallFn<C>,
}

impl<C> fmt::Debug for Endpoint<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("route", &self.route)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl<C: Send + Sync + 'static> Endpoint<C> {
    /// Endpoint routed by its name, e.g. `GetUser_Info`.
    pub fn named<F, M>(name: impl Into<String>, f: F) -> Self
    where
        F: IntoCallable<C, M>,
    {
        Self {
            name: name.into(),
            route: None,
            signature: <F as IntoCallable<C, M>>::signature(),
            call: Arc::new(move |receiver: &C, args: Arguments<'_>| f.call(receiver, args)),
        }
    }

    /// Endpoint with an explicit method and path; the name is informational.
    pub fn route<F, M>(method: Method, path: impl Into<String>, f: F) -> Self
    where
        F: IntoCallable<C, M>,
    {
        let route = RouteDescriptor::new(method, path);
        let name = format!("{} {}", route.method, route.path);
        Self {
            route: Some(route),
            ..Self::named(name, f)
        }
    }

    /// Endpoint backed by a [`RawMethod`], routed by its name.
    pub fn raw(name: impl Into<String>, method: RawMethod<C>) -> Self {
        Self {
            name: name.into(),
            route: None,
            signature: method.signature,
            call: method.call,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn descriptor(&self) -> Option<&RouteDescriptor> {
        self.route.as_ref()
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Classify the signature and bind the endpoint to `receiver`.
    ///
    /// # Errors
    ///
    /// Returns the [`SignatureError`] raised by classification.
    pub fn into_record(
        self,
        receiver: Arc<C>,
        hooks: HookSet,
    ) -> Result<HandlerRecord, SignatureError> {
        let convention = classify(&self.signature)?;
        let invoker = Arc::new(BoundMethod {
            receiver,
            call: self.call,
        });
        Ok(HandlerRecord::new(
            self.name,
            invoker,
            self.signature,
            convention,
            hooks,
        ))
    }
}

struct BoundMethod<C> {
    receiver: Arc<C>,
    call: CallFn<C>,
}

impl<C: Send + Sync> Invoke for BoundMethod<C> {
    fn invoke(&self, args: Arguments<'_>) -> Result<Returns, InvokeError> {
        (self.call)(&self.receiver, args)
    }
}
