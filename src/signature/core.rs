use std::any::Any;
use std::fmt;

use crate::params::{populate_boxed, ParseError, RequestParams};
use crate::server::HttpRequest;

/// Builds a type-erased data argument from a request and captured args.
pub type PopulateFn = fn(&HttpRequest, &[String]) -> Result<Box<dyn Any + Send>, ParseError>;

/// Maximum declared parameters (excluding the receiver).
pub const MAX_PARAMS: usize = 2;
/// Maximum declared return values.
pub const MAX_RETURNS: usize = 2;

/// The data-parameter type of a callable, captured at registration.
#[derive(Clone, Copy)]
pub struct DataType {
    name: &'static str,
    populate: PopulateFn,
}

impl DataType {
    /// Describe `P` as a data parameter.
    #[must_use]
    pub fn of<P: RequestParams>() -> Self {
        Self {
            name: std::any::type_name::<P>(),
            populate: populate_boxed::<P>,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Populate a fresh instance of the data type.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] raised while binding the request.
    pub fn populate(
        &self,
        req: &HttpRequest,
        args: &[String],
    ) -> Result<Box<dyn Any + Send>, ParseError> {
        (self.populate)(req, args)
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for DataType {}

/// One declared parameter of a callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// The per-request [`Context`](crate::context::Context).
    Context,
    /// A value populated from the request.
    Data(DataType),
}

/// One declared return value of a callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// Anything that can describe a failure.
    Error,
    /// A value rendered into the response body.
    Data,
}

/// Declared parameter and return lists of a callable, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<ParamKind>,
    pub returns: Vec<ReturnKind>,
}

impl Signature {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn context(mut self) -> Self {
        self.params.push(ParamKind::Context);
        self
    }

    #[must_use]
    pub fn data<P: RequestParams>(mut self) -> Self {
        self.params.push(ParamKind::Data(DataType::of::<P>()));
        self
    }

    #[must_use]
    pub fn returns_error(mut self) -> Self {
        self.returns.push(ReturnKind::Error);
        self
    }

    #[must_use]
    pub fn returns_data(mut self) -> Self {
        self.returns.push(ReturnKind::Data);
        self
    }
}

/// Accepted parameter layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    None,
    ContextOnly,
    DataOnly(DataType),
    ContextThenData(DataType),
    DataThenContext(DataType),
}

impl ParamShape {
    #[must_use]
    pub fn data_type(&self) -> Option<&DataType> {
        match self {
            ParamShape::DataOnly(t) | ParamShape::ContextThenData(t) | ParamShape::DataThenContext(t) => {
                Some(t)
            }
            ParamShape::None | ParamShape::ContextOnly => None,
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            ParamShape::None => 0,
            ParamShape::ContextOnly | ParamShape::DataOnly(_) => 1,
            ParamShape::ContextThenData(_) | ParamShape::DataThenContext(_) => 2,
        }
    }
}

/// Accepted return layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    None,
    ErrorOnly,
    DataOnly,
    /// Error first; a present error wins over the data.
    ErrorThenData,
    /// Data first; the only shape that runs post-execute hooks.
    DataThenError,
}

impl ReturnShape {
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            ReturnShape::None => 0,
            ReturnShape::ErrorOnly | ReturnShape::DataOnly => 1,
            ReturnShape::ErrorThenData | ReturnShape::DataThenError => 2,
        }
    }
}

impl fmt::Display for ParamShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamShape::None => f.write_str("()"),
            ParamShape::ContextOnly => f.write_str("(ctx)"),
            ParamShape::DataOnly(t) => write!(f, "({})", t.name()),
            ParamShape::ContextThenData(t) => write!(f, "(ctx, {})", t.name()),
            ParamShape::DataThenContext(t) => write!(f, "({}, ctx)", t.name()),
        }
    }
}

impl fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReturnShape::None => "()",
            ReturnShape::ErrorOnly => "(error)",
            ReturnShape::DataOnly => "(data)",
            ReturnShape::ErrorThenData => "(error, data)",
            ReturnShape::DataThenError => "(data, error)",
        };
        f.write_str(s)
    }
}

/// The calling convention tag cached on a handler record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallingConvention {
    pub params: ParamShape,
    pub returns: ReturnShape,
}

impl fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.params, self.returns)
    }
}

/// Why a signature was rejected at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    TooManyParams(usize),
    TooManyReturns(usize),
    /// Two parameters of the same kind, e.g. two contexts.
    DuplicateParam(&'static str),
    /// Two returns of the same kind, e.g. two errors.
    DuplicateReturn(&'static str),
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureError::TooManyParams(n) => {
                write!(f, "{n} parameters declared, at most {MAX_PARAMS} supported")
            }
            SignatureError::TooManyReturns(n) => {
                write!(f, "{n} return values declared, at most {MAX_RETURNS} supported")
            }
            SignatureError::DuplicateParam(kind) => {
                write!(f, "unsupported parameter pair: two {kind} parameters")
            }
            SignatureError::DuplicateReturn(kind) => {
                write!(f, "unsupported return pair: two {kind} values")
            }
        }
    }
}

impl std::error::Error for SignatureError {}

/// Classify a declared signature into its calling convention.
///
/// Pure and deterministic: the same signature always yields the same tag.
///
/// # Errors
///
/// Returns a [`SignatureError`] for arities above two or for pairs of the
/// same kind.
pub fn classify(signature: &Signature) -> Result<CallingConvention, SignatureError> {
    let params = match signature.params.as_slice() {
        [] => ParamShape::None,
        [ParamKind::Context] => ParamShape::ContextOnly,
        [ParamKind::Data(t)] => ParamShape::DataOnly(*t),
        [ParamKind::Context, ParamKind::Data(t)] => ParamShape::ContextThenData(*t),
        [ParamKind::Data(t), ParamKind::Context] => ParamShape::DataThenContext(*t),
        [ParamKind::Context, ParamKind::Context] => {
            return Err(SignatureError::DuplicateParam("context"))
        }
        [ParamKind::Data(_), ParamKind::Data(_)] => {
            return Err(SignatureError::DuplicateParam("data"))
        }
        more => return Err(SignatureError::TooManyParams(more.len())),
    };

    let returns = match signature.returns.as_slice() {
        [] => ReturnShape::None,
        [ReturnKind::Error] => ReturnShape::ErrorOnly,
        [ReturnKind::Data] => ReturnShape::DataOnly,
        [ReturnKind::Error, ReturnKind::Data] => ReturnShape::ErrorThenData,
        [ReturnKind::Data, ReturnKind::Error] => ReturnShape::DataThenError,
        [ReturnKind::Error, ReturnKind::Error] => {
            return Err(SignatureError::DuplicateReturn("error"))
        }
        [ReturnKind::Data, ReturnKind::Data] => {
            return Err(SignatureError::DuplicateReturn("data"))
        }
        more => return Err(SignatureError::TooManyReturns(more.len())),
    };

    Ok(CallingConvention { params, returns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_classify_every_param_shape() {
        let data = DataType::of::<HashMap<String, String>>();
        let cases = [
            (Signature::new(), ParamShape::None),
            (Signature::new().context(), ParamShape::ContextOnly),
            (
                Signature::new().data::<HashMap<String, String>>(),
                ParamShape::DataOnly(data),
            ),
            (
                Signature::new().context().data::<HashMap<String, String>>(),
                ParamShape::ContextThenData(data),
            ),
            (
                Signature::new().data::<HashMap<String, String>>().context(),
                ParamShape::DataThenContext(data),
            ),
        ];
        for (signature, expected) in cases {
            assert_eq!(classify(&signature).unwrap().params, expected);
        }
    }

    #[test]
    fn test_classify_rejects_three_params() {
        let signature = Signature::new()
            .context()
            .data::<String>()
            .data::<String>();
        assert_eq!(classify(&signature), Err(SignatureError::TooManyParams(3)));
    }

    #[test]
    fn test_classify_rejects_duplicate_kinds() {
        assert_eq!(
            classify(&Signature::new().context().context()),
            Err(SignatureError::DuplicateParam("context"))
        );
        assert_eq!(
            classify(&Signature::new().returns_error().returns_error()),
            Err(SignatureError::DuplicateReturn("error"))
        );
        assert_eq!(
            classify(&Signature::new().returns_data().returns_data().returns_error()),
            Err(SignatureError::TooManyReturns(3))
        );
    }

    #[test]
    fn test_classify_return_order_matters() {
        let error_first = classify(&Signature::new().returns_error().returns_data()).unwrap();
        let data_first = classify(&Signature::new().returns_data().returns_error()).unwrap();
        assert_eq!(error_first.returns, ReturnShape::ErrorThenData);
        assert_eq!(data_first.returns, ReturnShape::DataThenError);
    }
}
