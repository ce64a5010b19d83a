use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use super::source::{FormSource, QuerySource, ValueSource};
use super::value::{ParamValue, ValueError};
use crate::server::{ContentKind, HttpRequest};

/// Failure while populating a data parameter. Rendered as `400 Bad Request`.
#[derive(Debug)]
pub enum ParseError {
    /// The JSON body did not decode into the target type.
    Json(serde_json::Error),
    /// A bound field value did not convert.
    Field { field: String, source: ValueError },
    /// The populated value did not have the declared type.
    TypeMismatch(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Json(e) => write!(f, "invalid JSON body: {e}"),
            ParseError::Field { field, source } => write!(f, "field `{field}`: {source}"),
            ParseError::TypeMismatch(expected) => {
                write!(f, "populated parameter is not a {expected}")
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Json(e) => Some(e),
            ParseError::Field { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ParseError {
    /// Wrap a value conversion failure for `field`.
    pub fn field(field: impl Into<String>, source: ValueError) -> Self {
        ParseError::Field {
            field: field.into(),
            source,
        }
    }
}

/// A type that can be populated from an incoming request.
///
/// Structs usually get this from `#[derive(RequestParams)]`; scalars,
/// `Vec<T>` and `HashMap<String, String>` are implemented here and bind
/// straight from the request values.
pub trait RequestParams: Default + DeserializeOwned + Send + 'static {
    /// The field that receives wildcard captures, if the type has one.
    fn positional_args(&mut self) -> Option<&mut Vec<String>> {
        None
    }

    /// Number of fields the type declares.
    fn field_count() -> usize {
        1
    }

    /// Bind fields from query or form values.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when a value does not convert.
    fn bind(&mut self, source: &dyn ValueSource) -> Result<(), ParseError>;
}

/// Bind one named field: convert its values, or reset it when absent.
///
/// Used by derived [`RequestParams::bind`] implementations. With `keep` set
/// an absent value leaves the current contents in place. Returns whether a
/// value was present.
///
/// # Errors
///
/// Returns [`ParseError::Field`] when a present value does not convert.
pub fn bind_field<T: ParamValue + Default>(
    slot: &mut T,
    name: &str,
    source: &dyn ValueSource,
    keep: bool,
) -> Result<bool, ParseError> {
    let values = source.values(name);
    if values.is_empty() {
        if !keep {
            *slot = T::default();
        }
        return Ok(false);
    }
    *slot = T::from_values(&values).map_err(|e| ParseError::field(name, e))?;
    Ok(true)
}

macro_rules! impl_scalar_params {
    ($($ty:ty),* $(,)?) => {
        $(
            /// Takes the last query value, whatever its name.
            impl RequestParams for $ty {
                fn bind(&mut self, source: &dyn ValueSource) -> Result<(), ParseError> {
                    if let Some((name, value)) = source.pairs().last().copied() {
                        *self = <$ty as ParamValue>::from_values(&[value])
                            .map_err(|e| ParseError::field(name, e))?;
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_scalar_params!(String, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Collects every value in request order.
impl<T> RequestParams for Vec<T>
where
    T: ParamValue + DeserializeOwned + Send + 'static,
{
    fn bind(&mut self, source: &dyn ValueSource) -> Result<(), ParseError> {
        let pairs = source.pairs();
        let values: Vec<&str> = pairs.iter().map(|(_, v)| *v).collect();
        *self = Vec::<T>::from_values(&values).map_err(|e| ParseError::field("[]", e))?;
        Ok(())
    }
}

/// Takes every pair; a repeated name keeps its last value.
impl RequestParams for HashMap<String, String> {
    fn bind(&mut self, source: &dyn ValueSource) -> Result<(), ParseError> {
        *self = source
            .pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(())
    }
}

/// Takes every pair as a JSON object of strings; JSON bodies decode as-is.
impl RequestParams for serde_json::Value {
    fn bind(&mut self, source: &dyn ValueSource) -> Result<(), ParseError> {
        let map: serde_json::Map<String, serde_json::Value> = source
            .pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        *self = serde_json::Value::Object(map);
        Ok(())
    }
}

/// Populate `P` from `req` and the wildcard captures of the matched route.
///
/// 1. Captures go to the positional-args field when the type has one; a
///    type whose only field is that one is done.
/// 2. A JSON request decodes its body. An empty body keeps the defaults.
/// 3. A form request binds from form values, then the query.
/// 4. Anything else binds from the query.
///
/// # Errors
///
/// Returns a [`ParseError`] when decoding or binding fails.
pub fn populate<P: RequestParams>(req: &HttpRequest, args: &[String]) -> Result<P, ParseError> {
    let mut params = P::default();

    if !args.is_empty() {
        if let Some(slot) = params.positional_args() {
            *slot = args.to_vec();
            if P::field_count() == 1 {
                return Ok(params);
            }
        }
    }

    let kind = req.content_kind();
    debug!(
        param_type = std::any::type_name::<P>(),
        content_kind = ?kind,
        captured_args = args.len(),
        "Populating request parameters"
    );

    match kind {
        ContentKind::Json => {
            if req.body().is_empty() {
                return Ok(params);
            }
            let mut decoded: P = serde_json::from_slice(req.body()).map_err(ParseError::Json)?;
            if !args.is_empty() {
                if let Some(slot) = decoded.positional_args() {
                    if slot.is_empty() {
                        *slot = args.to_vec();
                    }
                }
            }
            Ok(decoded)
        }
        ContentKind::Form => {
            params.bind(&FormSource::new(req))?;
            Ok(params)
        }
        ContentKind::Other => {
            params.bind(&QuerySource::new(req))?;
            Ok(params)
        }
    }
}

/// Type-erased [`populate`], stored on a [`DataType`](crate::signature::DataType).
///
/// # Errors
///
/// Returns the [`ParseError`] raised by [`populate`].
pub fn populate_boxed<P: RequestParams>(
    req: &HttpRequest,
    args: &[String],
) -> Result<Box<dyn Any + Send>, ParseError> {
    populate::<P>(req, args).map(|p| Box::new(p) as Box<dyn Any + Send>)
}
