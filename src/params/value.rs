use std::fmt;

/// A raw request value that could not be converted to the target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    pub value: String,
    pub expected: &'static str,
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot parse {:?} as {}", self.value, self.expected)
    }
}

impl std::error::Error for ValueError {}

/// Conversion from the raw string values a request carries for one name.
///
/// `values` is never empty when called from generated bindings; scalar
/// targets use the first value and sequences use all of them.
pub trait ParamValue: Sized {
    /// # Errors
    ///
    /// Returns a [`ValueError`] when a value does not parse.
    fn from_values(values: &[&str]) -> Result<Self, ValueError>;
}

fn first<'a>(values: &[&'a str]) -> &'a str {
    values.first().copied().unwrap_or_default()
}

impl ParamValue for String {
    fn from_values(values: &[&str]) -> Result<Self, ValueError> {
        Ok(first(values).to_string())
    }
}

macro_rules! impl_param_value_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ParamValue for $ty {
                fn from_values(values: &[&str]) -> Result<Self, ValueError> {
                    let raw = first(values);
                    raw.trim().parse::<$ty>().map_err(|_| ValueError {
                        value: raw.to_string(),
                        expected: stringify!($ty),
                    })
                }
            }
        )*
    };
}

impl_param_value_from_str!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, char);

/// Accepts the same spellings as Go's `strconv.ParseBool`.
impl ParamValue for bool {
    fn from_values(values: &[&str]) -> Result<Self, ValueError> {
        let raw = first(values);
        match raw {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(ValueError {
                value: raw.to_string(),
                expected: "bool",
            }),
        }
    }
}

impl<T: ParamValue> ParamValue for Option<T> {
    fn from_values(values: &[&str]) -> Result<Self, ValueError> {
        if values.is_empty() {
            return Ok(None);
        }
        T::from_values(values).map(Some)
    }
}

impl<T: ParamValue> ParamValue for Vec<T> {
    fn from_values(values: &[&str]) -> Result<Self, ValueError> {
        values
            .iter()
            .map(|value| T::from_values(std::slice::from_ref(value)))
            .collect()
    }
}
