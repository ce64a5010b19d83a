use serde::Serialize;
use serde_json::{json, Value};
use std::any::Any;
use validator::{Validate, ValidationErrors};

use crate::handler::StatusError;

/// One field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flatten `validator` errors into one entry per failed rule, ordered by
/// field name. A rule without a message reports its code.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));
    fields
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| {
                let message = failure
                    .message
                    .as_ref()
                    .map_or_else(|| failure.code.to_string(), ToString::to_string);
                FieldError::new(field.to_string(), message)
            })
        })
        .collect()
}

/// Post-parse hook that runs the `#[derive(Validate)]` rules of `P` and
/// rejects the request with `400`.
///
/// The response body is
/// `{"code":400,"message":"bad request","data":[{"field":..,"message":..}]}`.
/// Parameters of any other type pass through untouched.
pub fn validate<P>() -> impl Fn(&dyn Any) -> anyhow::Result<()> + Send + Sync + 'static
where
    P: Validate + 'static,
{
    |param: &dyn Any| {
        let Some(param) = param.downcast_ref::<P>() else {
            return Ok(());
        };
        param.validate().map_err(|errors| {
            let payload = json!({
                "code": 400,
                "message": "bad request",
                "data": field_errors(&errors),
            });
            StatusError::bad_request("bad request")
                .with_payload(payload)
                .into()
        })
    }
}

/// Post-execute hook that renders the handler data as a JSON string, so it
/// is written out verbatim.
pub fn rest_json() -> impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static {
    |data: Value| Ok(Value::String(serde_json::to_string(&data)?))
}
