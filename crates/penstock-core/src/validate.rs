//! Shared configuration-validation protocol.
//!
//! Every adapter applies the same checks, in the same order, before making
//! its external call:
//!
//! 1. presence of required fields ([`require`]) - a missing field fails with
//!    [`StepError::RequiredParameter`], status 400;
//! 2. value checks that remain dynamic after typing ([`require_positive`]);
//! 3. selector-output shape checks ([`require_object`], [`require_string`]),
//!    re-run on every invocation because the output depends on per-request
//!    data.
//!
//! All failures name the offending field and the step, and no external call
//! is made once validation has failed.

use crate::error::{StepError, StepResult};
use crate::store::Document;
use serde_json::Value;

/// Checks that a required configuration field is present.
pub fn require<'a, T>(
    step: &'static str,
    field: &'static str,
    value: Option<&'a T>,
) -> StepResult<&'a T> {
    value.ok_or(StepError::RequiredParameter { step, field })
}

/// Checks that a selector returned a JSON object, yielding the mapping.
pub fn require_object(step: &'static str, field: &'static str, value: Value) -> StepResult<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StepError::type_validation(
            step,
            format!(
                "'{field}' selector must return an object, got {}",
                json_type_name(&other)
            ),
        )),
    }
}

/// Checks that a selector returned a JSON string, yielding it.
pub fn require_string(step: &'static str, field: &'static str, value: Value) -> StepResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(StepError::type_validation(
            step,
            format!(
                "'{field}' selector must return a string, got {}",
                json_type_name(&other)
            ),
        )),
    }
}

/// Checks that an integer configuration value is greater than zero.
pub fn require_positive(step: &'static str, field: &'static str, value: u64) -> StepResult<u64> {
    if value == 0 {
        return Err(StepError::type_validation(
            step,
            format!("'{field}' parameter must be greater than zero"),
        ));
    }
    Ok(value)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
