//! Parameter extraction for tool calls.
//!
//! Models are loose with JSON types: `offset` arrives as `"200"` as often as
//! `200`. Numbers given as strings are coerced; anything else that does not
//! fit is an [`ToolError::InvalidParameter`], never a panic.

use orangutan_core::error::ToolError;
use orangutan_core::tool::Params;
use serde_json::Value;

/// A required string parameter. Numbers and booleans are stringified.
pub fn required_str(params: &Params, name: &str) -> Result<String, ToolError> {
    optional_str(params, name)?.ok_or_else(|| ToolError::MissingParameter(name.to_string()))
}

/// An optional string parameter; `null` counts as absent.
pub fn optional_str(params: &Params, name: &str) -> Result<Option<String>, ToolError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
        Some(other) => Err(ToolError::invalid(
            name,
            format!("expected a string, got {}", type_name(other)),
        )),
    }
}

/// An optional non-negative integer, accepting numeric strings.
pub fn optional_usize(params: &Params, name: &str) -> Result<Option<usize>, ToolError> {
    let invalid = || ToolError::invalid(name, "expected a non-negative integer");
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                return usize::try_from(u).map(Some).map_err(|_| invalid());
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as usize)),
                _ => Err(invalid()),
            }
        }
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<usize>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// An optional list of strings. A lone string is treated as a one-item list.
pub fn string_list(params: &Params, name: &str) -> Result<Vec<String>, ToolError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(_) | Value::Bool(_) => Ok(item.to_string()),
                other => Err(ToolError::invalid(
                    name,
                    format!("expected a list of strings, found {}", type_name(other)),
                )),
            })
            .collect(),
        Some(other) => Err(ToolError::invalid(
            name,
            format!("expected a list of strings, got {}", type_name(other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
