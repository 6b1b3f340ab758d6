//! Typed lookups on a JSON params object.
//!
//! The scalar helpers never fail: a missing key or a value of the wrong
//! JSON type yields the default. [`param_parsed`] is the exception, since a
//! misspelled pattern or metric name is a configuration error rather than
//! something to paper over.

use std::str::FromStr;

use serde_json::Value;

/// `params[name]` as `f64` (integers included), else `default`.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// `params[name]` as a non-negative integer, else `default`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// `params[name]` as `u64`, else `default`.
pub fn param_u64(params: &Value, name: &str, default: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(default)
}

/// `params[name]` as `bool`, else `default`.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Parses the string at `params[name]` with `FromStr`.
///
/// Returns `Ok(default)` if the key is missing or not a string, and the
/// parse error if the string is present but invalid.
pub fn param_parsed<T: FromStr>(params: &Value, name: &str, default: T) -> Result<T, T::Err> {
    match params.get(name).and_then(Value::as_str) {
        Some(s) => s.parse(),
        None => Ok(default),
    }
}
