//! Type coercion between raw, source and target values.

use std::borrow::Cow;
use std::fmt;

use crate::mapping::{FieldType, FieldValue};
use crate::sources::RawValue;

/// Why a value could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    /// Human readable reason.
    pub reason: String,
}

impl CoercionError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for CoercionError {}

/// Coerces a raw source value into `ty`.
pub fn coerce_raw(raw: &RawValue, ty: FieldType) -> Result<FieldValue, CoercionError> {
    match raw {
        RawValue::Null => Err(CoercionError::new(format!("NULL is not a valid {ty}"))),
        RawValue::Int(v) => coerce_value(FieldValue::Int(*v), ty),
        RawValue::Float(v) => coerce_value(FieldValue::Float(*v), ty),
        RawValue::Text(v) if ty == FieldType::Str => Ok(FieldValue::Str(Cow::Owned(v.clone()))),
        RawValue::Text(v) => parse_text(v, ty),
    }
}

/// Coerces a typed value into `ty`.
///
/// NaN and infinite floats never coerce, to any type.
pub fn coerce_value(value: FieldValue, ty: FieldType) -> Result<FieldValue, CoercionError> {
    if let FieldValue::Float(v) = &value {
        finite(*v)?;
    }
    if value.field_type() == ty {
        return Ok(value);
    }
    match (value, ty) {
        (v, FieldType::Str) => Ok(FieldValue::Str(Cow::Owned(v.to_string()))),
        (FieldValue::Str(s), ty) => parse_text(&s, ty),
        (FieldValue::Int(v), FieldType::Float) => Ok(FieldValue::Float(v as f64)),
        (FieldValue::Int(v), FieldType::Bool) => Ok(FieldValue::Bool(v != 0)),
        (FieldValue::Float(v), FieldType::Int) => float_to_int(v).map(FieldValue::Int),
        (FieldValue::Float(v), FieldType::Bool) => Ok(FieldValue::Bool(v != 0.0)),
        (FieldValue::Bool(v), FieldType::Int) => Ok(FieldValue::Int(i64::from(v))),
        (FieldValue::Bool(v), FieldType::Float) => Ok(FieldValue::Float(if v { 1.0 } else { 0.0 })),
        (v, ty) => Err(CoercionError::new(format!(
            "cannot convert {} to {}",
            v.field_type(),
            ty
        ))),
    }
}

fn parse_text(text: &str, ty: FieldType) -> Result<FieldValue, CoercionError> {
    let text = text.trim();
    match ty {
        FieldType::Int => text
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|e| CoercionError::new(format!("invalid int {text:?}: {e}"))),
        FieldType::Float => text
            .parse::<f64>()
            .map_err(|e| CoercionError::new(format!("invalid float {text:?}: {e}")))
            .and_then(finite)
            .map(FieldValue::Float),
        FieldType::Bool => parse_bool(text)
            .map(FieldValue::Bool)
            .ok_or_else(|| CoercionError::new(format!("invalid bool {text:?}"))),
        FieldType::Str => Ok(FieldValue::Str(Cow::Owned(text.to_string()))),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

fn finite(v: f64) -> Result<f64, CoercionError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoercionError::new(format!("{v} is not a finite number")))
    }
}

fn float_to_int(v: f64) -> Result<i64, CoercionError> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Ok(v.trunc() as i64)
    } else {
        Err(CoercionError::new(format!("{v} does not fit an int")))
    }
}
