// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed value calculus carried by event data.
//!
//! Mirrors the subset of `GVariant` that `eventd` actually uses for event
//! data: booleans, both integer signs at 64-bit width, doubles, strings,
//! byte strings, arrays and string-keyed maps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A single event-data value.
///
/// Variants are given an explicit rank so cross-type comparisons (always
/// `None`, per the predicate laws in the router) don't accidentally fall
/// back to derive-order, which would silently change if a variant were
/// reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    Str(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    fn type_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int64(_) => 1,
            Value::UInt64(_) => 2,
            Value::Double(_) => 3,
            Value::Str(_) => 4,
            Value::Bytes(_) => 5,
            Value::Array(_) => 6,
            Value::Map(_) => 7,
        }
    }

    /// Same-type check, used by the router to reject mismatched comparisons
    /// and dictionary key lookups before ever calling [`Value::compare`].
    pub fn same_type(&self, other: &Value) -> bool {
        self.type_rank() == other.type_rank()
    }

    /// Value-level comparison, collapsed to `-1/0/1` by the caller.
    ///
    /// Returns `None` when the two values are not the same type — the
    /// router's predicate evaluation treats that as `false`, never as an
    /// ordering.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if !self.same_type(other) {
            return None;
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
            (Value::UInt64(a), Value::UInt64(b)) => Some(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::Array(a), Value::Array(b)) => Self::compare_arrays(a, b),
            (Value::Map(_), Value::Map(_)) => None, // maps have no total order
            _ => unreachable!("same_type guards mismatched discriminants"),
        }
    }

    /// Lexicographic comparison of two arrays, element by element, falling
    /// back to length when one is a prefix of the other. `None` propagates
    /// from any incomparable element pair.
    fn compare_arrays(a: &[Value], b: &[Value]) -> Option<Ordering> {
        for (x, y) in a.iter().zip(b.iter()) {
            match x.compare(y) {
                Some(Ordering::Equal) => continue,
                other => return other,
            }
        }
        Some(a.len().cmp(&b.len()))
    }

    /// Look up a key when `self` is a [`Value::Map`]; `None` for any other
    /// variant or a missing key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Parse a `Type:Literal` config-syntax token into a typed `Value`.
    ///
    /// Grounded on `config.c`'s key-suffix-driven typed parsing: the
    /// expected type is named up front (`"42:i64"`, `"true:bool"`,
    /// `"3.5:double"`, `"hi:string"`), never inferred.
    pub fn parse_typed_literal(s: &str) -> Result<Value, ValueParseError> {
        let (lit, ty) = s
            .rsplit_once(':')
            .ok_or_else(|| ValueParseError::MissingType(s.to_string()))?;
        match ty {
            "bool" => lit
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|_| ValueParseError::BadLiteral(s.to_string())),
            "i64" => lit
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|_| ValueParseError::BadLiteral(s.to_string())),
            "u64" => lit
                .parse::<u64>()
                .map(Value::UInt64)
                .map_err(|_| ValueParseError::BadLiteral(s.to_string())),
            "double" => lit
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| ValueParseError::BadLiteral(s.to_string())),
            "string" => Ok(Value::Str(lit.to_string())),
            other => Err(ValueParseError::UnknownType(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValueParseError {
    #[error("literal `{0}` has no `:type` suffix")]
    MissingType(String),
    #[error("unknown literal type `{0}`")]
    UnknownType(String),
    #[error("couldn't parse literal `{0}`")]
    BadLiteral(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(n) => write!(f, "{n}"),
            Value::UInt64(n) => write!(f, "{n}"),
            Value::Double(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "{}", base64::Engine::encode(&base64::engine::general_purpose::STANDARD, b)),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}
impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt64(v)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
