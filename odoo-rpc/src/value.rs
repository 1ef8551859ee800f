//! # Wire Values
//!
//! The object API speaks a small tagged value language: four scalars, null,
//! an ordered list and a keyed map. [`WireValue`] is that language as a sum
//! type, and this module holds the two one-way converters between it and the
//! caller-facing `serde_json::Value`:
//!
//! 1. **Native -> wire** via the [`IntoWire`] trait. Scalars map by runtime
//!    type; composites convert their children first and are then classified
//!    by key shape (see below).
//! 2. **Wire -> native** via [`WireValue::into_native`], an exhaustive
//!    unwrap back into JSON.
//!
//! ## Key-shape classification
//!
//! The wire protocol distinguishes lists from maps, JSON objects do not
//! always: data that went through PHP-ish layers arrives as objects keyed
//! `"0", "1", ...`. An object whose keys are exactly the contiguous sequence
//! `0..n-1`, in iteration order, encodes as [`WireValue::Array`]; every
//! other object encodes as [`WireValue::Struct`]. This is the single rule
//! that determines wire shape from native shape, with no "is this a list"
//! flag from the caller — which is why the crate builds `serde_json` with
//! `preserve_order`.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("Value '{0}' has no wire encoding")]
    UnsupportedType(String),
    #[error("Expected a wire value of kind '{expected}', found '{found}'")]
    UnexpectedKind { expected: WireKind, found: WireKind },
}

/// The tag of a [`WireValue`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    Int,
    String,
    Double,
    Boolean,
    Null,
    Array,
    Struct,
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireKind::Int => "int",
            WireKind::String => "string",
            WireKind::Double => "double",
            WireKind::Boolean => "boolean",
            WireKind::Null => "null",
            WireKind::Array => "array",
            WireKind::Struct => "struct",
        };
        f.write_str(name)
    }
}

/// A value in the wire representation.
///
/// Immutable once constructed: the crate exposes no mutating API. `Struct`
/// keys are unique; equality on structs ignores key order, equality on
/// arrays is positional.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Int(i64),
    String(String),
    Double(f64),
    Boolean(bool),
    Null,
    Array(Vec<WireValue>),
    Struct(IndexMap<String, WireValue>),
}

impl WireValue {
    pub fn kind(&self) -> WireKind {
        match self {
            WireValue::Int(_) => WireKind::Int,
            WireValue::String(_) => WireKind::String,
            WireValue::Double(_) => WireKind::Double,
            WireValue::Boolean(_) => WireKind::Boolean,
            WireValue::Null => WireKind::Null,
            WireValue::Array(_) => WireKind::Array,
            WireValue::Struct(_) => WireKind::Struct,
        }
    }

    /// Unwraps the wire value back into native JSON.
    ///
    /// Arrays recurse in order, structs recurse preserving keys. A `Double`
    /// with no JSON representation (NaN, infinities) maps to JSON null.
    pub fn into_native(self) -> Value {
        match self {
            WireValue::Int(n) => Value::Number(n.into()),
            WireValue::String(s) => Value::String(s),
            WireValue::Double(d) => serde_json::Number::from_f64(d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            WireValue::Boolean(b) => Value::Bool(b),
            WireValue::Null => Value::Null,
            WireValue::Array(items) => {
                Value::Array(items.into_iter().map(WireValue::into_native).collect())
            }
            WireValue::Struct(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value.into_native()))
                    .collect(),
            ),
        }
    }

    /// The integer payload, or [`ValueError::UnexpectedKind`].
    pub fn expect_int(&self) -> Result<i64, ValueError> {
        match self {
            WireValue::Int(n) => Ok(*n),
            other => Err(ValueError::UnexpectedKind {
                expected: WireKind::Int,
                found: other.kind(),
            }),
        }
    }

    /// The list payload, or [`ValueError::UnexpectedKind`].
    pub fn expect_array(self) -> Result<Vec<WireValue>, ValueError> {
        match self {
            WireValue::Array(items) => Ok(items),
            other => Err(ValueError::UnexpectedKind {
                expected: WireKind::Array,
                found: other.kind(),
            }),
        }
    }

    /// The map payload, or [`ValueError::UnexpectedKind`].
    pub fn expect_struct(self) -> Result<IndexMap<String, WireValue>, ValueError> {
        match self {
            WireValue::Struct(fields) => Ok(fields),
            other => Err(ValueError::UnexpectedKind {
                expected: WireKind::Struct,
                found: other.kind(),
            }),
        }
    }
}

/// Conversion into the wire representation.
pub trait IntoWire {
    fn into_wire(self) -> Result<WireValue, ValueError>;
}

impl IntoWire for WireValue {
    /// Identity. Already-wrapped values pass through untouched, so callers
    /// may freely mix pre-built wire values into native data they hand to
    /// the client without any double wrapping.
    fn into_wire(self) -> Result<WireValue, ValueError> {
        Ok(self)
    }
}

impl IntoWire for Value {
    fn into_wire(self) -> Result<WireValue, ValueError> {
        match self {
            Value::Null => Ok(WireValue::Null),
            Value::Bool(b) => Ok(WireValue::Boolean(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(WireValue::Int(i))
                } else if n.is_f64() {
                    // as_f64 is total for f64-originated numbers
                    Ok(WireValue::Double(n.as_f64().unwrap_or_default()))
                } else {
                    // u64 beyond i64::MAX: refuse rather than coerce lossily
                    Err(ValueError::UnsupportedType(n.to_string()))
                }
            }
            Value::String(s) => Ok(WireValue::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(IntoWire::into_wire)
                .collect::<Result<Vec<_>, _>>()
                .map(WireValue::Array),
            Value::Object(map) => {
                let converted = map
                    .into_iter()
                    .map(|(key, value)| value.into_wire().map(|value| (key, value)))
                    .collect::<Result<IndexMap<_, _>, _>>()?;
                Ok(classify(converted))
            }
        }
    }
}

impl IntoWire for &Value {
    fn into_wire(self) -> Result<WireValue, ValueError> {
        self.clone().into_wire()
    }
}

/// Keyed collections whose keys are exactly `"0".."n-1"`, in order, encode
/// as arrays (an empty collection included); anything else is a struct.
fn classify(map: IndexMap<String, WireValue>) -> WireValue {
    let packed = map
        .keys()
        .enumerate()
        .all(|(index, key)| key == &index.to_string());

    if packed {
        WireValue::Array(map.into_values().collect())
    } else {
        WireValue::Struct(map)
    }
}
