//! Dynamic values and flat key-value records

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A dynamic value stored in a persistence record or sync payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    /// No value / null
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (charge amounts, tick counts)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

/// A flat record of string keys to dynamic values
///
/// Uses IndexMap to preserve insertion order (deterministic serialization).
/// This is the shape of both the persistence record and the sync payload.
pub type Record = IndexMap<String, Value>;

impl Value {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

/// Read an integer key from a record, clamped to `[0, max]`
///
/// A missing key reads as 0. A key holding a non-integer value is treated
/// as missing and reported at `warn`.
pub fn read_clamped(record: &Record, key: &str, max: u32) -> u32 {
    match record.get(key) {
        None => 0,
        Some(Value::Int(i)) => (*i).clamp(0, max as i64) as u32,
        Some(other) => {
            tracing::warn!(key, got = other.type_name(), "ignoring non-integer record value");
            0
        }
    }
}

/// Read a boolean key from a record; missing or malformed reads as `false`
pub fn read_flag(record: &Record, key: &str) -> bool {
    match record.get(key) {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            tracing::warn!(key, got = other.type_name(), "ignoring non-boolean record value");
            false
        }
    }
}
