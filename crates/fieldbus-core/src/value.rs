// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed values exchanged with field devices.
//!
//! [`Value`] is the single currency between the driver layer and its
//! callers: every read produces values, every write consumes one. The
//! [`DataKind`] discriminant selects the wire representation without
//! carrying a payload, which lets callers request a decode shape ahead
//! of time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// DataKind
// =============================================================================

/// Wire-level data type of a register-mapped element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// Single bit (coil or discrete input).
    Bool,
    /// Signed 16-bit integer, one register.
    Int16,
    /// Unsigned 16-bit integer, one register.
    #[serde(rename = "uint16")]
    UInt16,
    /// Signed 32-bit integer, two registers.
    Int32,
    /// Unsigned 32-bit integer, two registers.
    #[serde(rename = "uint32")]
    UInt32,
    /// Signed 64-bit integer, four registers.
    Int64,
    /// Unsigned 64-bit integer, four registers.
    #[serde(rename = "uint64")]
    UInt64,
    /// IEEE 754 single-precision float, two registers.
    Float32,
    /// IEEE 754 double-precision float, four registers.
    Float64,
    /// Raw byte string packed two characters per register.
    String,
}

impl DataKind {
    /// Number of 16-bit registers occupied by one element of this kind.
    ///
    /// `Bool` and `String` have no fixed per-element register size and
    /// return 1; callers size those reads by count instead.
    pub fn register_count(&self) -> u16 {
        match self {
            Self::Bool | Self::Int16 | Self::UInt16 | Self::String => 1,
            Self::Int32 | Self::UInt32 | Self::Float32 => 2,
            Self::Int64 | Self::UInt64 | Self::Float64 => 4,
        }
    }

    /// Payload bytes occupied by one element of this kind.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int16 | Self::UInt16 | Self::String => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "bit" => Ok(Self::Bool),
            "int16" | "i16" | "short" => Ok(Self::Int16),
            "uint16" | "u16" | "word" => Ok(Self::UInt16),
            "int32" | "i32" => Ok(Self::Int32),
            "uint32" | "u32" | "dword" => Ok(Self::UInt32),
            "int64" | "i64" => Ok(Self::Int64),
            "uint64" | "u64" => Ok(Self::UInt64),
            "float32" | "f32" | "float" => Ok(Self::Float32),
            "float64" | "f64" | "double" => Ok(Self::Float64),
            "string" | "str" => Ok(Self::String),
            other => Err(format!("unknown data kind: {}", other)),
        }
    }
}

// =============================================================================
// Value
// =============================================================================

/// A single typed value read from or written to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Unsigned 16-bit integer.
    #[serde(rename = "uint16")]
    UInt16(u16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    #[serde(rename = "uint32")]
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    #[serde(rename = "uint64")]
    UInt64(u64),
    /// Single-precision float.
    Float32(f32),
    /// Double-precision float.
    Float64(f64),
    /// Character string.
    String(String),
}

impl Value {
    /// The [`DataKind`] this value carries.
    pub fn kind(&self) -> DataKind {
        match self {
            Self::Bool(_) => DataKind::Bool,
            Self::Int16(_) => DataKind::Int16,
            Self::UInt16(_) => DataKind::UInt16,
            Self::Int32(_) => DataKind::Int32,
            Self::UInt32(_) => DataKind::UInt32,
            Self::Int64(_) => DataKind::Int64,
            Self::UInt64(_) => DataKind::UInt64,
            Self::Float32(_) => DataKind::Float32,
            Self::Float64(_) => DataKind::Float64,
            Self::String(_) => DataKind::String,
        }
    }

    /// Returns the boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value widened to `i64`, if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int16(v) => Some(*v as i64),
            Self::UInt16(v) => Some(*v as i64),
            Self::Int32(v) => Some(*v as i64),
            Self::UInt32(v) => Some(*v as i64),
            Self::Int64(v) => Some(*v),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value widened to `f64`, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float32(v) => write!(f, "{}", v),
            Self::Float64(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_register_count() {
        assert_eq!(DataKind::UInt16.register_count(), 1);
        assert_eq!(DataKind::Float32.register_count(), 2);
        assert_eq!(DataKind::UInt64.register_count(), 4);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("float32".parse::<DataKind>().unwrap(), DataKind::Float32);
        assert_eq!("WORD".parse::<DataKind>().unwrap(), DataKind::UInt16);
        assert!("decimal".parse::<DataKind>().is_err());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int32(-7).as_i64(), Some(-7));
        assert_eq!(Value::Float32(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Bool(true).as_i64(), None);
        assert_eq!(Value::String("ok".into()).as_str(), Some("ok"));
    }

    #[test]
    fn test_kind_serde_names_match_canonical() {
        for kind in [
            DataKind::Bool,
            DataKind::Int16,
            DataKind::UInt16,
            DataKind::Int32,
            DataKind::UInt32,
            DataKind::Int64,
            DataKind::UInt64,
            DataKind::Float32,
            DataKind::Float64,
            DataKind::String,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
            let back: DataKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_value_serde_tagged() {
        let json = serde_json::to_string(&Value::UInt16(42)).unwrap();
        assert_eq!(json, r#"{"type":"uint16","value":42}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::UInt16(42));
    }
}
