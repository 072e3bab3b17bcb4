//! Core scalar types for the datagraph engine
//!
//! This module contains the closed set of element kinds an array can store and
//! the glue that lets generic code be written once and instantiated for each
//! of them.
//!
//! # Main Types
//!
//! - [`DataType`] - Enum of supported element kinds (int8 ... float64, boolean)
//! - [`Element`] - Trait implemented by the Rust type behind each kind
//! - [`dispatch_data_type!`](crate::dispatch_data_type) - Runs a generic
//!   expression for the concrete type selected at runtime
//!
//! # Dispatch
//!
//! Runtime kind to compile-time type conversion happens in exactly one place,
//! the dispatch macro. Adding a kind means extending [`DataType`], implementing
//! [`Element`] and adding one arm to the macro.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataGraphError;

/// The element kind stored by a data array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataType {
    /// 8-bit signed integer
    Int8,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit signed integer
    Int16,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit signed integer
    #[default]
    Int32,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Boolean value
    Boolean,
}

impl DataType {
    /// All supported kinds, in their canonical order
    pub fn all() -> &'static [DataType] {
        &[
            DataType::Int8,
            DataType::UInt8,
            DataType::Int16,
            DataType::UInt16,
            DataType::Int32,
            DataType::UInt32,
            DataType::Int64,
            DataType::UInt64,
            DataType::Float32,
            DataType::Float64,
            DataType::Boolean,
        ]
    }

    /// Returns the size in bytes of one element
    pub fn size_bytes(&self) -> usize {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Boolean => 1,
            DataType::Int16 | DataType::UInt16 => 2,
            DataType::Int32 | DataType::UInt32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::UInt64 | DataType::Float64 => 8,
        }
    }

    /// Canonical lower-case name, used in containers and parameters
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int8 => "int8",
            DataType::UInt8 => "uint8",
            DataType::Int16 => "int16",
            DataType::UInt16 => "uint16",
            DataType::Int32 => "int32",
            DataType::UInt32 => "uint32",
            DataType::Int64 => "int64",
            DataType::UInt64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Boolean => "boolean",
        }
    }

    /// Position of this kind in [`DataType::all`]
    pub fn index(&self) -> usize {
        DataType::all()
            .iter()
            .position(|t| t == self)
            .unwrap_or_default()
    }

    /// Kind at a position of [`DataType::all`]
    pub fn from_index(index: usize) -> Option<DataType> {
        DataType::all().get(index).copied()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    pub fn is_integer(&self) -> bool {
        !self.is_float() && *self != DataType::Boolean
    }

    /// Inclusive representable range, as f64
    pub fn value_range(&self) -> (f64, f64) {
        match self {
            DataType::Int8 => (i8::MIN as f64, i8::MAX as f64),
            DataType::UInt8 => (0.0, u8::MAX as f64),
            DataType::Int16 => (i16::MIN as f64, i16::MAX as f64),
            DataType::UInt16 => (0.0, u16::MAX as f64),
            DataType::Int32 => (i32::MIN as f64, i32::MAX as f64),
            DataType::UInt32 => (0.0, u32::MAX as f64),
            DataType::Int64 => (i64::MIN as f64, i64::MAX as f64),
            DataType::UInt64 => (0.0, u64::MAX as f64),
            DataType::Float32 => (f32::MIN as f64, f32::MAX as f64),
            DataType::Float64 => (f64::MIN, f64::MAX),
            DataType::Boolean => (0.0, 1.0),
        }
    }

    /// Check whether `value` can be stored without leaving the kind's range
    pub fn accepts_value(&self, value: f64) -> bool {
        if value.is_nan() {
            return self.is_float();
        }
        let (min, max) = self.value_range();
        if value < min || value > max {
            return false;
        }
        !self.is_integer() || value.fract() == 0.0
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DataType {
    type Err = DataGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::all()
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| DataGraphError::UnsupportedType(s.to_string()))
    }
}

/// A Rust scalar type that can live in a data array
pub trait Element:
    Copy + Default + PartialEq + PartialOrd + fmt::Debug + Send + Sync + 'static
{
    /// The runtime kind this type corresponds to
    const DATA_TYPE: DataType;

    /// Append the little-endian encoding of `self`
    fn write_le(self, out: &mut Vec<u8>);

    /// Decode from exactly `DATA_TYPE.size_bytes()` little-endian bytes
    fn read_le(bytes: &[u8]) -> Self;

    fn to_f64(self) -> f64;

    /// Saturating conversion from f64
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_numeric_element {
    ($ty:ty, $kind:ident) => {
        impl Element for $ty {
            const DATA_TYPE: DataType = DataType::$kind;

            #[inline]
            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(&bytes[..std::mem::size_of::<$ty>()]);
                <$ty>::from_le_bytes(buf)
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }
        }
    };
}

impl_numeric_element!(i8, Int8);
impl_numeric_element!(u8, UInt8);
impl_numeric_element!(i16, Int16);
impl_numeric_element!(u16, UInt16);
impl_numeric_element!(i32, Int32);
impl_numeric_element!(u32, UInt32);
impl_numeric_element!(i64, Int64);
impl_numeric_element!(u64, UInt64);
impl_numeric_element!(f32, Float32);
impl_numeric_element!(f64, Float64);

impl Element for bool {
    const DATA_TYPE: DataType = DataType::Boolean;

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value != 0.0
    }
}

/// Evaluate `$body` with `$T` bound to the Rust type behind `$data_type`.
///
/// ```ignore
/// let bytes = dispatch_data_type!(data_type, T => std::mem::size_of::<T>());
/// ```
#[macro_export]
macro_rules! dispatch_data_type {
    ($data_type:expr, $T:ident => $body:expr) => {
        match $data_type {
            $crate::types::DataType::Int8 => {
                type $T = i8;
                $body
            }
            $crate::types::DataType::UInt8 => {
                type $T = u8;
                $body
            }
            $crate::types::DataType::Int16 => {
                type $T = i16;
                $body
            }
            $crate::types::DataType::UInt16 => {
                type $T = u16;
                $body
            }
            $crate::types::DataType::Int32 => {
                type $T = i32;
                $body
            }
            $crate::types::DataType::UInt32 => {
                type $T = u32;
                $body
            }
            $crate::types::DataType::Int64 => {
                type $T = i64;
                $body
            }
            $crate::types::DataType::UInt64 => {
                type $T = u64;
                $body
            }
            $crate::types::DataType::Float32 => {
                type $T = f32;
                $body
            }
            $crate::types::DataType::Float64 => {
                type $T = f64;
                $body
            }
            $crate::types::DataType::Boolean => {
                type $T = bool;
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_bytes_matches_rust_types() {
        for &data_type in DataType::all() {
            let size = dispatch_data_type!(data_type, T => std::mem::size_of::<T>());
            assert_eq!(size, data_type.size_bytes(), "{}", data_type);
        }
    }

    #[test]
    fn test_dispatch_reports_own_kind() {
        for &data_type in DataType::all() {
            let kind = dispatch_data_type!(data_type, T => <T as Element>::DATA_TYPE);
            assert_eq!(kind, data_type);
        }
    }

    #[test]
    fn test_name_parse() {
        for &data_type in DataType::all() {
            assert_eq!(data_type.name().parse::<DataType>().unwrap(), data_type);
        }
        assert_eq!("Float32".parse::<DataType>().unwrap(), DataType::Float32);
        assert!("complex64".parse::<DataType>().is_err());
    }

    #[test]
    fn test_index_round_trip() {
        for &data_type in DataType::all() {
            assert_eq!(DataType::from_index(data_type.index()), Some(data_type));
        }
        assert_eq!(DataType::from_index(99), None);
    }

    #[test]
    fn test_accepts_value() {
        assert!(DataType::UInt8.accepts_value(255.0));
        assert!(!DataType::UInt8.accepts_value(256.0));
        assert!(!DataType::Int32.accepts_value(1.5));
        assert!(DataType::Float32.accepts_value(1.5));
        assert!(DataType::Float64.accepts_value(f64::NAN));
        assert!(!DataType::Int8.accepts_value(f64::NAN));
    }

    #[test]
    fn test_le_encoding() {
        let mut out = Vec::new();
        0x0102_0304u32.write_le(&mut out);
        assert_eq!(out, vec![4, 3, 2, 1]);
        assert_eq!(u32::read_le(&out), 0x0102_0304);

        out.clear();
        true.write_le(&mut out);
        assert!(bool::read_le(&out));
    }
}
