//! Runtime argument values.
//!
//! `ArgValue` is the type-erased value stored in [`Arguments`](super::Arguments).
//! Typed retrieval goes through [`FromArgValue`].

use crate::structure::DataPath;
use crate::types::DataType;
use std::fmt;

/// Kind tag of an [`ArgValue`], used as a parameter's accepted kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Bool,
    Int,
    Float,
    String,
    Choice,
    Vector,
    DataType,
    Shape,
    Path,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgKind::Bool => "bool",
            ArgKind::Int => "integer",
            ArgKind::Float => "float",
            ArgKind::String => "string",
            ArgKind::Choice => "choice",
            ArgKind::Vector => "vector",
            ArgKind::DataType => "data type",
            ArgKind::Shape => "shape",
            ArgKind::Path => "path",
        };
        f.write_str(name)
    }
}

/// A runtime argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Index into a choices list.
    Choice(usize),
    Vector(Vec<f64>),
    DataType(DataType),
    Shape(Vec<usize>),
    Path(DataPath),
}

impl ArgValue {
    pub fn kind(&self) -> ArgKind {
        match self {
            ArgValue::Bool(_) => ArgKind::Bool,
            ArgValue::Int(_) => ArgKind::Int,
            ArgValue::Float(_) => ArgKind::Float,
            ArgValue::String(_) => ArgKind::String,
            ArgValue::Choice(_) => ArgKind::Choice,
            ArgValue::Vector(_) => ArgKind::Vector,
            ArgValue::DataType(_) => ArgKind::DataType,
            ArgValue::Shape(_) => ArgKind::Shape,
            ArgValue::Path(_) => ArgKind::Path,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgValue::Float(v) => Some(*v),
            ArgValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&DataPath> {
        match self {
            ArgValue::Path(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(v) => write!(f, "{}", v),
            ArgValue::Int(v) => write!(f, "{}", v),
            ArgValue::Float(v) => write!(f, "{}", v),
            ArgValue::String(v) => write!(f, "\"{}\"", v),
            ArgValue::Choice(v) => write!(f, "choice #{}", v),
            ArgValue::Vector(v) => write!(f, "{:?}", v),
            ArgValue::DataType(v) => write!(f, "{}", v),
            ArgValue::Shape(v) => write!(f, "{:?}", v),
            ArgValue::Path(v) => write!(f, "'{}'", v),
        }
    }
}

macro_rules! arg_value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for ArgValue {
                fn from(value: $ty) -> Self {
                    ArgValue::$variant(value)
                }
            }
        )+
    };
}

arg_value_from! {
    bool => Bool,
    i64 => Int,
    f64 => Float,
    String => String,
    usize => Choice,
    Vec<f64> => Vector,
    DataType => DataType,
    Vec<usize> => Shape,
    DataPath => Path,
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::String(value.to_string())
    }
}

/// Types that can be read out of an [`ArgValue`].
pub trait FromArgValue: Sized {
    const KIND: ArgKind;

    fn from_arg(value: &ArgValue) -> Option<Self>;
}

macro_rules! from_arg_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl FromArgValue for $ty {
                const KIND: ArgKind = ArgKind::$variant;

                fn from_arg(value: &ArgValue) -> Option<Self> {
                    match value {
                        ArgValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )+
    };
}

from_arg_value! {
    bool => Bool,
    i64 => Int,
    f64 => Float,
    String => String,
    usize => Choice,
    Vec<f64> => Vector,
    DataType => DataType,
    Vec<usize> => Shape,
    DataPath => Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(ArgValue::from(true).as_bool(), Some(true));
        assert_eq!(ArgValue::from(42i64).as_int(), Some(42));
        assert_eq!(ArgValue::from(42i64).as_float(), Some(42.0));
        assert_eq!(ArgValue::from("name").as_str(), Some("name"));
        assert_eq!(ArgValue::from(2usize).kind(), ArgKind::Choice);
        assert_eq!(ArgValue::from(vec![2usize, 3]).kind(), ArgKind::Shape);
    }

    #[test]
    fn test_from_arg_is_strict() {
        let value = ArgValue::Int(3);
        assert_eq!(i64::from_arg(&value), Some(3));
        assert_eq!(f64::from_arg(&value), None);
        assert_eq!(usize::from_arg(&value), None);
    }
}
