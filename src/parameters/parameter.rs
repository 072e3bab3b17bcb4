//! Parameter descriptor traits.
//!
//! - **`ValueParameter`**: self-contained values (numbers, flags, choices).
//!   Validation needs nothing but the value.
//! - **`DataParameter`**: path-valued parameters whose validation looks at the
//!   live [`DataStructure`] for existence, kind and collisions.
//!
//! Both share [`ParameterInfo`] for identity and structured-config
//! (de)serialization. [`AnyParameter`] stores either kind in a
//! [`Parameters`](super::Parameters) collection.

use crate::error::{DataGraphError, Result};
use crate::parameters::value::{ArgKind, ArgValue};
use crate::structure::{DataObject, DataStructure};
use std::fmt;

/// Name, human name and help text shared by every parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMeta {
    pub name: String,
    pub human_name: String,
    pub help_text: String,
}

impl ParamMeta {
    pub fn new(name: impl Into<String>, human_name: impl Into<String>, help_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            human_name: human_name.into(),
            help_text: help_text.into(),
        }
    }
}

/// Where a parameter shows up in an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterCategory {
    /// Plain value input
    Value,
    /// Selects existing data
    RequiredData,
    /// Names data the filter will create
    CreatedData,
}

/// Common surface of every parameter kind.
pub trait ParameterInfo: fmt::Debug + Send + Sync {
    fn meta(&self) -> &ParamMeta;

    fn category(&self) -> ParameterCategory;

    fn default_value(&self) -> ArgValue;

    fn accepted_kind(&self) -> ArgKind;

    /// Structured-config form of a value.
    fn to_json(&self, value: &ArgValue) -> Result<serde_json::Value>;

    /// Parse a structured-config value; the result is not yet validated.
    fn from_json(&self, json: &serde_json::Value) -> Result<ArgValue>;

    fn name(&self) -> &str {
        &self.meta().name
    }

    fn human_name(&self) -> &str {
        &self.meta().human_name
    }

    fn help_text(&self) -> &str {
        &self.meta().help_text
    }

    /// Reject values of the wrong kind before any domain checks run.
    fn check_kind(&self, value: &ArgValue) -> Result<()> {
        if value.kind() != self.accepted_kind() {
            return Err(DataGraphError::parameter(
                self.name(),
                format!("expected a {} value, got {}", self.accepted_kind(), value.kind()),
            ));
        }
        Ok(())
    }
}

/// A parameter whose value stands on its own.
pub trait ValueParameter: ParameterInfo {
    fn validate(&self, value: &ArgValue) -> Result<()>;

    /// Whether other parameters may be linked to this one.
    fn is_linkable(&self) -> bool {
        false
    }

    /// Linked parameters are active when this returns true for the current
    /// value of the controlling parameter.
    fn check_active(&self, current: &ArgValue, associated: &ArgValue) -> bool {
        current == associated
    }

    fn clone_box(&self) -> Box<dyn ValueParameter>;
}

/// A parameter naming a location in the object graph.
pub trait DataParameter: ParameterInfo {
    /// Check the path against the current graph.
    fn validate_path(&self, ds: &DataStructure, value: &ArgValue) -> Result<()>;

    /// Object addressed by the value; fails when there is none.
    fn resolve<'a>(&self, ds: &'a DataStructure, value: &ArgValue) -> Result<&'a DataObject> {
        let path = value
            .as_path()
            .ok_or_else(|| DataGraphError::parameter(self.name(), "value is not a path"))?;
        ds.get_data(path)
            .ok_or_else(|| DataGraphError::MissingInput(path.to_string()))
    }

    fn clone_box(&self) -> Box<dyn DataParameter>;
}

/// Either parameter kind.
#[derive(Debug)]
pub enum AnyParameter {
    Value(Box<dyn ValueParameter>),
    Data(Box<dyn DataParameter>),
}

impl Clone for AnyParameter {
    fn clone(&self) -> Self {
        match self {
            AnyParameter::Value(p) => AnyParameter::Value(p.clone_box()),
            AnyParameter::Data(p) => AnyParameter::Data(p.clone_box()),
        }
    }
}

impl AnyParameter {
    pub fn value(parameter: impl ValueParameter + 'static) -> Self {
        AnyParameter::Value(Box::new(parameter))
    }

    pub fn data(parameter: impl DataParameter + 'static) -> Self {
        AnyParameter::Data(Box::new(parameter))
    }

    pub fn name(&self) -> &str {
        match self {
            AnyParameter::Value(p) => p.name(),
            AnyParameter::Data(p) => p.name(),
        }
    }

    pub fn human_name(&self) -> &str {
        match self {
            AnyParameter::Value(p) => p.human_name(),
            AnyParameter::Data(p) => p.human_name(),
        }
    }

    pub fn help_text(&self) -> &str {
        match self {
            AnyParameter::Value(p) => p.help_text(),
            AnyParameter::Data(p) => p.help_text(),
        }
    }

    pub fn category(&self) -> ParameterCategory {
        match self {
            AnyParameter::Value(p) => p.category(),
            AnyParameter::Data(p) => p.category(),
        }
    }

    pub fn default_value(&self) -> ArgValue {
        match self {
            AnyParameter::Value(p) => p.default_value(),
            AnyParameter::Data(p) => p.default_value(),
        }
    }

    pub fn accepted_kind(&self) -> ArgKind {
        match self {
            AnyParameter::Value(p) => p.accepted_kind(),
            AnyParameter::Data(p) => p.accepted_kind(),
        }
    }

    pub fn to_json(&self, value: &ArgValue) -> Result<serde_json::Value> {
        match self {
            AnyParameter::Value(p) => p.to_json(value),
            AnyParameter::Data(p) => p.to_json(value),
        }
    }

    pub fn from_json(&self, json: &serde_json::Value) -> Result<ArgValue> {
        match self {
            AnyParameter::Value(p) => p.from_json(json),
            AnyParameter::Data(p) => p.from_json(json),
        }
    }

    /// Kind check followed by the parameter's own validation.
    pub fn validate(&self, ds: &DataStructure, value: &ArgValue) -> Result<()> {
        match self {
            AnyParameter::Value(p) => {
                p.check_kind(value)?;
                p.validate(value)
            }
            AnyParameter::Data(p) => {
                p.check_kind(value)?;
                p.validate_path(ds, value)
            }
        }
    }

    pub fn as_value(&self) -> Option<&dyn ValueParameter> {
        match self {
            AnyParameter::Value(p) => Some(p.as_ref()),
            AnyParameter::Data(_) => None,
        }
    }

    pub fn as_data(&self) -> Option<&dyn DataParameter> {
        match self {
            AnyParameter::Data(p) => Some(p.as_ref()),
            AnyParameter::Value(_) => None,
        }
    }
}

/// Helper for `from_json` implementations.
pub(crate) fn json_error(name: &str, expected: &str, json: &serde_json::Value) -> DataGraphError {
    DataGraphError::parameter(name, format!("expected {} in structured config, got {}", expected, json))
}
