//! Self-contained value parameters.

use crate::error::{DataGraphError, Result};
use crate::parameters::parameter::{json_error, ParamMeta, ParameterCategory, ParameterInfo, ValueParameter};
use crate::parameters::value::{ArgKind, ArgValue};
use crate::types::DataType;
use serde_json::json;

/// On/off flag. Linkable: other parameters can depend on its state.
#[derive(Debug, Clone)]
pub struct BoolParameter {
    meta: ParamMeta,
    default: bool,
}

impl BoolParameter {
    pub fn new(name: &str, human_name: &str, help_text: &str, default: bool) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default,
        }
    }
}

impl ParameterInfo for BoolParameter {
    fn meta(&self) -> &ParamMeta {
        &self.meta
    }

    fn category(&self) -> ParameterCategory {
        ParameterCategory::Value
    }

    fn default_value(&self) -> ArgValue {
        ArgValue::Bool(self.default)
    }

    fn accepted_kind(&self) -> ArgKind {
        ArgKind::Bool
    }

    fn to_json(&self, value: &ArgValue) -> Result<serde_json::Value> {
        self.check_kind(value)?;
        Ok(json!(value.as_bool()))
    }

    fn from_json(&self, json: &serde_json::Value) -> Result<ArgValue> {
        json.as_bool()
            .map(ArgValue::Bool)
            .ok_or_else(|| json_error(self.name(), "a boolean", json))
    }
}

impl ValueParameter for BoolParameter {
    fn validate(&self, _value: &ArgValue) -> Result<()> {
        Ok(())
    }

    fn is_linkable(&self) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn ValueParameter> {
        Box::new(self.clone())
    }
}

/// Integer or floating point number with an optional inclusive range.
#[derive(Debug, Clone)]
pub struct NumberParameter {
    meta: ParamMeta,
    integer: bool,
    default: f64,
    range: Option<(f64, f64)>,
}

impl NumberParameter {
    pub fn integer(name: &str, human_name: &str, help_text: &str, default: i64) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            integer: true,
            default: default as f64,
            range: None,
        }
    }

    pub fn float(name: &str, human_name: &str, help_text: &str, default: f64) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            integer: false,
            default,
            range: None,
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }
}

impl ParameterInfo for NumberParameter {
    fn meta(&self) -> &ParamMeta {
        &self.meta
    }

    fn category(&self) -> ParameterCategory {
        ParameterCategory::Value
    }

    fn default_value(&self) -> ArgValue {
        if self.integer {
            ArgValue::Int(self.default as i64)
        } else {
            ArgValue::Float(self.default)
        }
    }

    fn accepted_kind(&self) -> ArgKind {
        if self.integer {
            ArgKind::Int
        } else {
            ArgKind::Float
        }
    }

    fn to_json(&self, value: &ArgValue) -> Result<serde_json::Value> {
        self.check_kind(value)?;
        Ok(match value {
            ArgValue::Int(v) => json!(v),
            ArgValue::Float(v) => json!(v),
            _ => serde_json::Value::Null,
        })
    }

    fn from_json(&self, json: &serde_json::Value) -> Result<ArgValue> {
        if self.integer {
            json.as_i64()
                .map(ArgValue::Int)
                .ok_or_else(|| json_error(self.name(), "an integer", json))
        } else {
            json.as_f64()
                .map(ArgValue::Float)
                .ok_or_else(|| json_error(self.name(), "a number", json))
        }
    }
}

impl ValueParameter for NumberParameter {
    fn validate(&self, value: &ArgValue) -> Result<()> {
        let number = value
            .as_float()
            .ok_or_else(|| DataGraphError::parameter(self.name(), "not a number"))?;
        if !number.is_finite() {
            return Err(DataGraphError::parameter(self.name(), "value must be finite"));
        }
        if let Some((min, max)) = self.range {
            if number < min || number > max {
                return Err(DataGraphError::parameter(
                    self.name(),
                    format!("{} is outside the range [{}, {}]", number, min, max),
                ));
            }
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn ValueParameter> {
        Box::new(self.clone())
    }
}

/// Free text.
#[derive(Debug, Clone)]
pub struct StringParameter {
    meta: ParamMeta,
    default: String,
    allow_empty: bool,
}

impl StringParameter {
    pub fn new(name: &str, human_name: &str, help_text: &str, default: &str) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default: default.to_string(),
            allow_empty: true,
        }
    }

    pub fn non_empty(mut self) -> Self {
        self.allow_empty = false;
        self
    }
}

impl ParameterInfo for StringParameter {
    fn meta(&self) -> &ParamMeta {
        &self.meta
    }

    fn category(&self) -> ParameterCategory {
        ParameterCategory::Value
    }

    fn default_value(&self) -> ArgValue {
        ArgValue::String(self.default.clone())
    }

    fn accepted_kind(&self) -> ArgKind {
        ArgKind::String
    }

    fn to_json(&self, value: &ArgValue) -> Result<serde_json::Value> {
        self.check_kind(value)?;
        Ok(json!(value.as_str()))
    }

    fn from_json(&self, json: &serde_json::Value) -> Result<ArgValue> {
        json.as_str()
            .map(ArgValue::from)
            .ok_or_else(|| json_error(self.name(), "a string", json))
    }
}

impl ValueParameter for StringParameter {
    fn validate(&self, value: &ArgValue) -> Result<()> {
        if !self.allow_empty && value.as_str().map_or(true, str::is_empty) {
            return Err(DataGraphError::parameter(self.name(), "value must not be empty"));
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn ValueParameter> {
        Box::new(self.clone())
    }
}

/// One of a fixed list of options, stored as an index. Linkable.
#[derive(Debug, Clone)]
pub struct ChoicesParameter {
    meta: ParamMeta,
    default: usize,
    choices: Vec<String>,
}

impl ChoicesParameter {
    pub fn new(name: &str, human_name: &str, help_text: &str, default: usize, choices: &[&str]) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default,
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl ParameterInfo for ChoicesParameter {
    fn meta(&self) -> &ParamMeta {
        &self.meta
    }

    fn category(&self) -> ParameterCategory {
        ParameterCategory::Value
    }

    fn default_value(&self) -> ArgValue {
        ArgValue::Choice(self.default)
    }

    fn accepted_kind(&self) -> ArgKind {
        ArgKind::Choice
    }

    fn to_json(&self, value: &ArgValue) -> Result<serde_json::Value> {
        self.check_kind(value)?;
        match value {
            ArgValue::Choice(index) => Ok(json!(index)),
            _ => Ok(serde_json::Value::Null),
        }
    }

    fn from_json(&self, json: &serde_json::Value) -> Result<ArgValue> {
        json.as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .map(ArgValue::Choice)
            .ok_or_else(|| json_error(self.name(), "a choice index", json))
    }
}

impl ValueParameter for ChoicesParameter {
    fn validate(&self, value: &ArgValue) -> Result<()> {
        match value {
            ArgValue::Choice(index) if *index < self.choices.len() => Ok(()),
            ArgValue::Choice(index) => Err(DataGraphError::parameter(
                self.name(),
                format!("choice {} is out of range, {} options available", index, self.choices.len()),
            )),
            _ => Err(DataGraphError::parameter(self.name(), "not a choice")),
        }
    }

    fn is_linkable(&self) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn ValueParameter> {
        Box::new(self.clone())
    }
}

/// Fixed-length numeric vector, one name per component.
#[derive(Debug, Clone)]
pub struct VectorParameter {
    meta: ParamMeta,
    default: Vec<f64>,
    names: Vec<String>,
}

impl VectorParameter {
    pub fn new(name: &str, human_name: &str, help_text: &str, default: Vec<f64>, names: &[&str]) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default,
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn component_names(&self) -> &[String] {
        &self.names
    }
}

impl ParameterInfo for VectorParameter {
    fn meta(&self) -> &ParamMeta {
        &self.meta
    }

    fn category(&self) -> ParameterCategory {
        ParameterCategory::Value
    }

    fn default_value(&self) -> ArgValue {
        ArgValue::Vector(self.default.clone())
    }

    fn accepted_kind(&self) -> ArgKind {
        ArgKind::Vector
    }

    fn to_json(&self, value: &ArgValue) -> Result<serde_json::Value> {
        self.check_kind(value)?;
        match value {
            ArgValue::Vector(values) => Ok(json!(values)),
            _ => Ok(serde_json::Value::Null),
        }
    }

    fn from_json(&self, json: &serde_json::Value) -> Result<ArgValue> {
        let items = json
            .as_array()
            .ok_or_else(|| json_error(self.name(), "an array of numbers", json))?;
        items
            .iter()
            .map(|item| item.as_f64().ok_or_else(|| json_error(self.name(), "a number", item)))
            .collect::<Result<Vec<f64>>>()
            .map(ArgValue::Vector)
    }
}

impl ValueParameter for VectorParameter {
    fn validate(&self, value: &ArgValue) -> Result<()> {
        let ArgValue::Vector(values) = value else {
            return Err(DataGraphError::parameter(self.name(), "not a vector"));
        };
        if values.len() != self.names.len() {
            return Err(DataGraphError::parameter(
                self.name(),
                format!("expected {} components, got {}", self.names.len(), values.len()),
            ));
        }
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(DataGraphError::parameter(
                self.name(),
                format!("component '{}' is not finite", self.names[position]),
            ));
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn ValueParameter> {
        Box::new(self.clone())
    }
}

/// Element kind selection.
#[derive(Debug, Clone)]
pub struct DataTypeParameter {
    meta: ParamMeta,
    default: DataType,
}

impl DataTypeParameter {
    pub fn new(name: &str, human_name: &str, help_text: &str, default: DataType) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default,
        }
    }
}

impl ParameterInfo for DataTypeParameter {
    fn meta(&self) -> &ParamMeta {
        &self.meta
    }

    fn category(&self) -> ParameterCategory {
        ParameterCategory::Value
    }

    fn default_value(&self) -> ArgValue {
        ArgValue::DataType(self.default)
    }

    fn accepted_kind(&self) -> ArgKind {
        ArgKind::DataType
    }

    fn to_json(&self, value: &ArgValue) -> Result<serde_json::Value> {
        self.check_kind(value)?;
        match value {
            ArgValue::DataType(data_type) => Ok(json!(data_type.name())),
            _ => Ok(serde_json::Value::Null),
        }
    }

    fn from_json(&self, json: &serde_json::Value) -> Result<ArgValue> {
        let text = json
            .as_str()
            .ok_or_else(|| json_error(self.name(), "a data type name", json))?;
        Ok(ArgValue::DataType(text.parse()?))
    }
}

impl ValueParameter for DataTypeParameter {
    fn validate(&self, _value: &ArgValue) -> Result<()> {
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn ValueParameter> {
        Box::new(self.clone())
    }
}

/// Non-empty list of positive extents, used for tuple and component shapes.
#[derive(Debug, Clone)]
pub struct ShapeParameter {
    meta: ParamMeta,
    default: Vec<usize>,
}

impl ShapeParameter {
    pub fn new(name: &str, human_name: &str, help_text: &str, default: Vec<usize>) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default,
        }
    }
}

impl ParameterInfo for ShapeParameter {
    fn meta(&self) -> &ParamMeta {
        &self.meta
    }

    fn category(&self) -> ParameterCategory {
        ParameterCategory::Value
    }

    fn default_value(&self) -> ArgValue {
        ArgValue::Shape(self.default.clone())
    }

    fn accepted_kind(&self) -> ArgKind {
        ArgKind::Shape
    }

    fn to_json(&self, value: &ArgValue) -> Result<serde_json::Value> {
        self.check_kind(value)?;
        match value {
            ArgValue::Shape(shape) => Ok(json!(shape)),
            _ => Ok(serde_json::Value::Null),
        }
    }

    fn from_json(&self, json: &serde_json::Value) -> Result<ArgValue> {
        let items = json
            .as_array()
            .ok_or_else(|| json_error(self.name(), "an array of extents", json))?;
        items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|v| usize::try_from(v).ok())
                    .ok_or_else(|| json_error(self.name(), "a non-negative integer", item))
            })
            .collect::<Result<Vec<usize>>>()
            .map(ArgValue::Shape)
    }
}

impl ValueParameter for ShapeParameter {
    fn validate(&self, value: &ArgValue) -> Result<()> {
        let ArgValue::Shape(shape) = value else {
            return Err(DataGraphError::parameter(self.name(), "not a shape"));
        };
        if shape.is_empty() {
            return Err(DataGraphError::parameter(self.name(), "shape must have at least one dimension"));
        }
        if shape.contains(&0) {
            return Err(DataGraphError::parameter(
                self.name(),
                format!("shape {:?} has a zero extent", shape),
            ));
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn ValueParameter> {
        Box::new(self.clone())
    }
}
