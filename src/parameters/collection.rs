//! Ordered parameter schema with linking.

use crate::error::{DataGraphError, Result};
use crate::parameters::arguments::Arguments;
use crate::parameters::parameter::AnyParameter;
use crate::parameters::value::ArgValue;
use crate::structure::DataStructure;

/// A dependency of `child_key` on the value of `group_key`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterLink {
    pub group_key: String,
    pub child_key: String,
    pub associated: ArgValue,
}

/// A failure recorded while building a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    pub key: String,
    pub message: String,
}

impl From<DataGraphError> for SchemaError {
    fn from(err: DataGraphError) -> Self {
        match err {
            DataGraphError::DuplicateKey(key) => SchemaError {
                key,
                message: "duplicate parameter key".to_string(),
            },
            DataGraphError::InvalidParameter { key, message } => SchemaError { key, message },
            other => SchemaError {
                key: String::new(),
                message: other.to_string(),
            },
        }
    }
}

/// Ordered, unique-key collection of parameter descriptors.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    entries: Vec<AnyParameter>,
    links: Vec<ParameterLink>,
    schema_errors: Vec<SchemaError>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter; its name must be unique.
    pub fn insert(&mut self, parameter: AnyParameter) -> Result<()> {
        if self.contains(parameter.name()) {
            return Err(DataGraphError::DuplicateKey(parameter.name().to_string()));
        }
        self.entries.push(parameter);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    ///
    /// A rejected parameter is kept as a schema error and reported by every
    /// later [`validate`](Self::validate) call.
    pub fn with_parameter(mut self, parameter: AnyParameter) -> Self {
        if let Err(err) = self.insert(parameter) {
            tracing::error!("Invalid parameter schema: {}", err);
            self.schema_errors.push(err.into());
        }
        self
    }

    /// Builder form of [`link_parameters`](Self::link_parameters), recording
    /// failures like [`with_parameter`](Self::with_parameter).
    pub fn with_link(mut self, group_key: &str, child_key: &str, associated: impl Into<ArgValue>) -> Self {
        if let Err(err) = self.link_parameters(group_key, child_key, associated) {
            tracing::error!("Invalid parameter link: {}", err);
            self.schema_errors.push(err.into());
        }
        self
    }

    /// Errors recorded while building the schema.
    pub fn schema_errors(&self) -> &[SchemaError] {
        &self.schema_errors
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&AnyParameter> {
        self.entries.iter().find(|p| p.name() == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AnyParameter> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(AnyParameter::name)
    }

    pub fn links(&self) -> &[ParameterLink] {
        &self.links
    }

    /// Make `child_key` active only while `group_key` holds `associated`.
    ///
    /// A child may be linked to several values; it is active when any of
    /// them matches.
    pub fn link_parameters(&mut self, group_key: &str, child_key: &str, associated: impl Into<ArgValue>) -> Result<()> {
        let group = self
            .get(group_key)
            .ok_or_else(|| DataGraphError::parameter(group_key, "unknown parameter"))?;
        let linkable = group.as_value().map_or(false, |p| p.is_linkable());
        if !linkable {
            return Err(DataGraphError::parameter(group_key, "parameter is not linkable"));
        }
        if !self.contains(child_key) {
            return Err(DataGraphError::parameter(child_key, "unknown parameter"));
        }
        if group_key == child_key {
            return Err(DataGraphError::parameter(child_key, "cannot link a parameter to itself"));
        }
        self.links.push(ParameterLink {
            group_key: group_key.to_string(),
            child_key: child_key.to_string(),
            associated: associated.into(),
        });
        Ok(())
    }

    /// Whether `key` takes part in validation for these arguments.
    pub fn is_active(&self, key: &str, args: &Arguments) -> bool {
        let mut links = self.links.iter().filter(|l| l.child_key == key).peekable();
        if links.peek().is_none() {
            return true;
        }
        links.any(|link| {
            let Some(group) = self.get(&link.group_key).and_then(AnyParameter::as_value) else {
                return false;
            };
            let current = args
                .get(&link.group_key)
                .cloned()
                .unwrap_or_else(|| group.default_value());
            group.check_active(&current, &link.associated)
        })
    }

    /// Arguments holding every parameter's default.
    pub fn default_arguments(&self) -> Arguments {
        let mut args = Arguments::new();
        for parameter in &self.entries {
            args.insert_or_assign(parameter.name(), parameter.default_value());
        }
        args
    }

    /// Defaults overlaid with the given arguments.
    pub fn merge_defaults(&self, args: &Arguments) -> Arguments {
        self.default_arguments().merged_with(args)
    }

    /// Validate every active parameter, collecting all failures.
    pub fn validate(&self, args: &Arguments, ds: &DataStructure) -> std::result::Result<(), Vec<DataGraphError>> {
        let mut errors: Vec<DataGraphError> = self
            .schema_errors
            .iter()
            .map(|e| DataGraphError::parameter(&e.key, format!("invalid schema: {}", e.message)))
            .collect();
        for parameter in &self.entries {
            if !self.is_active(parameter.name(), args) {
                continue;
            }
            match args.get(parameter.name()) {
                Some(value) => {
                    if let Err(err) = parameter.validate(ds, value) {
                        errors.push(err.with_context(format!("Parameter '{}'", parameter.human_name())));
                    }
                }
                None => errors.push(DataGraphError::MissingInput(format!(
                    "argument '{}'",
                    parameter.name()
                ))),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Structured config for the given arguments, parameters without a value
    /// are written with their default.
    pub fn to_json(&self, args: &Arguments) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        for parameter in &self.entries {
            let value = args
                .get(parameter.name())
                .cloned()
                .unwrap_or_else(|| parameter.default_value());
            map.insert(parameter.name().to_string(), parameter.to_json(&value)?);
        }
        Ok(serde_json::Value::Object(map))
    }

    /// Parse structured config into arguments. Missing keys take defaults,
    /// unknown keys are ignored.
    pub fn from_json(&self, json: &serde_json::Value) -> Result<Arguments> {
        let object = json
            .as_object()
            .ok_or_else(|| DataGraphError::Serialization("arguments must be a JSON object".into()))?;
        let mut args = self.default_arguments();
        for (key, value) in object {
            match self.get(key) {
                Some(parameter) => args.insert_or_assign(key, parameter.from_json(value)?),
                None => tracing::warn!("Ignoring unknown argument '{}' in structured config", key),
            }
        }
        Ok(args)
    }
}
