//! Path-valued parameters that validate against the live graph.
//!
//! Creation parameters require the target path to be free; selection
//! parameters require it to exist and to be of an accepted kind. All of them
//! store an [`ArgValue::Path`] and use the path's text form as structured
//! config.

use crate::error::{DataGraphError, Result};
use crate::parameters::parameter::{json_error, DataParameter, ParamMeta, ParameterCategory, ParameterInfo};
use crate::parameters::value::{ArgKind, ArgValue};
use crate::structure::{AnyDataArray, DataPath, DataStructure, ObjectType};
use crate::types::DataType;
use serde_json::json;

macro_rules! impl_path_parameter_info {
    ($ty:ty, $category:expr) => {
        impl ParameterInfo for $ty {
            fn meta(&self) -> &ParamMeta {
                &self.meta
            }

            fn category(&self) -> ParameterCategory {
                $category
            }

            fn default_value(&self) -> ArgValue {
                ArgValue::Path(self.default.clone())
            }

            fn accepted_kind(&self) -> ArgKind {
                ArgKind::Path
            }

            fn to_json(&self, value: &ArgValue) -> Result<serde_json::Value> {
                self.check_kind(value)?;
                Ok(json!(value.as_path().map(ToString::to_string)))
            }

            fn from_json(&self, json: &serde_json::Value) -> Result<ArgValue> {
                let text = json
                    .as_str()
                    .ok_or_else(|| json_error(self.name(), "a data path string", json))?;
                Ok(ArgValue::Path(DataPath::from_string(text)?))
            }
        }
    };
}

fn path_of<'a>(name: &str, value: &'a ArgValue) -> Result<&'a DataPath> {
    value
        .as_path()
        .ok_or_else(|| DataGraphError::parameter(name, "value is not a path"))
}

/// Target must be a non-empty path that is not taken yet.
fn check_free(ds: &DataStructure, path: &DataPath) -> Result<()> {
    let name = path.target_name()?;
    if ds.get_data(path).is_some() {
        return Err(DataGraphError::NameCollision {
            name: name.to_string(),
            parent: format!("'{}'", path.parent()),
        });
    }
    Ok(())
}

/// Target must exist.
fn check_exists(ds: &DataStructure, path: &DataPath) -> Result<()> {
    if path.is_empty() {
        return Err(DataGraphError::EmptyPath);
    }
    if ds.get_data(path).is_none() {
        return Err(DataGraphError::MissingInput(path.to_string()));
    }
    Ok(())
}

/// Path of an array the filter will create.
#[derive(Debug, Clone)]
pub struct ArrayCreationParameter {
    meta: ParamMeta,
    default: DataPath,
}

impl ArrayCreationParameter {
    pub fn new(name: &str, human_name: &str, help_text: &str, default: DataPath) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default,
        }
    }
}

impl_path_parameter_info!(ArrayCreationParameter, ParameterCategory::CreatedData);

impl DataParameter for ArrayCreationParameter {
    fn validate_path(&self, ds: &DataStructure, value: &ArgValue) -> Result<()> {
        check_free(ds, path_of(self.name(), value)?)
    }

    fn clone_box(&self) -> Box<dyn DataParameter> {
        Box::new(self.clone())
    }
}

/// Existing array, optionally restricted to some element kinds.
#[derive(Debug, Clone)]
pub struct ArraySelectionParameter {
    meta: ParamMeta,
    default: DataPath,
    allowed_types: Vec<DataType>,
}

impl ArraySelectionParameter {
    pub fn new(name: &str, human_name: &str, help_text: &str, default: DataPath) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default,
            allowed_types: Vec::new(),
        }
    }

    /// Restrict accepted element kinds. An empty list accepts all.
    pub fn with_allowed_types(mut self, types: &[DataType]) -> Self {
        self.allowed_types = types.to_vec();
        self
    }

    pub fn allowed_types(&self) -> &[DataType] {
        &self.allowed_types
    }
}

impl_path_parameter_info!(ArraySelectionParameter, ParameterCategory::RequiredData);

impl DataParameter for ArraySelectionParameter {
    fn validate_path(&self, ds: &DataStructure, value: &ArgValue) -> Result<()> {
        let path = path_of(self.name(), value)?;
        check_exists(ds, path)?;
        let array = ds.get_data_as::<AnyDataArray>(path)?;
        if !self.allowed_types.is_empty() && !self.allowed_types.contains(&array.data_type()) {
            let allowed: Vec<&str> = self.allowed_types.iter().map(DataType::name).collect();
            return Err(DataGraphError::type_mismatch(
                path,
                allowed.join(" | "),
                array.data_type(),
            ));
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn DataParameter> {
        Box::new(self.clone())
    }
}

/// Path of a group the filter will create.
#[derive(Debug, Clone)]
pub struct DataGroupCreationParameter {
    meta: ParamMeta,
    default: DataPath,
}

impl DataGroupCreationParameter {
    pub fn new(name: &str, human_name: &str, help_text: &str, default: DataPath) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default,
        }
    }
}

impl_path_parameter_info!(DataGroupCreationParameter, ParameterCategory::CreatedData);

impl DataParameter for DataGroupCreationParameter {
    fn validate_path(&self, ds: &DataStructure, value: &ArgValue) -> Result<()> {
        check_free(ds, path_of(self.name(), value)?)
    }

    fn clone_box(&self) -> Box<dyn DataParameter> {
        Box::new(self.clone())
    }
}

/// Existing group-like object of an accepted kind.
#[derive(Debug, Clone)]
pub struct DataGroupSelectionParameter {
    meta: ParamMeta,
    default: DataPath,
    allowed: Vec<ObjectType>,
}

impl DataGroupSelectionParameter {
    /// Accepts every group-like kind.
    pub fn new(name: &str, human_name: &str, help_text: &str, default: DataPath) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default,
            allowed: ObjectType::all()
                .iter()
                .copied()
                .filter(ObjectType::is_group_like)
                .collect(),
        }
    }

    pub fn with_allowed_kinds(mut self, kinds: &[ObjectType]) -> Self {
        self.allowed = kinds.to_vec();
        self
    }
}

impl_path_parameter_info!(DataGroupSelectionParameter, ParameterCategory::RequiredData);

impl DataParameter for DataGroupSelectionParameter {
    fn validate_path(&self, ds: &DataStructure, value: &ArgValue) -> Result<()> {
        let path = path_of(self.name(), value)?;
        check_exists(ds, path)?;
        let object_type = ds
            .get_data(path)
            .map(|object| object.object_type())
            .ok_or_else(|| DataGraphError::MissingInput(path.to_string()))?;
        if !self.allowed.contains(&object_type) {
            let allowed: Vec<&str> = self.allowed.iter().map(ObjectType::type_name).collect();
            return Err(DataGraphError::type_mismatch(path, allowed.join(" | "), object_type));
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn DataParameter> {
        Box::new(self.clone())
    }
}

/// Any existing object.
#[derive(Debug, Clone)]
pub struct DataPathSelectionParameter {
    meta: ParamMeta,
    default: DataPath,
}

impl DataPathSelectionParameter {
    pub fn new(name: &str, human_name: &str, help_text: &str, default: DataPath) -> Self {
        Self {
            meta: ParamMeta::new(name, human_name, help_text),
            default,
        }
    }
}

impl_path_parameter_info!(DataPathSelectionParameter, ParameterCategory::RequiredData);

impl DataParameter for DataPathSelectionParameter {
    fn validate_path(&self, ds: &DataStructure, value: &ArgValue) -> Result<()> {
        check_exists(ds, path_of(self.name(), value)?)
    }

    fn clone_box(&self) -> Box<dyn DataParameter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_path;
    use crate::structure::StoreMode;

    fn graph() -> DataStructure {
        let mut ds = DataStructure::new();
        let group = ds.create_group("Data", None).unwrap();
        ds.create_array::<f32>("Values", &[4], &[1], StoreMode::Materialized, Some(group))
            .unwrap();
        ds
    }

    #[test]
    fn test_creation_requires_free_path() {
        let ds = graph();
        let param = ArrayCreationParameter::new("out", "Output", "", DataPath::root());
        let taken = ArgValue::Path(data_path!["Data", "Values"]);
        assert!(matches!(
            param.validate_path(&ds, &taken),
            Err(DataGraphError::NameCollision { .. })
        ));
        assert!(param
            .validate_path(&ds, &ArgValue::Path(data_path!["Data", "New"]))
            .is_ok());
        assert!(matches!(
            param.validate_path(&ds, &ArgValue::Path(DataPath::root())),
            Err(DataGraphError::EmptyPath)
        ));
    }

    #[test]
    fn test_array_selection_kinds() {
        let ds = graph();
        let param = ArraySelectionParameter::new("in", "Input", "", DataPath::root())
            .with_allowed_types(&[DataType::Int32]);
        let values = ArgValue::Path(data_path!["Data", "Values"]);
        assert!(matches!(
            param.validate_path(&ds, &values),
            Err(DataGraphError::TypeMismatch { .. })
        ));
        assert!(matches!(
            param.validate_path(&ds, &ArgValue::Path(data_path!["Data"])),
            Err(DataGraphError::TypeMismatch { .. })
        ));
        assert!(matches!(
            param.validate_path(&ds, &ArgValue::Path(data_path!["Missing"])),
            Err(DataGraphError::MissingInput(_))
        ));
    }

    #[test]
    fn test_group_selection_and_resolve() {
        let ds = graph();
        let param = DataGroupSelectionParameter::new("group", "Group", "", DataPath::root());
        let data = ArgValue::Path(data_path!["Data"]);
        param.validate_path(&ds, &data).unwrap();
        assert_eq!(param.resolve(&ds, &data).unwrap().name(), "Data");
        assert!(param
            .validate_path(&ds, &ArgValue::Path(data_path!["Data", "Values"]))
            .is_err());
    }

    #[test]
    fn test_path_json() {
        let param = DataPathSelectionParameter::new("p", "P", "", DataPath::root());
        let value = ArgValue::Path(data_path!["A", "B"]);
        let json = param.to_json(&value).unwrap();
        assert_eq!(json, json!("A/B"));
        assert_eq!(param.from_json(&json).unwrap(), value);
    }
}
