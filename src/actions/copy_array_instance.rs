use crate::actions::{resolve_parent, DataAction, DataCreationAction, Mode};
use crate::dispatch_data_type;
use crate::error::{DataGraphError, Result};
use crate::structure::{AnyDataArray, DataArray, DataPath, DataStructure, ObjectPayload, ObjectType, StoreMode};

/// Create an array with the same element kind and shape as `source`.
/// Values are not copied.
#[derive(Debug, Clone)]
pub struct CopyArrayInstanceAction {
    source: DataPath,
    path: DataPath,
}

impl CopyArrayInstanceAction {
    pub fn new(source: DataPath, path: DataPath) -> Self {
        Self { source, path }
    }

    pub fn source(&self) -> &DataPath {
        &self.source
    }
}

/// Fresh array shaped like `source`, one arm per element kind.
fn copy_instance(source: &AnyDataArray, mode: StoreMode) -> Result<AnyDataArray> {
    dispatch_data_type!(source.data_type(), T => {
        let typed = source
            .as_typed::<T>()
            .ok_or_else(|| DataGraphError::unsupported(source.data_type(), "array kind disagrees with its tag"))?;
        let copy = DataArray::<T>::new(typed.tuple_shape(), typed.component_shape(), mode)?;
        Ok(AnyDataArray::from(copy))
    })
}

impl DataAction for CopyArrayInstanceAction {
    fn apply(&self, ds: &mut DataStructure, mode: Mode) -> Result<()> {
        let object = ds
            .get_data(&self.source)
            .ok_or_else(|| DataGraphError::MissingInput(self.source.to_string()))?;
        let ObjectPayload::Array(source) = object.payload() else {
            return Err(DataGraphError::type_mismatch(
                &self.source,
                ObjectType::DataArray,
                object.object_type(),
            ));
        };
        let copy = copy_instance(source, mode.store_mode())?;
        let name = self.path.target_name()?;
        let parent = resolve_parent(ds, &self.path)?;
        ds.insert_object(name, copy, parent)?;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn DataAction> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("copy array instance '{}' to '{}'", self.source, self.path)
    }

    fn as_creation(&self) -> Option<&dyn DataCreationAction> {
        Some(self)
    }
}

impl DataCreationAction for CopyArrayInstanceAction {
    fn created_path(&self) -> &DataPath {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_path;
    use crate::types::DataType;

    #[test]
    fn test_copies_every_kind() {
        for &data_type in DataType::all() {
            let mut ds = DataStructure::new();
            let source = AnyDataArray::new(data_type, &[5], &[3], StoreMode::Materialized).unwrap();
            ds.insert_object("Source", source, None).unwrap();

            CopyArrayInstanceAction::new(data_path!["Source"], data_path!["Copy"])
                .apply(&mut ds, Mode::Execute)
                .unwrap();
            let copy = ds.get_data_as::<AnyDataArray>(&data_path!["Copy"]).unwrap();
            assert_eq!(copy.data_type(), data_type);
            assert_eq!(copy.tuple_shape(), &[5]);
            assert_eq!(copy.component_shape(), &[3]);
        }
    }

    #[test]
    fn test_values_are_not_copied() {
        let mut ds = DataStructure::new();
        let mut source = DataArray::<f32>::new(&[5], &[3], StoreMode::Materialized).unwrap();
        source.values_mut().unwrap().fill(9.0);
        ds.insert_object("Source", source, None).unwrap();
        CopyArrayInstanceAction::new(data_path!["Source"], data_path!["Copy"])
            .apply(&mut ds, Mode::Execute)
            .unwrap();
        let copy = ds.get_data_as::<DataArray<f32>>(&data_path!["Copy"]).unwrap();
        assert!(copy.values().unwrap().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_non_array_source_is_type_mismatch() {
        let mut ds = DataStructure::new();
        ds.create_group("Group", None).unwrap();
        let err = CopyArrayInstanceAction::new(data_path!["Group"], data_path!["Copy"])
            .apply(&mut ds, Mode::Execute)
            .unwrap_err();
        assert!(matches!(err, DataGraphError::TypeMismatch { .. }));
    }
}
