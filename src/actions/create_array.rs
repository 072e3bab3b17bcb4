use crate::actions::{resolve_parent, DataAction, DataCreationAction, Mode};
use crate::error::Result;
use crate::structure::{AnyDataArray, DataPath, DataStructure};
use crate::types::DataType;

/// Create an array at `path`. Placeholder storage in preflight, real storage
/// in execute. The parent must already exist.
#[derive(Debug, Clone)]
pub struct CreateArrayAction {
    data_type: DataType,
    tuple_shape: Vec<usize>,
    component_shape: Vec<usize>,
    path: DataPath,
}

impl CreateArrayAction {
    pub fn new(data_type: DataType, tuple_shape: Vec<usize>, component_shape: Vec<usize>, path: DataPath) -> Self {
        Self {
            data_type,
            tuple_shape,
            component_shape,
            path,
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn tuple_shape(&self) -> &[usize] {
        &self.tuple_shape
    }

    pub fn component_shape(&self) -> &[usize] {
        &self.component_shape
    }
}

impl DataAction for CreateArrayAction {
    fn apply(&self, ds: &mut DataStructure, mode: Mode) -> Result<()> {
        let name = self.path.target_name()?;
        let parent = resolve_parent(ds, &self.path)?;
        let array = AnyDataArray::new(
            self.data_type,
            &self.tuple_shape,
            &self.component_shape,
            mode.store_mode(),
        )?;
        ds.insert_object(name, array, parent)?;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn DataAction> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!(
            "create {} array '{}' {:?}x{:?}",
            self.data_type, self.path, self.tuple_shape, self.component_shape
        )
    }

    fn as_creation(&self) -> Option<&dyn DataCreationAction> {
        Some(self)
    }
}

impl DataCreationAction for CreateArrayAction {
    fn created_path(&self) -> &DataPath {
        &self.path
    }
}
