use crate::actions::{resolve_parent, DataAction, DataCreationAction, Mode};
use crate::error::Result;
use crate::structure::{DataPath, DataStructure};

/// Create an AttributeMatrix with a fixed tuple shape.
#[derive(Debug, Clone)]
pub struct CreateAttributeMatrixAction {
    path: DataPath,
    tuple_shape: Vec<usize>,
}

impl CreateAttributeMatrixAction {
    pub fn new(path: DataPath, tuple_shape: Vec<usize>) -> Self {
        Self { path, tuple_shape }
    }
}

impl DataAction for CreateAttributeMatrixAction {
    fn apply(&self, ds: &mut DataStructure, _mode: Mode) -> Result<()> {
        let name = self.path.target_name()?;
        let parent = resolve_parent(ds, &self.path)?;
        ds.create_attribute_matrix(name, self.tuple_shape.clone(), parent)?;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn DataAction> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("create attribute matrix '{}' {:?}", self.path, self.tuple_shape)
    }

    fn as_creation(&self) -> Option<&dyn DataCreationAction> {
        Some(self)
    }
}

impl DataCreationAction for CreateAttributeMatrixAction {
    fn created_path(&self) -> &DataPath {
        &self.path
    }
}
