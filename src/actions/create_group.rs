use crate::actions::{DataAction, DataCreationAction, Mode};
use crate::error::{DataGraphError, Result};
use crate::structure::{DataPath, DataStructure};

/// Create a group at `path`, creating any missing groups above it.
#[derive(Debug, Clone)]
pub struct CreateDataGroupAction {
    path: DataPath,
}

impl CreateDataGroupAction {
    pub fn new(path: DataPath) -> Self {
        Self { path }
    }
}

impl DataAction for CreateDataGroupAction {
    fn apply(&self, ds: &mut DataStructure, _mode: Mode) -> Result<()> {
        let name = self.path.target_name()?;
        if ds.get_id(&self.path).is_some() {
            return Err(DataGraphError::NameCollision {
                name: name.to_string(),
                parent: format!("'{}'", self.path.parent()),
            });
        }
        let parent_path = self.path.parent();
        let parent = if parent_path.is_empty() {
            None
        } else {
            Some(ds.make_path(&parent_path)?)
        };
        ds.create_group(name, parent)?;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn DataAction> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("create group '{}'", self.path)
    }

    fn as_creation(&self) -> Option<&dyn DataCreationAction> {
        Some(self)
    }
}

impl DataCreationAction for CreateDataGroupAction {
    fn created_path(&self) -> &DataPath {
        &self.path
    }
}
