use crate::actions::{resolve_existing, DataAction, Mode};
use crate::error::Result;
use crate::structure::{DataPath, DataStructure};

/// Give the object at `path` a new name.
#[derive(Debug, Clone)]
pub struct RenameDataAction {
    path: DataPath,
    new_name: String,
}

impl RenameDataAction {
    pub fn new(path: DataPath, new_name: &str) -> Self {
        Self {
            path,
            new_name: new_name.to_string(),
        }
    }

    pub fn renamed_path(&self) -> Result<DataPath> {
        self.path.with_target_name(&self.new_name)
    }
}

impl DataAction for RenameDataAction {
    fn apply(&self, ds: &mut DataStructure, _mode: Mode) -> Result<()> {
        let id = resolve_existing(ds, &self.path)?;
        ds.rename(id, &self.new_name)
    }

    fn clone_box(&self) -> Box<dyn DataAction> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("rename '{}' to '{}'", self.path, self.new_name)
    }
}
