use crate::actions::{resolve_existing, DataAction, Mode};
use crate::error::Result;
use crate::structure::{DataObjectId, DataPath, DataStructure};

/// How much of an object's ownership to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Unlink only this path; other parents keep the object alive.
    JustPath,
    /// Unlink from every parent.
    EveryPath,
}

/// Remove the object at `path`.
#[derive(Debug, Clone)]
pub struct DeleteDataAction {
    path: DataPath,
    mode: DeleteMode,
}

impl DeleteDataAction {
    pub fn new(path: DataPath, mode: DeleteMode) -> Self {
        Self { path, mode }
    }
}

impl DataAction for DeleteDataAction {
    fn apply(&self, ds: &mut DataStructure, _mode: Mode) -> Result<()> {
        let id = resolve_existing(ds, &self.path)?;
        match self.mode {
            DeleteMode::EveryPath => ds.remove_data(id),
            DeleteMode::JustPath => {
                let parent_path = self.path.parent();
                let parent = if parent_path.is_empty() {
                    DataObjectId::ROOT
                } else {
                    resolve_existing(ds, &parent_path)?
                };
                ds.remove_parent(id, parent)
            }
        }
    }

    fn clone_box(&self) -> Box<dyn DataAction> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("delete '{}' ({:?})", self.path, self.mode)
    }
}
