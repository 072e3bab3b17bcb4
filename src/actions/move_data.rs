use crate::actions::{resolve_existing, DataAction, Mode};
use crate::error::{DataGraphError, Result};
use crate::structure::{DataObjectId, DataPath, DataStructure};

/// Re-parent the object at `path` under `new_parent_path`.
///
/// The empty path as new parent moves the object to the top level.
#[derive(Debug, Clone)]
pub struct MoveDataAction {
    path: DataPath,
    new_parent_path: DataPath,
}

impl MoveDataAction {
    pub fn new(path: DataPath, new_parent_path: DataPath) -> Self {
        Self { path, new_parent_path }
    }

    /// Where the object lives after the move.
    pub fn destination(&self) -> Result<DataPath> {
        self.new_parent_path.create_child_path(self.path.target_name()?)
    }
}

impl DataAction for MoveDataAction {
    fn apply(&self, ds: &mut DataStructure, _mode: Mode) -> Result<()> {
        let id = resolve_existing(ds, &self.path)?;
        let old_parent = match self.path.parent() {
            parent if parent.is_empty() => DataObjectId::ROOT,
            parent => resolve_existing(ds, &parent)?,
        };
        let new_parent = if self.new_parent_path.is_empty() {
            DataObjectId::ROOT
        } else {
            resolve_existing(ds, &self.new_parent_path)?
        };
        if new_parent == id {
            return Err(DataGraphError::MoveCycle { id, parent: new_parent });
        }
        if new_parent == old_parent || ds.children_of(Some(new_parent).filter(|p| !p.is_root()))?.contains_id(id) {
            return Err(DataGraphError::GraphConsistency(format!(
                "'{}' is already a child of '{}'",
                self.path, self.new_parent_path
            )));
        }
        ds.set_additional_parent(id, new_parent)?;
        ds.remove_parent(id, old_parent)
    }

    fn clone_box(&self) -> Box<dyn DataAction> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("move '{}' into '{}'", self.path, self.new_parent_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_path;

    fn graph() -> DataStructure {
        let mut ds = DataStructure::new();
        let a = ds.create_group("A", None).unwrap();
        ds.create_group("B", Some(a)).unwrap();
        ds.create_group("C", None).unwrap();
        ds
    }

    #[test]
    fn test_move_keeps_identity() {
        let mut ds = graph();
        let id = ds.get_id(&data_path!["A", "B"]).unwrap();
        let action = MoveDataAction::new(data_path!["A", "B"], data_path!["C"]);
        action.apply(&mut ds, Mode::Execute).unwrap();
        assert_eq!(ds.get_id(&data_path!["C", "B"]), Some(id));
        assert!(ds.get_id(&data_path!["A", "B"]).is_none());
        assert_eq!(action.destination().unwrap(), data_path!["C", "B"]);
    }

    #[test]
    fn test_move_to_top_level() {
        let mut ds = graph();
        MoveDataAction::new(data_path!["A", "B"], DataPath::root())
            .apply(&mut ds, Mode::Execute)
            .unwrap();
        assert!(ds.get_id(&data_path!["B"]).is_some());
    }

    #[test]
    fn test_move_into_self_or_descendant() {
        let mut ds = graph();
        let err = MoveDataAction::new(data_path!["A"], data_path!["A"])
            .apply(&mut ds, Mode::Execute)
            .unwrap_err();
        assert!(matches!(err, DataGraphError::MoveCycle { .. }));

        let err = MoveDataAction::new(data_path!["A"], data_path!["A", "B"])
            .apply(&mut ds, Mode::Execute)
            .unwrap_err();
        assert!(matches!(err, DataGraphError::MoveCycle { .. }));
        assert!(ds.get_id(&data_path!["A", "B"]).is_some());
    }

    #[test]
    fn test_move_into_current_parent_fails() {
        let mut ds = graph();
        let err = MoveDataAction::new(data_path!["A", "B"], data_path!["A"])
            .apply(&mut ds, Mode::Execute)
            .unwrap_err();
        assert!(matches!(err, DataGraphError::GraphConsistency(_)));
    }

    #[test]
    fn test_missing_inputs() {
        let mut ds = graph();
        assert!(matches!(
            MoveDataAction::new(data_path!["Nope"], data_path!["C"]).apply(&mut ds, Mode::Execute),
            Err(DataGraphError::MissingInput(_))
        ));
        assert!(matches!(
            MoveDataAction::new(data_path!["C"], data_path!["Nope"]).apply(&mut ds, Mode::Execute),
            Err(DataGraphError::MissingInput(_))
        ));
    }
}
