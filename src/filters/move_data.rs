use crate::actions::{DataObjectModification, MoveDataAction, OutputActions};
use crate::filter::{Filter, MessageHandler, PreflightResult};
use crate::outcome::Outcome;
use crate::parameters::{AnyParameter, Arguments, DataGroupSelectionParameter, DataPathSelectionParameter, Parameters};
use crate::structure::{DataPath, DataStructure};
use crate::error::DataGraphError;
use uuid::Uuid;

/// Moves an object under a different group.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveDataFilter;

impl MoveDataFilter {
    pub const K_DATA_PATH: &'static str = "data_path";
    pub const K_NEW_PARENT_PATH: &'static str = "new_parent_path";
    pub const UUID: Uuid = Uuid::from_u128(0x651e1894_ab4a_4ab2_b6d8_2f6c9a1e3d03);
}

impl Filter for MoveDataFilter {
    fn name(&self) -> &'static str {
        "move_data"
    }

    fn class_name(&self) -> &'static str {
        "MoveDataFilter"
    }

    fn uuid(&self) -> Uuid {
        Self::UUID
    }

    fn human_name(&self) -> &'static str {
        "Move Data"
    }

    fn default_tags(&self) -> Vec<String> {
        vec!["Core".into(), "Memory Management".into(), "Move".into()]
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .with_parameter(AnyParameter::data(DataPathSelectionParameter::new(
                Self::K_DATA_PATH,
                "Data to Move",
                "Object to re-parent",
                DataPath::root(),
            )))
            .with_parameter(AnyParameter::data(DataGroupSelectionParameter::new(
                Self::K_NEW_PARENT_PATH,
                "New Parent",
                "Group that receives the object",
                DataPath::root(),
            )))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(*self)
    }

    fn preflight_impl(
        &self,
        _ds: &DataStructure,
        args: &Arguments,
        _messages: &dyn MessageHandler,
    ) -> Outcome<PreflightResult> {
        let path: DataPath = args.value(Self::K_DATA_PATH);
        let new_parent: DataPath = args.value(Self::K_NEW_PARENT_PATH);
        if new_parent.starts_with(&path) {
            return Outcome::from_error(DataGraphError::parameter(
                Self::K_NEW_PARENT_PATH,
                format!("'{}' cannot be moved into itself", path),
            ));
        }

        let mut actions = OutputActions::new();
        actions.push(MoveDataAction::new(path.clone(), new_parent));
        actions.push_modification(DataObjectModification::Removed(path));
        Outcome::ok(PreflightResult::new(actions))
    }
}
