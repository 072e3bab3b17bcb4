use crate::actions::{CreateDataGroupAction, OutputActions};
use crate::filter::{Filter, MessageHandler, PreflightResult};
use crate::outcome::Outcome;
use crate::parameters::{AnyParameter, Arguments, DataGroupCreationParameter, Parameters};
use crate::structure::{DataPath, DataStructure};
use uuid::Uuid;

/// Creates a group, together with any missing groups above it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateDataGroupFilter;

impl CreateDataGroupFilter {
    pub const K_DATA_OBJECT_PATH: &'static str = "data_object_path";
    pub const UUID: Uuid = Uuid::from_u128(0xe7d2f9b8_4131_4b28_a843_ea3c6950f101);
}

impl Filter for CreateDataGroupFilter {
    fn name(&self) -> &'static str {
        "create_data_group"
    }

    fn class_name(&self) -> &'static str {
        "CreateDataGroupFilter"
    }

    fn uuid(&self) -> Uuid {
        Self::UUID
    }

    fn human_name(&self) -> &'static str {
        "Create Data Group"
    }

    fn default_tags(&self) -> Vec<String> {
        vec!["Core".into(), "Generation".into(), "Create".into()]
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .with_parameter(AnyParameter::data(DataGroupCreationParameter::new(
                Self::K_DATA_OBJECT_PATH,
                "Data Object Path",
                "Path of the group to create",
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
        let path: DataPath = args.value(Self::K_DATA_OBJECT_PATH);
        let mut actions = OutputActions::new();
        actions.push(CreateDataGroupAction::new(path));
        Outcome::ok(PreflightResult::new(actions))
    }
}
