use crate::actions::{CopyArrayInstanceAction, OutputActions};
use crate::filter::{Filter, MessageHandler, PreflightResult, PreflightValue};
use crate::outcome::Outcome;
use crate::parameters::{AnyParameter, ArrayCreationParameter, ArraySelectionParameter, Arguments, Parameters};
use crate::structure::{AnyDataArray, DataPath, DataStructure};
use uuid::Uuid;

/// Creates an empty array with the element kind and shape of an existing one.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyArrayInstanceFilter;

impl CopyArrayInstanceFilter {
    pub const K_SELECTED_ARRAY_PATH: &'static str = "selected_array_path";
    pub const K_CREATED_ARRAY_PATH: &'static str = "created_array_path";
    pub const UUID: Uuid = Uuid::from_u128(0x0b1a3c5e_7d2f_4e61_9a84_c3b5d7e9f102);
}

impl Filter for CopyArrayInstanceFilter {
    fn name(&self) -> &'static str {
        "copy_array_instance"
    }

    fn class_name(&self) -> &'static str {
        "CopyArrayInstanceFilter"
    }

    fn uuid(&self) -> Uuid {
        Self::UUID
    }

    fn human_name(&self) -> &'static str {
        "Copy Data Array Instance"
    }

    fn default_tags(&self) -> Vec<String> {
        vec!["Core".into(), "Memory Management".into(), "Copy".into()]
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .with_parameter(AnyParameter::data(ArraySelectionParameter::new(
                Self::K_SELECTED_ARRAY_PATH,
                "Array to Copy",
                "Array whose element kind and shape are reused",
                DataPath::root(),
            )))
            .with_parameter(AnyParameter::data(ArrayCreationParameter::new(
                Self::K_CREATED_ARRAY_PATH,
                "Created Array",
                "Path of the new, zero-filled array",
                DataPath::root(),
            )))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(*self)
    }

    fn preflight_impl(
        &self,
        ds: &DataStructure,
        args: &Arguments,
        _messages: &dyn MessageHandler,
    ) -> Outcome<PreflightResult> {
        let source: DataPath = args.value(Self::K_SELECTED_ARRAY_PATH);
        let created: DataPath = args.value(Self::K_CREATED_ARRAY_PATH);

        let mut actions = OutputActions::new();
        actions.push(CopyArrayInstanceAction::new(source.clone(), created));
        let mut result = PreflightResult::new(actions);
        if let Ok(array) = ds.get_data_as::<AnyDataArray>(&source) {
            result = result
                .with_value(PreflightValue::new("Element Type", array.data_type().to_string()))
                .with_value(PreflightValue::new("Tuple Shape", format!("{:?}", array.tuple_shape())));
        }
        Outcome::ok(result)
    }
}
