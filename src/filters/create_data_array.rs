use crate::actions::{CreateArrayAction, OutputActions};
use crate::dispatch_data_type;
use crate::error::DataGraphError;
use crate::filter::{CancelToken, ExecutionContext, Filter, FilterMessage, MessageHandler, PreflightResult, PreflightValue};
use crate::outcome::{Outcome, Warning};
use crate::parameters::{
    AnyParameter, ArrayCreationParameter, Arguments, ChoicesParameter, DataTypeParameter, NumberParameter,
    Parameters, ShapeParameter,
};
use crate::structure::store::{checked_element_count, shape_size};
use crate::structure::{DataArray, DataPath, DataStructure};
use crate::types::{DataType, Element};
use uuid::Uuid;

/// How a new array's values are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitType {
    /// Every element gets the same value.
    Fill,
    /// Tuple `i` gets `start + i * step` in every component.
    Incremental,
}

impl InitType {
    pub const CHOICES: [&'static str; 2] = ["Fill Value", "Incremental"];

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(InitType::Fill),
            1 => Some(InitType::Incremental),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Creates a materialized array and initialises it in parallel chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateDataArrayFilter;

impl CreateDataArrayFilter {
    pub const K_DATA_PATH: &'static str = "data_path";
    pub const K_DATA_TYPE: &'static str = "numeric_type";
    pub const K_TUPLE_SHAPE: &'static str = "tuple_shape";
    pub const K_COMPONENT_SHAPE: &'static str = "component_shape";
    pub const K_INIT_TYPE: &'static str = "init_type";
    pub const K_INIT_VALUE: &'static str = "init_value";
    pub const K_START_VALUE: &'static str = "starting_value";
    pub const K_STEP_VALUE: &'static str = "step_value";
    pub const UUID: Uuid = Uuid::from_u128(0x67041f9b_bdc6_4122_acc6_c9fe9280e904);
}

impl Filter for CreateDataArrayFilter {
    fn name(&self) -> &'static str {
        "create_data_array"
    }

    fn class_name(&self) -> &'static str {
        "CreateDataArrayFilter"
    }

    fn uuid(&self) -> Uuid {
        Self::UUID
    }

    fn human_name(&self) -> &'static str {
        "Create Data Array"
    }

    fn default_tags(&self) -> Vec<String> {
        vec!["Core".into(), "Generation".into(), "Create".into(), "Array".into()]
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .with_parameter(AnyParameter::data(ArrayCreationParameter::new(
                Self::K_DATA_PATH,
                "Created Array",
                "Path of the new array",
                DataPath::root(),
            )))
            .with_parameter(AnyParameter::value(DataTypeParameter::new(
                Self::K_DATA_TYPE,
                "Output Numeric Type",
                "Element kind of the new array",
                DataType::Int32,
            )))
            .with_parameter(AnyParameter::value(ShapeParameter::new(
                Self::K_TUPLE_SHAPE,
                "Tuple Dimensions",
                "Tuple extents, slowest varying first",
                vec![1],
            )))
            .with_parameter(AnyParameter::value(ShapeParameter::new(
                Self::K_COMPONENT_SHAPE,
                "Component Dimensions",
                "Component extents of each tuple",
                vec![1],
            )))
            .with_parameter(AnyParameter::value(ChoicesParameter::new(
                Self::K_INIT_TYPE,
                "Initialization Type",
                "How the values are set",
                InitType::Fill.index(),
                &InitType::CHOICES,
            )))
            .with_parameter(AnyParameter::value(NumberParameter::float(
                Self::K_INIT_VALUE,
                "Initialization Value",
                "Value written to every element",
                0.0,
            )))
            .with_parameter(AnyParameter::value(NumberParameter::float(
                Self::K_START_VALUE,
                "Starting Value",
                "Value of the first tuple",
                0.0,
            )))
            .with_parameter(AnyParameter::value(NumberParameter::float(
                Self::K_STEP_VALUE,
                "Step Value",
                "Difference between consecutive tuples",
                1.0,
            )))
            .with_link(Self::K_INIT_TYPE, Self::K_INIT_VALUE, InitType::Fill.index())
            .with_link(Self::K_INIT_TYPE, Self::K_START_VALUE, InitType::Incremental.index())
            .with_link(Self::K_INIT_TYPE, Self::K_STEP_VALUE, InitType::Incremental.index())
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
        let data_type: DataType = args.value(Self::K_DATA_TYPE);
        let tuple_shape: Vec<usize> = args.value(Self::K_TUPLE_SHAPE);
        let component_shape: Vec<usize> = args.value(Self::K_COMPONENT_SHAPE);
        let init_index: usize = args.value(Self::K_INIT_TYPE);

        let mut errors = Vec::new();
        let checked: Vec<(&str, f64)> = match InitType::from_index(init_index) {
            Some(InitType::Fill) => vec![(Self::K_INIT_VALUE, args.value(Self::K_INIT_VALUE))],
            Some(InitType::Incremental) => vec![(Self::K_START_VALUE, args.value(Self::K_START_VALUE))],
            None => Vec::new(),
        };
        for (key, value) in checked {
            if !data_type.accepts_value(value) {
                errors.push(DataGraphError::parameter(
                    key,
                    format!("{} does not fit in {}", value, data_type),
                ));
            }
        }
        if !errors.is_empty() {
            return Outcome::from_errors(errors);
        }

        if let Err(err) = checked_element_count(&tuple_shape, &component_shape) {
            return Outcome::from_error(err.with_context(format!("Creating {}", path)));
        }
        let tuples = shape_size(&tuple_shape);
        let mut actions = OutputActions::new();
        actions.push(CreateArrayAction::new(data_type, tuple_shape, component_shape, path));
        Outcome::ok(PreflightResult::new(actions).with_value(PreflightValue::new("Tuple Count", tuples.to_string())))
    }

    fn execute_impl(
        &self,
        ds: &mut DataStructure,
        args: &Arguments,
        ctx: &ExecutionContext,
        messages: &dyn MessageHandler,
        cancel: &CancelToken,
    ) -> Outcome<()> {
        let path: DataPath = args.value(Self::K_DATA_PATH);
        let data_type: DataType = args.value(Self::K_DATA_TYPE);
        let init_type = match InitType::from_index(args.value(Self::K_INIT_TYPE)) {
            Some(init_type) => init_type,
            None => return Outcome::from_error(DataGraphError::parameter(Self::K_INIT_TYPE, "unknown choice")),
        };
        let fill: f64 = args.value(Self::K_INIT_VALUE);
        let start: f64 = args.value(Self::K_START_VALUE);
        let step: f64 = args.value(Self::K_STEP_VALUE);

        let completed = dispatch_data_type!(data_type, T => {
            let array = match ds.get_data_as_mut::<DataArray<T>>(&path) {
                Ok(array) => array,
                Err(err) => return Outcome::from_error(err),
            };
            let components = array.number_of_components().max(1);
            let total = array.size() as u64;
            let values = match array.values_mut() {
                Ok(values) => values,
                Err(err) => return Outcome::from_error(err),
            };
            messages.send(FilterMessage::progress(0, total));
            let completed = match init_type {
                InitType::Fill => {
                    let value = T::from_f64(fill);
                    fill_parallel(values, components, ctx, cancel, |_| value)
                }
                InitType::Incremental => fill_parallel(values, components, ctx, cancel, |index| {
                    T::from_f64(start + step * (index / components) as f64)
                }),
            };
            if completed {
                messages.send(FilterMessage::progress(total, total));
            }
            completed
        });

        if completed {
            Outcome::success()
        } else {
            Outcome::success().with_warning(Warning::cancelled(self.human_name()))
        }
    }
}

/// Write `value(flat_index)` into every element, spreading chunks over the
/// context's worker threads.
///
/// Chunks hold whole tuples of `components` elements: the context's chunk
/// size is rounded up to a multiple of the tuple width. Cancellation is
/// polled before each chunk, so a cancelled fill leaves every tuple either
/// fully written or untouched. Returns `false` when the token was set.
pub fn fill_parallel<T, F>(
    values: &mut [T],
    components: usize,
    ctx: &ExecutionContext,
    cancel: &CancelToken,
    value: F,
) -> bool
where
    T: Element,
    F: Fn(usize) -> T + Sync,
{
    let components = components.max(1);
    let chunk_size = ctx.chunk_size.max(1).div_ceil(components).saturating_mul(components);
    let mut work: Vec<(usize, &mut [T])> = values.chunks_mut(chunk_size).enumerate().collect();
    let workers = ctx.worker_threads.clamp(1, work.len().max(1));
    let per_worker = work.len().div_ceil(workers).max(1);
    let value = &value;

    std::thread::scope(|scope| {
        while !work.is_empty() {
            let batch: Vec<(usize, &mut [T])> = work.drain(..per_worker.min(work.len())).collect();
            scope.spawn(move || {
                for (chunk_index, chunk) in batch {
                    if cancel.is_cancelled() {
                        return;
                    }
                    let offset = chunk_index * chunk_size;
                    for (i, slot) in chunk.iter_mut().enumerate() {
                        *slot = value(offset + i);
                    }
                }
            });
        }
    });

    !cancel.is_cancelled()
}
