//! Typed, validating filter parameters and their runtime arguments.

pub mod arguments;
pub mod collection;
pub mod data_params;
pub mod parameter;
pub mod value;
pub mod value_params;

pub use arguments::Arguments;
pub use collection::{ParameterLink, Parameters, SchemaError};
pub use data_params::{
    ArrayCreationParameter, ArraySelectionParameter, DataGroupCreationParameter, DataGroupSelectionParameter,
    DataPathSelectionParameter,
};
pub use parameter::{AnyParameter, DataParameter, ParamMeta, ParameterCategory, ParameterInfo, ValueParameter};
pub use value::{ArgKind, ArgValue, FromArgValue};
pub use value_params::{
    BoolParameter, ChoicesParameter, DataTypeParameter, NumberParameter, ShapeParameter, StringParameter,
    VectorParameter,
};
