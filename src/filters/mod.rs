//! Built-in filters and the registry that looks filters up by UUID.

mod copy_array_instance;
mod create_data_array;
mod create_data_group;
mod move_data;
mod registry;

pub use copy_array_instance::CopyArrayInstanceFilter;
pub use create_data_array::{fill_parallel, CreateDataArrayFilter, InitType};
pub use create_data_group::CreateDataGroupFilter;
pub use move_data::MoveDataFilter;
pub use registry::FilterRegistry;
