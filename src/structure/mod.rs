//! Object graph and typed array storage.

pub mod array;
pub mod data_structure;
pub mod geometry;
pub mod group;
pub mod id;
pub mod object;
pub mod path;
pub mod store;

pub use array::{AnyDataArray, ArrayElement, DataArray, StoreMode};
pub use data_structure::{DataStructure, HierarchyEntry};
pub use geometry::{ImageGeom, ImageGeomSpec, TriangleGeom};
pub use group::{AttributeMatrix, ChildMap, DataGroup};
pub use id::DataObjectId;
pub use object::{DataObject, ObjectKind, ObjectPayload, ObjectType};
pub use path::DataPath;
pub use store::{DataStore, DataStoreBuf, EmptyDataStore, StoreKind};
