//! Binary persistence.
//!
//! [`writer`] turns a [`DataStructure`](crate::structure::DataStructure) into a
//! [`Container`] tree, [`reader`] does the reverse. Per-kind encoding lives in
//! [`factory`] so other formats or object kinds can be plugged in.

pub mod container;
pub mod factory;
pub mod reader;
pub mod writer;

pub use container::{AttributeValue, Attributes, Container, ContainerHeader, Entry, EntryKind, FORMAT_VERSION};
pub use factory::{EncodedPayload, FactoryRegistry, ObjectIo};
pub use reader::{read_container, read_file, DataStructureReader};
pub use writer::{write_container, write_file, DataStructureWriter};

/// Format key of the built-in container layout.
pub const DEFAULT_FORMAT: &str = "dgc";

/// File extension used by the CLI and tests.
pub const FILE_EXTENSION: &str = "dgc";
