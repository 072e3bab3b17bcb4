//! # datagraph-rs: Object Graph and Two-Phase Filter Engine
//!
//! The shared engine beneath a scientific data-processing application. It holds
//! every dataset of a session in one hierarchical, shared-ownership object
//! graph and mutates it only through filters that validate first and act
//! second.
//!
//! ## Architecture
//!
//! - **Structure**: `DataStructure` owns groups, attribute matrices, geometries
//!   and typed arrays; objects may have several parents
//! - **Parameters**: typed, validating parameter descriptors and the runtime
//!   `Arguments` that fill them
//! - **Actions**: replayable graph mutations, dry-run during preflight and
//!   applied for real during execute
//! - **Filter**: the two-phase contract, per-node state and ordered pipelines
//! - **IO**: a bincode container format that round-trips shared objects
//!
//! ## Configuration
//!
//! Engine settings (logging, worker threads, I/O defaults) are read from
//! `engine.toml` under `dev.datagraph.datagraph-rs` in the platform config
//! directory. See [`config::EngineConfig`].
//!
//! ## Example
//!
//! ```ignore
//! use datagraph_rs::{
//!     data_path,
//!     filter::{CancelToken, ExecutionContext, Pipeline, TracingMessageHandler},
//!     filters::{CreateDataArrayFilter, CreateDataGroupFilter},
//!     parameters::Arguments,
//!     structure::DataStructure,
//!     types::DataType,
//! };
//!
//! let mut pipeline = Pipeline::new("example");
//! pipeline.push_filter(
//!     Box::new(CreateDataGroupFilter),
//!     Arguments::new().with(CreateDataGroupFilter::K_DATA_OBJECT_PATH, data_path!["Scan"]),
//! );
//! pipeline.push_filter(
//!     Box::new(CreateDataArrayFilter),
//!     Arguments::new()
//!         .with(CreateDataArrayFilter::K_DATA_PATH, data_path!["Scan", "Intensity"])
//!         .with(CreateDataArrayFilter::K_DATA_TYPE, DataType::Float32)
//!         .with(CreateDataArrayFilter::K_TUPLE_SHAPE, vec![480usize, 640]),
//! );
//!
//! let mut ds = DataStructure::new();
//! let handler = TracingMessageHandler::new();
//! assert!(pipeline.preflight(&ds, &handler).is_valid());
//! let outcome = pipeline.execute(&mut ds, &ExecutionContext::default(), &handler, &CancelToken::new());
//! assert!(outcome.is_valid());
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod filter;
pub mod filters;
pub mod io;
pub mod logging;
pub mod outcome;
pub mod parameters;
pub mod structure;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{DataGraphError, ErrorCategory, Result, ResultExt};
pub use filter::{Filter, FilterNode, Pipeline};
pub use outcome::{Outcome, Warning};
pub use structure::{DataObjectId, DataPath, DataStructure};
pub use types::DataType;
