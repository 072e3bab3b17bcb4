//! Error handling for the datagraph engine
//!
//! This module defines the error type shared by the graph, action, parameter
//! and persistence layers, together with a Result alias. Expected failure
//! modes are always reported through these values; nothing in those layers
//! panics on bad data.
//!
//! Every error belongs to an [`ErrorCategory`] and carries a stable numeric
//! [`DataGraphError::code`] so messages can be matched without string parsing.

use crate::structure::DataObjectId;
use crate::types::DataType;
use thiserror::Error;

/// Broad classification of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Parameter, shape, type or name problems found during preflight
    Validation,
    /// Malformed containers, unknown type tags, read/write failures
    Io,
    /// Missing parents, move cycles, dangling IDs
    GraphConsistency,
}

/// Main error type for datagraph operations
#[derive(Error, Debug)]
pub enum DataGraphError {
    /// A required input (object, parent, argument) does not exist
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Lookup by path found nothing
    #[error("No object exists at path '{0}'")]
    NotFound(String),

    /// An object exists but is of the wrong kind
    #[error("Type mismatch at '{path}': expected {expected}, found {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// Tuple or component counts disagree
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A sibling with the same name already exists
    #[error("An object named '{name}' already exists under {parent}")]
    NameCollision { name: String, parent: String },

    /// Object names must be non-empty and must not contain the separator
    #[error("Invalid object name '{0}'")]
    InvalidName(String),

    /// Operation requires a non-empty path
    #[error("Path is empty")]
    EmptyPath,

    /// An element kind outside the supported set was requested
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Element access outside of the store bounds
    #[error("Index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Element access on a metadata-only store
    #[error("No allocated storage: {0}")]
    PlaceholderStore(String),

    /// Re-parenting would make an object its own ancestor
    #[error("Moving {id} under {parent} would create a cycle")]
    MoveCycle {
        id: DataObjectId,
        parent: DataObjectId,
    },

    /// An ID referenced by a link does not exist
    #[error("Dangling object id {0}")]
    DanglingId(DataObjectId),

    /// Generic graph bookkeeping failure
    #[error("Graph consistency error: {0}")]
    GraphConsistency(String),

    /// Parameter validation failure
    #[error("Parameter '{key}': {message}")]
    InvalidParameter { key: String, message: String },

    /// Duplicate key in a Parameters or Arguments collection
    #[error("Duplicate key '{0}'")]
    DuplicateKey(String),

    /// Operation not allowed in the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Container type tag without a registered factory
    #[error("No factory registered for type '{type_name}' in format '{format}'")]
    UnknownTypeTag { format: String, type_name: String },

    /// Malformed container content
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DataGraphError>,
    },
}

impl DataGraphError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DataGraphError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a type mismatch error
    pub fn type_mismatch(
        path: impl ToString,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        DataGraphError::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Build a parameter error
    pub fn parameter(key: impl Into<String>, message: impl Into<String>) -> Self {
        DataGraphError::InvalidParameter {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Build an error for an element kind the caller cannot handle
    pub fn unsupported(data_type: DataType, context: &str) -> Self {
        DataGraphError::UnsupportedType(format!("{} ({})", data_type, context))
    }

    /// The innermost error, skipping context wrappers
    pub fn root_cause(&self) -> &DataGraphError {
        match self {
            DataGraphError::WithContext { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Classification of this error
    pub fn category(&self) -> ErrorCategory {
        match self.root_cause() {
            DataGraphError::MissingInput(_)
            | DataGraphError::NotFound(_)
            | DataGraphError::TypeMismatch { .. }
            | DataGraphError::ShapeMismatch(_)
            | DataGraphError::NameCollision { .. }
            | DataGraphError::InvalidName(_)
            | DataGraphError::EmptyPath
            | DataGraphError::UnsupportedType(_)
            | DataGraphError::IndexOutOfBounds { .. }
            | DataGraphError::PlaceholderStore(_)
            | DataGraphError::InvalidParameter { .. }
            | DataGraphError::DuplicateKey(_)
            | DataGraphError::InvalidState(_) => ErrorCategory::Validation,
            DataGraphError::MoveCycle { .. }
            | DataGraphError::DanglingId(_)
            | DataGraphError::GraphConsistency(_) => ErrorCategory::GraphConsistency,
            DataGraphError::UnknownTypeTag { .. }
            | DataGraphError::MalformedContainer(_)
            | DataGraphError::Config(_)
            | DataGraphError::Io(_)
            | DataGraphError::Serialization(_)
            | DataGraphError::WithContext { .. } => ErrorCategory::Io,
        }
    }

    /// Stable numeric code, negative like the rest of the engine's codes
    pub fn code(&self) -> i32 {
        match self.root_cause() {
            DataGraphError::MissingInput(_) => -100,
            DataGraphError::NotFound(_) => -101,
            DataGraphError::TypeMismatch { .. } => -102,
            DataGraphError::ShapeMismatch(_) => -103,
            DataGraphError::NameCollision { .. } => -104,
            DataGraphError::InvalidName(_) => -105,
            DataGraphError::EmptyPath => -106,
            DataGraphError::UnsupportedType(_) => -107,
            DataGraphError::IndexOutOfBounds { .. } => -108,
            DataGraphError::PlaceholderStore(_) => -109,
            DataGraphError::InvalidParameter { .. } => -110,
            DataGraphError::DuplicateKey(_) => -111,
            DataGraphError::InvalidState(_) => -112,
            DataGraphError::MoveCycle { .. } => -200,
            DataGraphError::DanglingId(_) => -201,
            DataGraphError::GraphConsistency(_) => -202,
            DataGraphError::UnknownTypeTag { .. } => -300,
            DataGraphError::MalformedContainer(_) => -301,
            DataGraphError::Config(_) => -302,
            DataGraphError::Io(_) => -303,
            DataGraphError::Serialization(_) => -304,
            DataGraphError::WithContext { .. } => -1,
        }
    }
}

impl From<bincode::Error> for DataGraphError {
    fn from(err: bincode::Error) -> Self {
        DataGraphError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DataGraphError {
    fn from(err: serde_json::Error) -> Self {
        DataGraphError::Serialization(err.to_string())
    }
}

/// Result type alias for datagraph operations
pub type Result<T> = std::result::Result<T, DataGraphError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataGraphError::NotFound("Data/Values".to_string());
        assert_eq!(err.to_string(), "No object exists at path 'Data/Values'");
    }

    #[test]
    fn test_error_with_context() {
        let err = DataGraphError::EmptyPath;
        let with_ctx = err.with_context("Failed to resolve target");
        assert!(with_ctx.to_string().contains("Failed to resolve target"));
        assert_eq!(with_ctx.code(), DataGraphError::EmptyPath.code());
    }

    #[test]
    fn test_categories() {
        let collision = DataGraphError::NameCollision {
            name: "A".into(),
            parent: "root".into(),
        };
        assert_eq!(collision.category(), ErrorCategory::Validation);

        let cycle = DataGraphError::MoveCycle {
            id: DataObjectId(1),
            parent: DataObjectId(1),
        };
        assert_eq!(cycle.category(), ErrorCategory::GraphConsistency);

        let tag = DataGraphError::UnknownTypeTag {
            format: "dgc".into(),
            type_name: "Mystery".into(),
        };
        assert_eq!(tag.category(), ErrorCategory::Io);
    }

    #[test]
    fn test_context_keeps_category() {
        let err = DataGraphError::ShapeMismatch("10 != 12".into()).with_context("while copying");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(matches!(err.root_cause(), DataGraphError::ShapeMismatch(_)));
    }
}
