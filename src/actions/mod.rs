//! Replayable graph mutations.
//!
//! A filter's preflight produces an [`OutputActions`] list describing what it
//! will do to the graph. The list is applied once in [`Mode::Preflight`] on a
//! scratch structure (arrays become placeholders) and once in
//! [`Mode::Execute`] on the real one. Actions are immutable values, so the
//! same list can be replayed any number of times.
//!
//! Application is fail-fast: the first failing action stops the list and
//! earlier actions stay applied.

mod copy_array_instance;
mod create_array;
mod create_attribute_matrix;
mod create_group;
mod create_image_geometry;
mod delete_data;
mod move_data;
mod rename_data;

pub use copy_array_instance::CopyArrayInstanceAction;
pub use create_array::CreateArrayAction;
pub use create_attribute_matrix::CreateAttributeMatrixAction;
pub use create_group::CreateDataGroupAction;
pub use create_image_geometry::CreateImageGeometryAction;
pub use delete_data::{DeleteDataAction, DeleteMode};
pub use move_data::MoveDataAction;
pub use rename_data::RenameDataAction;

use crate::error::{DataGraphError, Result, ResultExt};
use crate::structure::{DataObjectId, DataPath, DataStructure, StoreMode};
use std::fmt;

/// Whether actions run as a dry run or for real.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Preflight,
    Execute,
}

impl Mode {
    /// Storage created by actions running in this mode.
    pub fn store_mode(self) -> StoreMode {
        match self {
            Mode::Preflight => StoreMode::Placeholder,
            Mode::Execute => StoreMode::Materialized,
        }
    }
}

/// One planned mutation of a [`DataStructure`].
pub trait DataAction: fmt::Debug + Send + Sync {
    fn apply(&self, ds: &mut DataStructure, mode: Mode) -> Result<()>;

    fn clone_box(&self) -> Box<dyn DataAction>;

    /// Short description for logs and error context.
    fn describe(&self) -> String;

    fn as_creation(&self) -> Option<&dyn DataCreationAction> {
        None
    }
}

/// An action that brings new objects into existence.
pub trait DataCreationAction: DataAction {
    /// Path of the primary created object.
    fn created_path(&self) -> &DataPath;

    /// Every path the action creates, primary first.
    fn all_created_paths(&self) -> Vec<DataPath> {
        vec![self.created_path().clone()]
    }
}

impl Clone for Box<dyn DataAction> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Notification that existing data changes without being recreated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataObjectModification {
    /// Values are rewritten in place.
    Modified(DataPath),
    /// The object is unlinked from this path.
    Removed(DataPath),
}

/// Ordered action list plus modification notices.
#[derive(Debug, Clone, Default)]
pub struct OutputActions {
    actions: Vec<Box<dyn DataAction>>,
    modifications: Vec<DataObjectModification>,
}

impl OutputActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: impl DataAction + 'static) {
        self.actions.push(Box::new(action));
    }

    pub fn push_boxed(&mut self, action: Box<dyn DataAction>) {
        self.actions.push(action);
    }

    pub fn push_modification(&mut self, modification: DataObjectModification) {
        self.modifications.push(modification);
    }

    /// Append another list after this one.
    pub fn append(&mut self, other: OutputActions) {
        self.actions.extend(other.actions);
        self.modifications.extend(other.modifications);
    }

    pub fn actions(&self) -> &[Box<dyn DataAction>] {
        &self.actions
    }

    pub fn modifications(&self) -> &[DataObjectModification] {
        &self.modifications
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Paths created by the creation actions, in action order.
    pub fn all_created_paths(&self) -> Vec<DataPath> {
        self.actions
            .iter()
            .filter_map(|action| action.as_creation())
            .flat_map(|action| action.all_created_paths())
            .collect()
    }

    /// Apply every action in order, stopping at the first failure.
    pub fn apply_all(&self, ds: &mut DataStructure, mode: Mode) -> Result<()> {
        for (index, action) in self.actions.iter().enumerate() {
            tracing::debug!("Applying action {} ({:?}): {}", index, mode, action.describe());
            action
                .apply(ds, mode)
                .with_context(|| format!("Action {} failed: {}", index, action.describe()))?;
        }
        Ok(())
    }
}

/// ID of the group a new object at `path` goes into; `None` for top level.
pub(crate) fn resolve_parent(ds: &DataStructure, path: &DataPath) -> Result<Option<DataObjectId>> {
    let parent = path.parent();
    if parent.is_empty() {
        return Ok(None);
    }
    ds.get_id(&parent)
        .map(Some)
        .ok_or_else(|| DataGraphError::MissingInput(format!("parent '{}' of '{}'", parent, path)))
}

/// ID of an existing object, `MissingInput` when absent.
pub(crate) fn resolve_existing(ds: &DataStructure, path: &DataPath) -> Result<DataObjectId> {
    if path.is_empty() {
        return Err(DataGraphError::EmptyPath);
    }
    ds.get_id(path)
        .ok_or_else(|| DataGraphError::MissingInput(path.to_string()))
}
