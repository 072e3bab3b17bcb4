//! Group-like payloads: plain groups and attribute matrices.
//!
//! Groups never own their children. They hold an insertion-ordered
//! name → [`DataObjectId`] map; the objects themselves live in the
//! [`DataStructure`](super::DataStructure) arena.

use crate::structure::id::DataObjectId;
use crate::structure::store::shape_size;

/// Insertion-ordered name → ID map of a group's children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildMap {
    entries: Vec<(String, DataObjectId)>,
}

impl ChildMap {
    pub(crate) const EMPTY: ChildMap = ChildMap { entries: Vec::new() };

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<DataObjectId> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn contains_id(&self, id: DataObjectId) -> bool {
        self.entries.iter().any(|(_, child)| *child == id)
    }

    /// Name under which `id` is registered here.
    pub fn name_of(&self, id: DataObjectId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, child)| *child == id)
            .map(|(n, _)| n.as_str())
    }

    /// Append a child. Caller guarantees the name is free.
    pub(crate) fn insert(&mut self, name: String, id: DataObjectId) {
        debug_assert!(!self.contains_name(&name));
        self.entries.push((name, id));
    }

    pub(crate) fn remove_id(&mut self, id: DataObjectId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(_, child)| *child != id);
        self.entries.len() != before
    }

    pub(crate) fn rename(&mut self, id: DataObjectId, new_name: &str) {
        for (name, child) in &mut self.entries {
            if *child == id {
                *name = new_name.to_string();
            }
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = DataObjectId> + '_ {
        self.entries.iter().map(|(_, id)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DataObjectId)> {
        self.entries.iter().map(|(n, id)| (n.as_str(), *id))
    }
}

/// A plain container of other objects.
#[derive(Debug, Clone, Default)]
pub struct DataGroup {
    pub(crate) children: ChildMap,
}

impl DataGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &ChildMap {
        &self.children
    }
}

/// A group whose child arrays all share one tuple shape.
#[derive(Debug, Clone)]
pub struct AttributeMatrix {
    pub(crate) children: ChildMap,
    tuple_shape: Vec<usize>,
}

impl AttributeMatrix {
    pub fn new(tuple_shape: Vec<usize>) -> Self {
        Self {
            children: ChildMap::new(),
            tuple_shape,
        }
    }

    pub fn children(&self) -> &ChildMap {
        &self.children
    }

    pub fn tuple_shape(&self) -> &[usize] {
        &self.tuple_shape
    }

    pub fn number_of_tuples(&self) -> usize {
        shape_size(&self.tuple_shape)
    }

    pub(crate) fn set_tuple_shape(&mut self, tuple_shape: Vec<usize>) {
        self.tuple_shape = tuple_shape;
    }
}
