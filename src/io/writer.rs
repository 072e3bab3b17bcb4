//! [`DataStructure`] → container.

use crate::error::{DataGraphError, Result, ResultExt};
use crate::io::container::{
    AttributeValue, Attributes, Container, Entry, EntryKind, ATTR_IMPORTABLE, ATTR_NEXT_OBJECT_ID, ATTR_OBJECT_ID,
    ATTR_OBJECT_TYPE, ATTR_ROOT_TAG,
};
use crate::io::factory::FactoryRegistry;
use crate::io::DEFAULT_FORMAT;
use crate::structure::{ChildMap, DataObjectId, DataStructure};
use std::collections::HashSet;
use std::path::Path;

/// Builds a container tree from a structure.
///
/// The first occurrence of an object in depth-first order is written in full;
/// every later occurrence becomes a link entry carrying only the common
/// attributes.
pub struct DataStructureWriter {
    format: String,
    written: HashSet<DataObjectId>,
}

impl DataStructureWriter {
    pub fn new() -> Self {
        Self::with_format(DEFAULT_FORMAT)
    }

    pub fn with_format(format: &str) -> Self {
        Self {
            format: format.to_string(),
            written: HashSet::new(),
        }
    }

    pub fn write(&mut self, ds: &DataStructure) -> Result<Container> {
        self.written.clear();
        let mut attributes = Attributes::new();
        attributes.set(ATTR_ROOT_TAG, AttributeValue::UInt(1));
        attributes.set(ATTR_NEXT_OBJECT_ID, AttributeValue::UInt(ds.next_id().value()));
        let mut root = Entry::group("", attributes);
        root.children = self.write_children(ds, ds.children_of(None)?)?;
        tracing::debug!("Wrote {} object(s)", self.written.len());
        Ok(Container::new(root))
    }

    fn write_children(&mut self, ds: &DataStructure, children: &ChildMap) -> Result<Vec<Entry>> {
        children
            .iter()
            .map(|(name, id)| self.write_object(ds, name, id))
            .collect()
    }

    fn write_object(&mut self, ds: &DataStructure, name: &str, id: DataObjectId) -> Result<Entry> {
        let object = ds.get_object(id).ok_or(DataGraphError::DanglingId(id))?;

        let mut attributes = Attributes::new();
        attributes.set(ATTR_OBJECT_TYPE, AttributeValue::Text(object.object_type().type_name().to_string()));
        attributes.set(ATTR_OBJECT_ID, AttributeValue::UInt(id.value()));
        attributes.set(ATTR_IMPORTABLE, AttributeValue::Int(1));

        if !self.written.insert(id) {
            return Ok(Entry::link(name, attributes));
        }

        let factory = FactoryRegistry::global().get(&self.format, object.object_type().type_name())?;
        let encoded = factory
            .write(object)
            .with_context(|| format!("Failed to encode '{}'", name))?;
        for (key, value) in encoded.attributes.iter() {
            attributes.set(key, value.clone());
        }

        let mut entry = match encoded.kind {
            EntryKind::Dataset => Entry::dataset(name, attributes, encoded.data),
            _ => Entry::group(name, attributes),
        };
        if let Some(children) = object.children() {
            entry.children = self.write_children(ds, children)?;
        }
        Ok(entry)
    }
}

impl Default for DataStructureWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a structure as a container.
pub fn write_container(ds: &DataStructure) -> Result<Container> {
    DataStructureWriter::new().write(ds)
}

/// Encode a structure and save it to `path`.
pub fn write_file(ds: &DataStructure, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_container(ds)?
        .save(path)
        .with_context(|| format!("Failed to save {:?}", path))
}
