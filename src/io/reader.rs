//! Container → [`DataStructure`].

use crate::error::{DataGraphError, Result, ResultExt};
use crate::io::container::{
    Attributes, Container, Entry, EntryKind, ATTR_IMPORTABLE, ATTR_NEXT_OBJECT_ID, ATTR_OBJECT_ID, ATTR_OBJECT_TYPE,
    ATTR_ROOT_TAG,
};
use crate::io::factory::{FactoryRegistry, ObjectIo};
use crate::io::DEFAULT_FORMAT;
use crate::structure::{DataObjectId, DataStructure};
use std::path::Path;
use std::sync::Arc;

/// Rebuilds a structure from a container tree.
///
/// Objects are inserted with their saved IDs. A second occurrence of an ID
/// adds the current group as another parent. When decoding fails part way,
/// [`into_partial`](Self::into_partial) returns what was read up to that
/// point.
pub struct DataStructureReader {
    format: String,
    preflight: bool,
    ds: DataStructure,
    deferred: Vec<(Arc<dyn ObjectIo>, DataObjectId, Attributes)>,
    skipped: usize,
}

impl DataStructureReader {
    /// Reader for [`DEFAULT_FORMAT`]. With `preflight` set, arrays are
    /// created as placeholders.
    pub fn new(preflight: bool) -> Self {
        Self::with_format(DEFAULT_FORMAT, preflight)
    }

    pub fn with_format(format: &str, preflight: bool) -> Self {
        Self {
            format: format.to_string(),
            preflight,
            ds: DataStructure::new(),
            deferred: Vec::new(),
            skipped: 0,
        }
    }

    /// Entries skipped because they were marked non-importable.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Read the whole container into this reader's structure.
    pub fn read(&mut self, container: &Container) -> Result<()> {
        let root = &container.root;
        if !root.attributes.contains(ATTR_ROOT_TAG) {
            return Err(DataGraphError::MalformedContainer(format!(
                "root group lacks the '{}' tag",
                ATTR_ROOT_TAG
            )));
        }
        let next_id = root.attributes.u64(ATTR_NEXT_OBJECT_ID)?;

        for child in &root.children {
            self.read_entry(child, DataObjectId::ROOT)?;
        }

        for (factory, id, attributes) in std::mem::take(&mut self.deferred) {
            factory
                .resolve_references(&mut self.ds, id, &attributes)
                .with_context(|| format!("Failed to restore references of {}", id))?;
        }
        self.ds.bump_next_id(DataObjectId(next_id));
        tracing::debug!(
            "Read {} object(s), skipped {} entr(ies)",
            self.ds.len(),
            self.skipped
        );
        Ok(())
    }

    fn read_entry(&mut self, entry: &Entry, parent: DataObjectId) -> Result<()> {
        let attributes = &entry.attributes;
        if attributes.optional_u64(ATTR_IMPORTABLE)? == Some(0) {
            tracing::debug!("Skipping non-importable entry '{}'", entry.name);
            self.skipped += 1;
            return Ok(());
        }

        let id = DataObjectId(attributes.u64(ATTR_OBJECT_ID)?);
        if id.is_root() {
            return Err(DataGraphError::MalformedContainer(format!(
                "entry '{}' uses the reserved root id",
                entry.name
            )));
        }

        if self.ds.contains(id) {
            return self
                .ds
                .set_additional_parent(id, parent)
                .with_context(|| format!("Failed to link '{}' ({})", entry.name, id));
        }
        if entry.kind == EntryKind::Link {
            return Err(DataGraphError::MalformedContainer(format!(
                "link '{}' refers to unknown object {}",
                entry.name, id
            )));
        }

        let type_name = attributes.text(ATTR_OBJECT_TYPE)?;
        let factory = FactoryRegistry::global().get(&self.format, type_name)?;
        let payload = factory
            .read(entry, self.preflight)
            .with_context(|| format!("Failed to decode '{}'", entry.name))?;
        self.ds.insert_with_id(id, &entry.name, payload, parent)?;
        self.deferred.push((factory, id, attributes.clone()));

        for child in &entry.children {
            self.read_entry(child, id)
                .with_context(|| format!("In '{}'", entry.name))?;
        }
        Ok(())
    }

    /// The structure read so far, complete or not.
    pub fn into_partial(self) -> DataStructure {
        self.ds
    }
}

/// Read a container into a fresh structure.
pub fn read_container(container: &Container, preflight: bool) -> Result<DataStructure> {
    let mut reader = DataStructureReader::new(preflight);
    reader.read(container)?;
    Ok(reader.into_partial())
}

/// Load and read a container file.
pub fn read_file(path: impl AsRef<Path>, preflight: bool) -> Result<DataStructure> {
    let path = path.as_ref();
    let container = Container::load(path).with_context(|| format!("Failed to load {:?}", path))?;
    read_container(&container, preflight)
}
