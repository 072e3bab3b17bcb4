//! Integration tests for container persistence
//!
//! Tests that touch the process-wide factory registry run serially; each
//! uses its own format key so the default format stays intact.

mod common;

use common::builders::StructureBuilder;
use datagraph_rs::{
    data_path,
    error::{DataGraphError, ErrorCategory},
    io::{
        self, container::ATTR_IMPORTABLE, AttributeValue, Attributes, Container, DataStructureReader,
        DataStructureWriter, EncodedPayload, Entry, FactoryRegistry, ObjectIo,
    },
    structure::{DataArray, DataGroup, DataObject, DataStructure, ImageGeom, ObjectPayload},
};
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn shared_structure() -> DataStructure {
    StructureBuilder::new()
        .group(data_path!["Left"])
        .group(data_path!["Right"])
        .ramp(data_path!["Left", "Values"], 5, 3)
        .share(data_path!["Left", "Values"], data_path!["Right"])
        .image("Image", [4, 2, 1])
        .build()
}

fn container_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join(format!("scan.{}", io::FILE_EXTENSION))
}

// ============================================================================
// Round trips through a file
// ============================================================================

#[test]
fn test_multi_parent_round_trip_through_file() {
    let dir = TempDir::new().unwrap();
    let path = container_path(&dir);
    let original = shared_structure();
    let id = original.get_id(&data_path!["Left", "Values"]).unwrap();

    io::write_file(&original, &path).unwrap();
    let loaded = io::read_file(&path, false).unwrap();

    let mut paths = loaded.get_data_paths_for_id(id);
    paths.sort_by_key(|p| p.to_string());
    assert_eq!(paths, vec![data_path!["Left", "Values"], data_path!["Right", "Values"]]);

    let left = loaded.get_data_as::<DataArray<f32>>(&data_path!["Left", "Values"]).unwrap();
    let right = loaded.get_data_as::<DataArray<f32>>(&data_path!["Right", "Values"]).unwrap();
    let expected = original.get_data_as::<DataArray<f32>>(&data_path!["Left", "Values"]).unwrap();
    assert_eq!(left.values().unwrap(), expected.values().unwrap());
    assert_eq!(right.values().unwrap(), expected.values().unwrap());
    assert_eq!(left.component_shape(), &[3]);

    assert_eq!(loaded.next_id(), original.next_id());
    assert_eq!(loaded.len(), original.len());
    assert!(loaded.check_integrity().is_ok());
}

#[test]
fn test_loaded_structure_keeps_allocating_fresh_ids() {
    let dir = TempDir::new().unwrap();
    let path = container_path(&dir);
    let original = shared_structure();
    io::write_file(&original, &path).unwrap();

    let mut loaded = io::read_file(&path, false).unwrap();
    let existing: Vec<_> = loaded.objects().map(DataObject::id).collect();
    let fresh = loaded.create_group("Fresh", None).unwrap();
    assert!(existing.iter().all(|id| *id < fresh));
}

#[test]
fn test_geometry_survives_round_trip() {
    let original = shared_structure();
    let container = io::write_container(&original).unwrap();
    let loaded = io::read_container(&container, false).unwrap();

    let geom = loaded.get_data_as::<ImageGeom>(&data_path!["Image"]).unwrap();
    assert_eq!(geom.spec().dimensions, [4, 2, 1]);
    assert_eq!(geom.cell_data_id(), loaded.get_id(&data_path!["Image", "Cell Data"]));
}

#[test]
fn test_preflight_read_yields_placeholders() {
    let dir = TempDir::new().unwrap();
    let path = container_path(&dir);
    io::write_file(&shared_structure(), &path).unwrap();

    let loaded = io::read_file(&path, true).unwrap();
    let values = loaded.get_data_as::<DataArray<f32>>(&data_path!["Right", "Values"]).unwrap();
    assert!(values.is_placeholder());
    assert_eq!(values.number_of_tuples(), 5);
    assert_eq!(values.number_of_components(), 3);
}

// ============================================================================
// Damaged containers
// ============================================================================

#[test]
fn test_bad_magic_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = container_path(&dir);
    io::write_file(&shared_structure(), &path).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    bytes[..8].copy_from_slice(b"NOTAGRPH");
    std::fs::write(&path, &bytes).unwrap();

    let err = Container::load(&path).unwrap_err();
    assert!(
        matches!(err.root_cause(), DataGraphError::MalformedContainer(_)),
        "unexpected error: {}",
        err
    );
    assert_eq!(err.category(), ErrorCategory::Io);
}

#[test]
fn test_damaged_length_prefix_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = container_path(&dir);
    io::write_file(&shared_structure(), &path).unwrap();

    // The root entry's name length follows the header
    let header_len = bincode::serialized_size(&Container::load(&path).unwrap().header).unwrap() as usize;
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[header_len..header_len + 8].copy_from_slice(&(1u64 << 40).to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();

    let err = io::read_file(&path, false).unwrap_err();
    assert!(
        matches!(err.root_cause(), DataGraphError::MalformedContainer(_)),
        "unexpected error: {}",
        err
    );
    assert_eq!(err.category(), ErrorCategory::Io);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = io::read_file(dir.path().join("absent.dgc"), false).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);
}

#[test]
fn test_non_importable_entries_are_skipped() {
    let mut container = io::write_container(&shared_structure()).unwrap();
    let image = container
        .root
        .children
        .iter_mut()
        .find(|entry| entry.name == "Image")
        .unwrap();
    image.attributes.set(ATTR_IMPORTABLE, AttributeValue::Int(0));

    let mut reader = DataStructureReader::new(false);
    reader.read(&container).unwrap();
    assert_eq!(reader.skipped(), 1);

    let ds = reader.into_partial();
    assert!(ds.get_id(&data_path!["Image"]).is_none());
    assert!(ds.get_id(&data_path!["Image", "Cell Data"]).is_none());
    assert!(ds.get_id(&data_path!["Left", "Values"]).is_some());
}

#[test]
fn test_decode_failure_keeps_earlier_siblings() {
    let ds = StructureBuilder::new()
        .group(data_path!["A"])
        .ramp(data_path!["B", "Values"], 4, 1)
        .group(data_path!["C"])
        .build();
    let mut container = io::write_container(&ds).unwrap();
    let b = container
        .root
        .children
        .iter_mut()
        .find(|entry| entry.name == "B")
        .unwrap();
    b.children[0].data.truncate(3);

    let mut reader = DataStructureReader::new(false);
    let err = reader.read(&container).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);

    let partial = reader.into_partial();
    assert!(partial.get_id(&data_path!["A"]).is_some());
    assert!(partial.get_id(&data_path!["B"]).is_some());
    assert!(partial.get_id(&data_path!["B", "Values"]).is_none());
    assert!(partial.get_id(&data_path!["C"]).is_none());
}

// ============================================================================
// Factory registry
// ============================================================================

/// Group factory that counts how often it decodes.
struct CountingGroupIo {
    reads: AtomicUsize,
}

impl ObjectIo for CountingGroupIo {
    fn type_name(&self) -> &str {
        "DataGroup"
    }

    fn read(&self, _entry: &Entry, _preflight: bool) -> datagraph_rs::Result<ObjectPayload> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(ObjectPayload::Group(DataGroup::new()))
    }

    fn write(&self, _object: &DataObject) -> datagraph_rs::Result<EncodedPayload> {
        Ok(EncodedPayload::group(Attributes::new()))
    }
}

#[test]
#[serial]
fn test_factories_resolved_by_type_tag() {
    let format = "counting";
    let registry = FactoryRegistry::global();
    registry.register_core(format);
    let counting = Arc::new(CountingGroupIo {
        reads: AtomicUsize::new(0),
    });
    registry.register(format, counting.clone());

    let original = StructureBuilder::new()
        .group(data_path!["Left", "Inner"])
        .group(data_path!["Right"])
        .share(data_path!["Left", "Inner"], data_path!["Right"])
        .build();
    let container = DataStructureWriter::with_format(format).write(&original).unwrap();

    let mut reader = DataStructureReader::with_format(format, false);
    reader.read(&container).unwrap();
    let loaded = reader.into_partial();

    // Left, Inner and Right; the shared Inner is decoded once
    assert_eq!(counting.reads.load(Ordering::SeqCst), 3);
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.get_data_paths_for_id(original.get_id(&data_path!["Right", "Inner"]).unwrap()).len(), 2);
}

#[test]
#[serial]
fn test_factory_registered_after_write_can_read() {
    let format = "late";
    let container = io::write_container(&shared_structure()).unwrap();

    let mut reader = DataStructureReader::with_format(format, false);
    let err = reader.read(&container).unwrap_err();
    assert!(
        matches!(err.root_cause(), DataGraphError::UnknownTypeTag { .. }),
        "unexpected error: {}",
        err
    );
    assert!(reader.into_partial().is_empty());

    FactoryRegistry::global().register_core(format);
    let mut reader = DataStructureReader::with_format(format, false);
    reader.read(&container).unwrap();
    assert_eq!(reader.into_partial().len(), shared_structure().len());
}

#[test]
#[serial]
fn test_unregistered_array_factory_leaves_partial_structure() {
    let format = "no-arrays";
    let registry = FactoryRegistry::global();
    registry.register_core(format);
    assert!(registry.unregister(format, "DataArray").is_some());
    assert!(!registry.type_names(format).iter().any(|name| name == "DataArray"));

    let ds = StructureBuilder::new()
        .group(data_path!["Groups", "Only"])
        .ramp(data_path!["Arrays", "Values"], 2, 1)
        .build();
    let container = DataStructureWriter::new().write(&ds).unwrap();

    let mut reader = DataStructureReader::with_format(format, false);
    let err = reader.read(&container).unwrap_err();
    assert!(matches!(err.root_cause(), DataGraphError::UnknownTypeTag { .. }));

    let partial = reader.into_partial();
    assert!(partial.get_id(&data_path!["Groups", "Only"]).is_some());
    assert!(partial.get_id(&data_path!["Arrays"]).is_some());
    assert!(partial.get_id(&data_path!["Arrays", "Values"]).is_none());
}
