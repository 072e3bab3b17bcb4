//! Per-type encoders and decoders, looked up by format and type tag.
//!
//! The reader and writer only know the tree layout. Everything specific to an
//! object kind lives in an [`ObjectIo`] registered in the process-wide
//! [`FactoryRegistry`] under a format key (for example `"dgc"`) and the kind's
//! type tag (for example `"DataGroup"`).

use crate::error::{DataGraphError, Result};
use crate::io::container::{AttributeValue, Attributes, Entry, EntryKind};
use crate::io::DEFAULT_FORMAT;
use crate::dispatch_data_type;
use crate::structure::{
    AnyDataArray, AttributeMatrix, DataArray, DataGroup, DataObject, DataObjectId, DataStructure, ImageGeom,
    ImageGeomSpec, ObjectPayload, ObjectType, StoreMode, TriangleGeom,
};
use crate::structure::store::{checked_element_count, checked_shape_size};
use crate::types::{DataType, Element};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

// Payload attribute keys.
pub const ATTR_TUPLE_DIMENSIONS: &str = "TupleDimensions";
pub const ATTR_COMPONENT_DIMENSIONS: &str = "ComponentDimensions";
pub const ATTR_DATA_TYPE: &str = "DataType";
pub const ATTR_DIMENSIONS: &str = "Dimensions";
pub const ATTR_ORIGIN: &str = "Origin";
pub const ATTR_SPACING: &str = "Spacing";
pub const ATTR_CELL_DATA_ID: &str = "CellDataId";
pub const ATTR_VERTICES_ID: &str = "VerticesId";
pub const ATTR_FACES_ID: &str = "FacesId";
pub const ATTR_FACE_DATA_ID: &str = "FaceDataId";

/// Encoded payload of one object, without the common header attributes.
#[derive(Debug, Clone)]
pub struct EncodedPayload {
    pub kind: EntryKind,
    pub attributes: Attributes,
    pub data: Vec<u8>,
}

impl EncodedPayload {
    pub fn group(attributes: Attributes) -> Self {
        Self {
            kind: EntryKind::Group,
            attributes,
            data: Vec::new(),
        }
    }
}

/// Encoder and decoder for one object kind.
pub trait ObjectIo: Send + Sync {
    /// Tag written to the `ObjectType` attribute.
    fn type_name(&self) -> &str;

    /// Decode an entry's payload. Children are read by the caller.
    ///
    /// With `preflight` set, array data is not decoded and placeholders are
    /// created instead.
    fn read(&self, entry: &Entry, preflight: bool) -> Result<ObjectPayload>;

    /// Restore ID references once every object is in place.
    fn resolve_references(&self, _ds: &mut DataStructure, _id: DataObjectId, _attributes: &Attributes) -> Result<()> {
        Ok(())
    }

    fn write(&self, object: &DataObject) -> Result<EncodedPayload>;
}

type FormatTable = HashMap<String, HashMap<String, Arc<dyn ObjectIo>>>;

/// Process-wide registry of [`ObjectIo`]s keyed by format, then type tag.
pub struct FactoryRegistry {
    formats: RwLock<FormatTable>,
}

impl FactoryRegistry {
    /// The shared registry, with the built-in kinds registered for
    /// [`DEFAULT_FORMAT`].
    pub fn global() -> &'static FactoryRegistry {
        static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let registry = FactoryRegistry {
                formats: RwLock::new(HashMap::new()),
            };
            registry.register_core(DEFAULT_FORMAT);
            registry
        })
    }

    /// Register the built-in kinds for `format`.
    pub fn register_core(&self, format: &str) {
        let core: [Arc<dyn ObjectIo>; 5] = [
            Arc::new(DataGroupIo),
            Arc::new(AttributeMatrixIo),
            Arc::new(ImageGeomIo),
            Arc::new(TriangleGeomIo),
            Arc::new(DataArrayIo),
        ];
        for factory in core {
            self.register(format, factory);
        }
    }

    /// Add or replace the factory for its type tag within `format`.
    pub fn register(&self, format: &str, factory: Arc<dyn ObjectIo>) {
        let mut formats = self.formats.write().unwrap_or_else(|e| e.into_inner());
        let type_name = factory.type_name().to_string();
        tracing::debug!("Registering '{}' factory for format '{}'", type_name, format);
        formats
            .entry(format.to_string())
            .or_default()
            .insert(type_name, factory);
    }

    /// Remove a factory, returning it when present.
    pub fn unregister(&self, format: &str, type_name: &str) -> Option<Arc<dyn ObjectIo>> {
        let mut formats = self.formats.write().unwrap_or_else(|e| e.into_inner());
        formats.get_mut(format).and_then(|table| table.remove(type_name))
    }

    pub fn get(&self, format: &str, type_name: &str) -> Result<Arc<dyn ObjectIo>> {
        let formats = self.formats.read().unwrap_or_else(|e| e.into_inner());
        formats
            .get(format)
            .and_then(|table| table.get(type_name))
            .cloned()
            .ok_or_else(|| DataGraphError::UnknownTypeTag {
                format: format.to_string(),
                type_name: type_name.to_string(),
            })
    }

    /// Registered type tags for `format`, sorted.
    pub fn type_names(&self, format: &str) -> Vec<String> {
        let formats = self.formats.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = formats
            .get(format)
            .map(|table| table.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

fn wrong_payload(object: &DataObject, expected: ObjectType) -> DataGraphError {
    DataGraphError::type_mismatch(object.id(), expected, object.object_type())
}

fn set_optional_id(attributes: &mut Attributes, key: &str, id: Option<DataObjectId>) {
    if let Some(id) = id {
        attributes.set(key, AttributeValue::UInt(id.value()));
    }
}

fn shape_attribute(shape: &[usize]) -> AttributeValue {
    AttributeValue::UIntList(shape.iter().map(|&x| x as u64).collect())
}

// ==================== DataGroup ====================

struct DataGroupIo;

impl ObjectIo for DataGroupIo {
    fn type_name(&self) -> &str {
        ObjectType::DataGroup.type_name()
    }

    fn read(&self, _entry: &Entry, _preflight: bool) -> Result<ObjectPayload> {
        Ok(DataGroup::new().into())
    }

    fn write(&self, object: &DataObject) -> Result<EncodedPayload> {
        object
            .as_kind::<DataGroup>()
            .ok_or_else(|| wrong_payload(object, ObjectType::DataGroup))?;
        Ok(EncodedPayload::group(Attributes::new()))
    }
}

fn oversized_shape(entry: &Entry) -> DataGraphError {
    DataGraphError::MalformedContainer(format!("'{}' declares a shape too large to address", entry.name))
}

// ==================== AttributeMatrix ====================

struct AttributeMatrixIo;

impl ObjectIo for AttributeMatrixIo {
    fn type_name(&self) -> &str {
        ObjectType::AttributeMatrix.type_name()
    }

    fn read(&self, entry: &Entry, _preflight: bool) -> Result<ObjectPayload> {
        let shape = entry.attributes.usize_list(ATTR_TUPLE_DIMENSIONS)?;
        if shape.is_empty() {
            return Err(DataGraphError::MalformedContainer(format!(
                "attribute matrix '{}' has an empty tuple shape",
                entry.name
            )));
        }
        checked_shape_size(&shape).map_err(|_| oversized_shape(entry))?;
        Ok(AttributeMatrix::new(shape).into())
    }

    fn write(&self, object: &DataObject) -> Result<EncodedPayload> {
        let matrix = object
            .as_kind::<AttributeMatrix>()
            .ok_or_else(|| wrong_payload(object, ObjectType::AttributeMatrix))?;
        let mut attributes = Attributes::new();
        attributes.set(ATTR_TUPLE_DIMENSIONS, shape_attribute(matrix.tuple_shape()));
        Ok(EncodedPayload::group(attributes))
    }
}

// ==================== ImageGeom ====================

struct ImageGeomIo;

fn float3(attributes: &Attributes, key: &str) -> Result<[f32; 3]> {
    match attributes.float_list(key)? {
        &[x, y, z] => Ok([x as f32, y as f32, z as f32]),
        other => Err(DataGraphError::MalformedContainer(format!(
            "attribute '{}' has {} values, expected 3",
            key,
            other.len()
        ))),
    }
}

impl ObjectIo for ImageGeomIo {
    fn type_name(&self) -> &str {
        ObjectType::ImageGeom.type_name()
    }

    fn read(&self, entry: &Entry, _preflight: bool) -> Result<ObjectPayload> {
        let dims = entry.attributes.usize_list(ATTR_DIMENSIONS)?;
        let dimensions: [usize; 3] = dims.as_slice().try_into().map_err(|_| {
            DataGraphError::MalformedContainer(format!("image geometry '{}' needs 3 dimensions", entry.name))
        })?;
        checked_shape_size(&dimensions).map_err(|_| oversized_shape(entry))?;
        let spec = ImageGeomSpec {
            dimensions,
            origin: float3(&entry.attributes, ATTR_ORIGIN)?,
            spacing: float3(&entry.attributes, ATTR_SPACING)?,
        };
        Ok(ImageGeom::new(spec).into())
    }

    fn resolve_references(&self, ds: &mut DataStructure, id: DataObjectId, attributes: &Attributes) -> Result<()> {
        if let Some(cell_data) = attributes.optional_u64(ATTR_CELL_DATA_ID)? {
            ds.set_geometry_element_data(id, DataObjectId(cell_data))?;
        }
        Ok(())
    }

    fn write(&self, object: &DataObject) -> Result<EncodedPayload> {
        let geom = object
            .as_kind::<ImageGeom>()
            .ok_or_else(|| wrong_payload(object, ObjectType::ImageGeom))?;
        let spec = geom.spec();
        let mut attributes = Attributes::new();
        attributes.set(ATTR_DIMENSIONS, shape_attribute(&spec.dimensions));
        attributes.set(
            ATTR_ORIGIN,
            AttributeValue::FloatList(spec.origin.iter().map(|&v| v as f64).collect()),
        );
        attributes.set(
            ATTR_SPACING,
            AttributeValue::FloatList(spec.spacing.iter().map(|&v| v as f64).collect()),
        );
        set_optional_id(&mut attributes, ATTR_CELL_DATA_ID, geom.cell_data_id());
        Ok(EncodedPayload::group(attributes))
    }
}

// ==================== TriangleGeom ====================

struct TriangleGeomIo;

impl ObjectIo for TriangleGeomIo {
    fn type_name(&self) -> &str {
        ObjectType::TriangleGeom.type_name()
    }

    fn read(&self, _entry: &Entry, _preflight: bool) -> Result<ObjectPayload> {
        Ok(TriangleGeom::new().into())
    }

    fn resolve_references(&self, ds: &mut DataStructure, id: DataObjectId, attributes: &Attributes) -> Result<()> {
        if let Some(vertices) = attributes.optional_u64(ATTR_VERTICES_ID)? {
            ds.set_triangle_vertices(id, DataObjectId(vertices))?;
        }
        if let Some(faces) = attributes.optional_u64(ATTR_FACES_ID)? {
            ds.set_triangle_faces(id, DataObjectId(faces))?;
        }
        if let Some(face_data) = attributes.optional_u64(ATTR_FACE_DATA_ID)? {
            ds.set_geometry_element_data(id, DataObjectId(face_data))?;
        }
        Ok(())
    }

    fn write(&self, object: &DataObject) -> Result<EncodedPayload> {
        let geom = object
            .as_kind::<TriangleGeom>()
            .ok_or_else(|| wrong_payload(object, ObjectType::TriangleGeom))?;
        let mut attributes = Attributes::new();
        set_optional_id(&mut attributes, ATTR_VERTICES_ID, geom.vertices_id());
        set_optional_id(&mut attributes, ATTR_FACES_ID, geom.faces_id());
        set_optional_id(&mut attributes, ATTR_FACE_DATA_ID, geom.face_data_id());
        Ok(EncodedPayload::group(attributes))
    }
}

// ==================== DataArray ====================

struct DataArrayIo;

fn decode_values<T: Element>(bytes: &[u8], tuple_shape: &[usize], component_shape: &[usize]) -> Result<DataArray<T>> {
    let width = T::DATA_TYPE.size_bytes();
    let values: Vec<T> = bytes.chunks_exact(width).map(T::read_le).collect();
    DataArray::from_vec(values, tuple_shape, component_shape)
}

fn encode_values<T: Element>(values: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * T::DATA_TYPE.size_bytes());
    for &value in values {
        value.write_le(&mut out);
    }
    out
}

impl ObjectIo for DataArrayIo {
    fn type_name(&self) -> &str {
        ObjectType::DataArray.type_name()
    }

    fn read(&self, entry: &Entry, preflight: bool) -> Result<ObjectPayload> {
        let data_type: DataType = entry.attributes.text(ATTR_DATA_TYPE)?.parse()?;
        let tuple_shape = entry.attributes.usize_list(ATTR_TUPLE_DIMENSIONS)?;
        let component_shape = entry.attributes.usize_list(ATTR_COMPONENT_DIMENSIONS)?;
        let expected = checked_element_count(&tuple_shape, &component_shape)
            .ok()
            .and_then(|elements| elements.checked_mul(data_type.size_bytes()))
            .ok_or_else(|| oversized_shape(entry))?;
        if entry.data.len() != expected {
            return Err(DataGraphError::MalformedContainer(format!(
                "dataset '{}' holds {} bytes, expected {}",
                entry.name,
                entry.data.len(),
                expected
            )));
        }

        let array = if preflight {
            AnyDataArray::new(data_type, &tuple_shape, &component_shape, StoreMode::Placeholder)?
        } else {
            dispatch_data_type!(data_type, T => {
                AnyDataArray::from(decode_values::<T>(&entry.data, &tuple_shape, &component_shape)?)
            })
        };
        Ok(array.into())
    }

    fn write(&self, object: &DataObject) -> Result<EncodedPayload> {
        let array = object
            .as_kind::<AnyDataArray>()
            .ok_or_else(|| wrong_payload(object, ObjectType::DataArray))?;
        if array.is_placeholder() {
            return Err(DataGraphError::Serialization(format!(
                "placeholder array {} has no values to write",
                object.id()
            )));
        }
        let data = dispatch_data_type!(array.data_type(), T => {
            let typed = array
                .as_typed::<T>()
                .ok_or_else(|| DataGraphError::unsupported(array.data_type(), "array kind disagrees with its tag"))?;
            encode_values(typed.values()?)
        });

        let mut attributes = Attributes::new();
        attributes.set(ATTR_DATA_TYPE, AttributeValue::Text(array.data_type().name().to_string()));
        attributes.set(ATTR_TUPLE_DIMENSIONS, shape_attribute(array.tuple_shape()));
        attributes.set(ATTR_COMPONENT_DIMENSIONS, shape_attribute(array.component_shape()));
        Ok(EncodedPayload {
            kind: EntryKind::Dataset,
            attributes,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_factories_registered() {
        let names = FactoryRegistry::global().type_names(DEFAULT_FORMAT);
        for object_type in ObjectType::all() {
            assert!(names.iter().any(|n| n == object_type.type_name()));
        }
    }

    #[test]
    fn test_unknown_format() {
        let err = FactoryRegistry::global().get("nope", "DataGroup").err().unwrap();
        assert!(matches!(err, DataGraphError::UnknownTypeTag { .. }));
    }

    #[test]
    fn test_array_bytes_round_trip() {
        let array = DataArray::from_vec(vec![1.5f32, -2.0, 3.25], &[3], &[1]).unwrap();
        let object = DataObject::new(DataObjectId(1), "A".into(), AnyDataArray::from(array).into());
        let encoded = DataArrayIo.write(&object).unwrap();
        let entry = Entry::dataset("A", encoded.attributes, encoded.data);

        let payload = DataArrayIo.read(&entry, false).unwrap();
        let ObjectPayload::Array(decoded) = payload else {
            panic!("expected an array payload");
        };
        assert_eq!(decoded.as_typed::<f32>().unwrap().values().unwrap(), &[1.5, -2.0, 3.25]);

        let ObjectPayload::Array(placeholder) = DataArrayIo.read(&entry, true).unwrap() else {
            panic!("expected an array payload");
        };
        assert!(placeholder.is_placeholder());
    }

    #[test]
    fn test_truncated_dataset_rejected() {
        let array = DataArray::from_vec(vec![7u16, 8], &[2], &[1]).unwrap();
        let object = DataObject::new(DataObjectId(1), "A".into(), AnyDataArray::from(array).into());
        let encoded = DataArrayIo.write(&object).unwrap();
        let mut entry = Entry::dataset("A", encoded.attributes, encoded.data);
        entry.data.pop();
        assert!(matches!(
            DataArrayIo.read(&entry, false),
            Err(DataGraphError::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_overflowing_dataset_shape_rejected() {
        let array = DataArray::from_vec(vec![1.0f64, 2.0], &[2], &[1]).unwrap();
        let object = DataObject::new(DataObjectId(1), "A".into(), AnyDataArray::from(array).into());
        let encoded = DataArrayIo.write(&object).unwrap();
        let mut entry = Entry::dataset("A", encoded.attributes, encoded.data);
        entry
            .attributes
            .set(ATTR_TUPLE_DIMENSIONS, shape_attribute(&[usize::MAX, 2]));
        for preflight in [false, true] {
            assert!(matches!(
                DataArrayIo.read(&entry, preflight),
                Err(DataGraphError::MalformedContainer(_))
            ));
        }

        // Element count fits but the byte count does not
        entry
            .attributes
            .set(ATTR_TUPLE_DIMENSIONS, shape_attribute(&[usize::MAX / 4]));
        assert!(matches!(
            DataArrayIo.read(&entry, false),
            Err(DataGraphError::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_overflowing_matrix_shape_rejected() {
        let mut attributes = Attributes::new();
        attributes.set(ATTR_TUPLE_DIMENSIONS, shape_attribute(&[usize::MAX, 3]));
        let entry = Entry::group("Cells", attributes);
        assert!(matches!(
            AttributeMatrixIo.read(&entry, false),
            Err(DataGraphError::MalformedContainer(_))
        ));
    }
}
