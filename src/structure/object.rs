//! Graph nodes.
//!
//! A [`DataObject`] is the header every node carries (ID, name, parents) plus
//! an [`ObjectPayload`], the closed set of node kinds. Typed access goes
//! through [`ObjectKind`], which each payload type implements so that
//! `DataStructure::get_data_as::<K>` can report a precise type mismatch.

use crate::structure::array::{AnyDataArray, ArrayElement, DataArray};
use crate::structure::geometry::{ImageGeom, TriangleGeom};
use crate::structure::group::{AttributeMatrix, ChildMap, DataGroup};
use crate::structure::id::DataObjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind tag of a node; its name is also the container type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    DataGroup,
    AttributeMatrix,
    ImageGeom,
    TriangleGeom,
    DataArray,
}

impl ObjectType {
    pub fn all() -> &'static [ObjectType] {
        &[
            ObjectType::DataGroup,
            ObjectType::AttributeMatrix,
            ObjectType::ImageGeom,
            ObjectType::TriangleGeom,
            ObjectType::DataArray,
        ]
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectType::DataGroup => "DataGroup",
            ObjectType::AttributeMatrix => "AttributeMatrix",
            ObjectType::ImageGeom => "ImageGeom",
            ObjectType::TriangleGeom => "TriangleGeom",
            ObjectType::DataArray => "DataArray",
        }
    }

    pub fn from_type_name(name: &str) -> Option<ObjectType> {
        ObjectType::all()
            .iter()
            .find(|t| t.type_name() == name)
            .copied()
    }

    /// Whether objects of this kind can have children.
    pub fn is_group_like(&self) -> bool {
        !matches!(self, ObjectType::DataArray)
    }

    pub fn is_geometry(&self) -> bool {
        matches!(self, ObjectType::ImageGeom | ObjectType::TriangleGeom)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// The kind-specific part of a node.
#[derive(Debug, Clone)]
pub enum ObjectPayload {
    Group(DataGroup),
    AttributeMatrix(AttributeMatrix),
    ImageGeom(ImageGeom),
    TriangleGeom(TriangleGeom),
    Array(AnyDataArray),
}

impl ObjectPayload {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectPayload::Group(_) => ObjectType::DataGroup,
            ObjectPayload::AttributeMatrix(_) => ObjectType::AttributeMatrix,
            ObjectPayload::ImageGeom(_) => ObjectType::ImageGeom,
            ObjectPayload::TriangleGeom(_) => ObjectType::TriangleGeom,
            ObjectPayload::Array(_) => ObjectType::DataArray,
        }
    }

    pub fn children(&self) -> Option<&ChildMap> {
        match self {
            ObjectPayload::Group(g) => Some(&g.children),
            ObjectPayload::AttributeMatrix(m) => Some(&m.children),
            ObjectPayload::ImageGeom(g) => Some(&g.children),
            ObjectPayload::TriangleGeom(g) => Some(&g.children),
            ObjectPayload::Array(_) => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut ChildMap> {
        match self {
            ObjectPayload::Group(g) => Some(&mut g.children),
            ObjectPayload::AttributeMatrix(m) => Some(&mut m.children),
            ObjectPayload::ImageGeom(g) => Some(&mut g.children),
            ObjectPayload::TriangleGeom(g) => Some(&mut g.children),
            ObjectPayload::Array(_) => None,
        }
    }

    /// Copy of this payload with all child links dropped.
    pub(crate) fn detached(&self) -> ObjectPayload {
        let mut copy = self.clone();
        if let Some(children) = copy.children_mut() {
            *children = ChildMap::new();
        }
        match &mut copy {
            ObjectPayload::ImageGeom(g) => g.cell_data = None,
            ObjectPayload::TriangleGeom(g) => {
                g.vertices = None;
                g.faces = None;
                g.face_data = None;
            }
            _ => {}
        }
        copy
    }
}

impl From<DataGroup> for ObjectPayload {
    fn from(group: DataGroup) -> Self {
        ObjectPayload::Group(group)
    }
}

impl From<AttributeMatrix> for ObjectPayload {
    fn from(matrix: AttributeMatrix) -> Self {
        ObjectPayload::AttributeMatrix(matrix)
    }
}

impl From<ImageGeom> for ObjectPayload {
    fn from(geom: ImageGeom) -> Self {
        ObjectPayload::ImageGeom(geom)
    }
}

impl From<TriangleGeom> for ObjectPayload {
    fn from(geom: TriangleGeom) -> Self {
        ObjectPayload::TriangleGeom(geom)
    }
}

impl From<AnyDataArray> for ObjectPayload {
    fn from(array: AnyDataArray) -> Self {
        ObjectPayload::Array(array)
    }
}

impl<T: ArrayElement> From<DataArray<T>> for ObjectPayload {
    fn from(array: DataArray<T>) -> Self {
        ObjectPayload::Array(T::wrap(array))
    }
}

/// A node of the object graph.
#[derive(Debug, Clone)]
pub struct DataObject {
    id: DataObjectId,
    name: String,
    pub(crate) parent_ids: BTreeSet<DataObjectId>,
    pub(crate) payload: ObjectPayload,
}

impl DataObject {
    pub(crate) fn new(id: DataObjectId, name: String, payload: ObjectPayload) -> Self {
        Self {
            id,
            name,
            parent_ids: BTreeSet::new(),
            payload,
        }
    }

    pub fn id(&self) -> DataObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Parents of this object; contains `DataObjectId::ROOT` for top-level objects.
    pub fn parent_ids(&self) -> &BTreeSet<DataObjectId> {
        &self.parent_ids
    }

    pub fn object_type(&self) -> ObjectType {
        self.payload.object_type()
    }

    pub fn payload(&self) -> &ObjectPayload {
        &self.payload
    }

    pub fn children(&self) -> Option<&ChildMap> {
        self.payload.children()
    }

    pub fn is_group_like(&self) -> bool {
        self.object_type().is_group_like()
    }

    pub fn as_kind<K: ObjectKind>(&self) -> Option<&K> {
        K::from_payload(&self.payload)
    }

    pub fn as_kind_mut<K: ObjectKind>(&mut self) -> Option<&mut K> {
        K::from_payload_mut(&mut self.payload)
    }
}

/// A payload type reachable through `DataStructure::get_data_as`.
pub trait ObjectKind {
    /// Human-readable kind name used in mismatch errors.
    fn kind_name() -> String;

    fn from_payload(payload: &ObjectPayload) -> Option<&Self>;

    fn from_payload_mut(payload: &mut ObjectPayload) -> Option<&mut Self>;
}

macro_rules! impl_object_kind {
    ($ty:ty, $variant:ident) => {
        impl ObjectKind for $ty {
            fn kind_name() -> String {
                ObjectType::$variant.type_name().to_string()
            }

            fn from_payload(payload: &ObjectPayload) -> Option<&Self> {
                match payload {
                    ObjectPayload::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_payload_mut(payload: &mut ObjectPayload) -> Option<&mut Self> {
                match payload {
                    ObjectPayload::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_object_kind!(AttributeMatrix, AttributeMatrix);
impl_object_kind!(ImageGeom, ImageGeom);
impl_object_kind!(TriangleGeom, TriangleGeom);

impl ObjectKind for DataGroup {
    fn kind_name() -> String {
        ObjectType::DataGroup.type_name().to_string()
    }

    fn from_payload(payload: &ObjectPayload) -> Option<&Self> {
        match payload {
            ObjectPayload::Group(inner) => Some(inner),
            _ => None,
        }
    }

    fn from_payload_mut(payload: &mut ObjectPayload) -> Option<&mut Self> {
        match payload {
            ObjectPayload::Group(inner) => Some(inner),
            _ => None,
        }
    }
}

impl ObjectKind for AnyDataArray {
    fn kind_name() -> String {
        ObjectType::DataArray.type_name().to_string()
    }

    fn from_payload(payload: &ObjectPayload) -> Option<&Self> {
        match payload {
            ObjectPayload::Array(inner) => Some(inner),
            _ => None,
        }
    }

    fn from_payload_mut(payload: &mut ObjectPayload) -> Option<&mut Self> {
        match payload {
            ObjectPayload::Array(inner) => Some(inner),
            _ => None,
        }
    }
}

impl<T: ArrayElement> ObjectKind for DataArray<T> {
    fn kind_name() -> String {
        format!("DataArray<{}>", T::DATA_TYPE)
    }

    fn from_payload(payload: &ObjectPayload) -> Option<&Self> {
        match payload {
            ObjectPayload::Array(inner) => T::project(inner),
            _ => None,
        }
    }

    fn from_payload_mut(payload: &mut ObjectPayload) -> Option<&mut Self> {
        match payload {
            ObjectPayload::Array(inner) => T::project_mut(inner),
            _ => None,
        }
    }
}

/// Kind name of a node as it would be reported by [`ObjectKind::kind_name`].
pub fn describe_kind(object: &DataObject) -> String {
    match &object.payload {
        ObjectPayload::Array(array) => format!("DataArray<{}>", array.data_type()),
        other => other.object_type().type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::array::StoreMode;

    #[test]
    fn test_type_name_round_trip() {
        for &object_type in ObjectType::all() {
            assert_eq!(
                ObjectType::from_type_name(object_type.type_name()),
                Some(object_type)
            );
        }
        assert_eq!(ObjectType::from_type_name("NeighborList"), None);
    }

    #[test]
    fn test_typed_projection() {
        let array = DataArray::<f32>::new(&[2], &[1], StoreMode::Materialized).unwrap();
        let object = DataObject::new(DataObjectId(1), "a".into(), array.into());
        assert!(object.as_kind::<DataArray<f32>>().is_some());
        assert!(object.as_kind::<DataArray<f64>>().is_none());
        assert!(object.as_kind::<AnyDataArray>().is_some());
        assert!(object.as_kind::<DataGroup>().is_none());
        assert_eq!(describe_kind(&object), "DataArray<float32>");
        assert_eq!(<DataArray<f32> as ObjectKind>::kind_name(), "DataArray<float32>");
    }

    #[test]
    fn test_detached_drops_children() {
        let mut group = DataGroup::new();
        group.children.insert("x".into(), DataObjectId(9));
        let payload = ObjectPayload::from(group);
        assert_eq!(payload.children().unwrap().len(), 1);
        assert!(payload.detached().children().unwrap().is_empty());
    }
}
