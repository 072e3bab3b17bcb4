//! Geometry payloads.
//!
//! A geometry is a group that describes a spatial domain. Each geometry
//! defines an element count (voxels for an image, faces for a triangle mesh)
//! and may be associated with one AttributeMatrix holding per-element data;
//! the matrix tuple count must equal the element count. The association is
//! checked by `DataStructure::set_geometry_element_data`.

use crate::structure::group::ChildMap;
use crate::structure::id::DataObjectId;
use serde::{Deserialize, Serialize};

/// Regular grid described by dimensions, origin and spacing.
#[derive(Debug, Clone)]
pub struct ImageGeom {
    pub(crate) children: ChildMap,
    pub(crate) spec: ImageGeomSpec,
    pub(crate) cell_data: Option<DataObjectId>,
}

/// Spatial parameters of an [`ImageGeom`], x-fastest ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageGeomSpec {
    pub dimensions: [usize; 3],
    pub origin: [f32; 3],
    pub spacing: [f32; 3],
}

impl Default for ImageGeomSpec {
    fn default() -> Self {
        Self {
            dimensions: [1, 1, 1],
            origin: [0.0; 3],
            spacing: [1.0; 3],
        }
    }
}

impl ImageGeomSpec {
    /// Voxel count. Dimensions are checked for overflow when a geometry is
    /// created or read.
    pub fn number_of_cells(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// Tuple shape of the cell data, slowest dimension first (z, y, x).
    pub fn cell_tuple_shape(&self) -> Vec<usize> {
        vec![self.dimensions[2], self.dimensions[1], self.dimensions[0]]
    }

    /// Physical bounds as (min, max) corners.
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut max = self.origin;
        for axis in 0..3 {
            max[axis] += self.dimensions[axis] as f32 * self.spacing[axis];
        }
        (self.origin, max)
    }
}

impl ImageGeom {
    pub fn new(spec: ImageGeomSpec) -> Self {
        Self {
            children: ChildMap::new(),
            spec,
            cell_data: None,
        }
    }

    pub fn children(&self) -> &ChildMap {
        &self.children
    }

    pub fn spec(&self) -> &ImageGeomSpec {
        &self.spec
    }

    pub fn number_of_elements(&self) -> usize {
        self.spec.number_of_cells()
    }

    pub fn cell_data_id(&self) -> Option<DataObjectId> {
        self.cell_data
    }
}

/// Triangle mesh: a shared vertex list plus a face list indexing into it.
///
/// Vertex coordinates are a float32 array with 3 components, faces a uint64
/// array with 3 components. Both are ordinary objects referenced by ID so a
/// vertex list can be shared between meshes.
#[derive(Debug, Clone, Default)]
pub struct TriangleGeom {
    pub(crate) children: ChildMap,
    pub(crate) vertices: Option<DataObjectId>,
    pub(crate) faces: Option<DataObjectId>,
    pub(crate) face_data: Option<DataObjectId>,
}

impl TriangleGeom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &ChildMap {
        &self.children
    }

    pub fn vertices_id(&self) -> Option<DataObjectId> {
        self.vertices
    }

    pub fn faces_id(&self) -> Option<DataObjectId> {
        self.faces
    }

    pub fn face_data_id(&self) -> Option<DataObjectId> {
        self.face_data
    }
}
