//! The object graph.
//!
//! `DataStructure` is the only owner of [`DataObject`]s. Parents refer to
//! children by ID through their [`ChildMap`]; children record every parent in
//! their `parent_ids` set. The structure root is not an object, but top-level
//! objects carry [`DataObjectId::ROOT`] as a parent so that removing the last
//! link works the same everywhere.
//!
//! Every mutating call validates first and mutates second, so a failed call
//! leaves the graph untouched.

use crate::error::{DataGraphError, Result, ResultExt};
use crate::structure::array::{AnyDataArray, ArrayElement, DataArray, StoreMode};
use crate::structure::geometry::{ImageGeom, ImageGeomSpec, TriangleGeom};
use crate::structure::group::{AttributeMatrix, ChildMap, DataGroup};
use crate::structure::id::DataObjectId;
use crate::structure::object::{describe_kind, DataObject, ObjectKind, ObjectPayload, ObjectType};
use crate::structure::path::DataPath;
use crate::structure::store::checked_shape_size;
use crate::types::DataType;
use std::collections::{BTreeMap, BTreeSet};

/// One line of [`DataStructure::hierarchy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEntry {
    pub path: DataPath,
    pub id: DataObjectId,
    pub object_type: ObjectType,
    pub data_type: Option<DataType>,
    pub tuple_shape: Vec<usize>,
    pub component_shape: Vec<usize>,
    pub placeholder: bool,
}

/// Arena of graph nodes plus the ID counter.
#[derive(Debug, Clone)]
pub struct DataStructure {
    objects: BTreeMap<DataObjectId, DataObject>,
    root: ChildMap,
    next_id: DataObjectId,
}

impl Default for DataStructure {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStructure {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            root: ChildMap::new(),
            next_id: DataObjectId::FIRST,
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The ID the next created object will receive.
    pub fn next_id(&self) -> DataObjectId {
        self.next_id
    }

    /// Raise the counter; it never goes backwards.
    pub(crate) fn bump_next_id(&mut self, at_least: DataObjectId) {
        if at_least > self.next_id {
            self.next_id = at_least;
        }
    }

    pub fn contains(&self, id: DataObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &DataObject> {
        self.objects.values()
    }

    /// Copy of the graph with every array turned into a placeholder.
    ///
    /// IDs, names, links and shapes are preserved, element data is not, so
    /// the copy is cheap regardless of array sizes. Dry runs work on this.
    pub fn metadata_clone(&self) -> DataStructure {
        let objects = self
            .objects
            .iter()
            .map(|(&id, object)| {
                let payload = match &object.payload {
                    ObjectPayload::Array(array) if !array.is_placeholder() => array
                        .empty_like(StoreMode::Placeholder)
                        .map(ObjectPayload::Array)
                        .unwrap_or_else(|_| object.payload.clone()),
                    other => other.clone(),
                };
                let mut copy = DataObject::new(id, object.name().to_string(), payload);
                copy.parent_ids = object.parent_ids.clone();
                (id, copy)
            })
            .collect();
        DataStructure {
            objects,
            root: self.root.clone(),
            next_id: self.next_id,
        }
    }

    fn generate_id(&mut self) -> DataObjectId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    pub fn create_group(&mut self, name: &str, parent: Option<DataObjectId>) -> Result<DataObjectId> {
        self.insert_object(name, DataGroup::new(), parent)
    }

    pub fn create_attribute_matrix(
        &mut self,
        name: &str,
        tuple_shape: Vec<usize>,
        parent: Option<DataObjectId>,
    ) -> Result<DataObjectId> {
        if tuple_shape.is_empty() {
            return Err(DataGraphError::ShapeMismatch(format!(
                "attribute matrix '{}' needs a non-empty tuple shape",
                name
            )));
        }
        checked_shape_size(&tuple_shape)?;
        self.insert_object(name, AttributeMatrix::new(tuple_shape), parent)
    }

    pub fn create_image_geom(
        &mut self,
        name: &str,
        spec: ImageGeomSpec,
        parent: Option<DataObjectId>,
    ) -> Result<DataObjectId> {
        checked_shape_size(&spec.dimensions)?;
        self.insert_object(name, ImageGeom::new(spec), parent)
    }

    pub fn create_triangle_geom(&mut self, name: &str, parent: Option<DataObjectId>) -> Result<DataObjectId> {
        self.insert_object(name, TriangleGeom::new(), parent)
    }

    pub fn create_array<T: ArrayElement>(
        &mut self,
        name: &str,
        tuple_shape: &[usize],
        component_shape: &[usize],
        mode: StoreMode,
        parent: Option<DataObjectId>,
    ) -> Result<DataObjectId> {
        let array = DataArray::<T>::new(tuple_shape, component_shape, mode)?;
        self.insert_object(name, array, parent)
    }

    /// Insert a prebuilt payload under `parent` (or at the top level).
    pub fn insert_object(
        &mut self,
        name: &str,
        payload: impl Into<ObjectPayload>,
        parent: Option<DataObjectId>,
    ) -> Result<DataObjectId> {
        let payload = payload.into();
        let parent = DataObjectId::parent_or_root(parent);
        self.check_can_adopt(parent, name, &payload)?;

        let id = self.generate_id();
        self.attach_new(id, name, payload, parent);
        tracing::debug!("Created {} '{}' as {} under {}", describe_payload(self, id), name, id, parent);
        Ok(id)
    }

    /// Insert with a caller-chosen ID; used when restoring a saved graph.
    pub(crate) fn insert_with_id(
        &mut self,
        id: DataObjectId,
        name: &str,
        payload: ObjectPayload,
        parent: DataObjectId,
    ) -> Result<()> {
        if id.is_root() || self.contains(id) {
            return Err(DataGraphError::GraphConsistency(format!(
                "object id {} is already in use",
                id
            )));
        }
        self.check_can_adopt(parent, name, &payload)?;
        self.attach_new(id, name, payload, parent);
        self.bump_next_id(id.next());
        Ok(())
    }

    fn attach_new(&mut self, id: DataObjectId, name: &str, payload: ObjectPayload, parent: DataObjectId) {
        let mut object = DataObject::new(id, name.to_string(), payload);
        object.parent_ids.insert(parent);
        self.objects.insert(id, object);
        if let Some(children) = self.child_map_mut(parent) {
            children.insert(name.to_string(), id);
        }
    }

    /// Validate placing an object named `name` with `payload` under `parent`.
    fn check_can_adopt(&self, parent: DataObjectId, name: &str, payload: &ObjectPayload) -> Result<()> {
        DataPath::check_segment(name)?;
        let children = self.children_of_id(parent)?;
        if children.contains_name(name) {
            return Err(DataGraphError::NameCollision {
                name: name.to_string(),
                parent: self.describe_parent(parent),
            });
        }
        if let ObjectPayload::Array(array) = payload {
            self.check_matrix_tuples(parent, array)?;
        }
        Ok(())
    }

    /// Arrays placed in an AttributeMatrix must match its tuple count.
    fn check_matrix_tuples(&self, parent: DataObjectId, array: &AnyDataArray) -> Result<()> {
        let Some(matrix) = self
            .objects
            .get(&parent)
            .and_then(|object| object.as_kind::<AttributeMatrix>())
        else {
            return Ok(());
        };
        if matrix.number_of_tuples() != array.number_of_tuples() {
            return Err(DataGraphError::ShapeMismatch(format!(
                "array has {} tuples but attribute matrix {} requires {}",
                array.number_of_tuples(),
                self.describe_parent(parent),
                matrix.number_of_tuples()
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn get_object(&self, id: DataObjectId) -> Option<&DataObject> {
        self.objects.get(&id)
    }

    pub fn get_object_mut(&mut self, id: DataObjectId) -> Option<&mut DataObject> {
        self.objects.get_mut(&id)
    }

    /// Resolve a path to an ID. The empty path has no object and yields `None`.
    pub fn get_id(&self, path: &DataPath) -> Option<DataObjectId> {
        let mut current = &self.root;
        let mut found = None;
        for segment in path.segments() {
            let id = current.get(segment)?;
            found = Some(id);
            current = match self.objects.get(&id)?.children() {
                Some(children) => children,
                None => &EMPTY_CHILDREN,
            };
        }
        found
    }

    pub fn get_data(&self, path: &DataPath) -> Option<&DataObject> {
        self.get_id(path).and_then(|id| self.objects.get(&id))
    }

    pub fn get_data_mut(&mut self, path: &DataPath) -> Option<&mut DataObject> {
        let id = self.get_id(path)?;
        self.objects.get_mut(&id)
    }

    /// Typed lookup: `NotFound` when nothing lives at `path`, `TypeMismatch`
    /// when something of another kind does.
    pub fn get_data_as<K: ObjectKind>(&self, path: &DataPath) -> Result<&K> {
        let object = self
            .get_data(path)
            .ok_or_else(|| DataGraphError::NotFound(path.to_string()))?;
        object
            .as_kind::<K>()
            .ok_or_else(|| DataGraphError::type_mismatch(path, K::kind_name(), describe_kind(object)))
    }

    pub fn get_data_as_mut<K: ObjectKind>(&mut self, path: &DataPath) -> Result<&mut K> {
        let object = self
            .get_data_mut(path)
            .ok_or_else(|| DataGraphError::NotFound(path.to_string()))?;
        let actual = describe_kind(object);
        object
            .as_kind_mut::<K>()
            .ok_or_else(|| DataGraphError::type_mismatch(path, K::kind_name(), actual))
    }

    /// Typed lookup by ID.
    pub fn get_object_as<K: ObjectKind>(&self, id: DataObjectId) -> Result<&K> {
        let object = self.objects.get(&id).ok_or(DataGraphError::DanglingId(id))?;
        object
            .as_kind::<K>()
            .ok_or_else(|| DataGraphError::type_mismatch(id, K::kind_name(), describe_kind(object)))
    }

    /// Every path that reaches `id`, one per distinct chain of parents.
    pub fn get_data_paths_for_id(&self, id: DataObjectId) -> Vec<DataPath> {
        let mut paths = Vec::new();
        let mut suffix = Vec::new();
        self.collect_paths(id, &mut suffix, &mut paths, &mut BTreeSet::new());
        paths
    }

    fn collect_paths(
        &self,
        id: DataObjectId,
        suffix: &mut Vec<String>,
        out: &mut Vec<DataPath>,
        visiting: &mut BTreeSet<DataObjectId>,
    ) {
        let Some(object) = self.objects.get(&id) else {
            return;
        };
        if !visiting.insert(id) {
            return;
        }
        suffix.push(object.name().to_string());
        for &parent in object.parent_ids() {
            if parent.is_root() {
                let segments: Vec<String> = suffix.iter().rev().cloned().collect();
                if let Ok(path) = DataPath::new(segments) {
                    out.push(path);
                }
            } else {
                self.collect_paths(parent, suffix, out, visiting);
            }
        }
        suffix.pop();
        visiting.remove(&id);
    }

    /// Child map of a parent, `None` for the top level.
    pub fn children_of(&self, parent: Option<DataObjectId>) -> Result<&ChildMap> {
        self.children_of_id(DataObjectId::parent_or_root(parent))
    }

    fn children_of_id(&self, parent: DataObjectId) -> Result<&ChildMap> {
        if parent.is_root() {
            return Ok(&self.root);
        }
        let object = self
            .objects
            .get(&parent)
            .ok_or_else(|| DataGraphError::MissingInput(format!("parent {}", parent)))?;
        object.children().ok_or_else(|| {
            DataGraphError::type_mismatch(parent, "group-like object", describe_kind(object))
        })
    }

    fn child_map_mut(&mut self, parent: DataObjectId) -> Option<&mut ChildMap> {
        if parent.is_root() {
            Some(&mut self.root)
        } else {
            self.objects.get_mut(&parent)?.payload.children_mut()
        }
    }

    pub fn top_level_ids(&self) -> Vec<DataObjectId> {
        self.root.ids().collect()
    }

    /// Whether `ancestor` is reachable by walking up from `id`.
    pub fn is_ancestor(&self, ancestor: DataObjectId, id: DataObjectId) -> bool {
        let mut stack = vec![id];
        let mut seen = BTreeSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(object) = self.objects.get(&current) {
                for &parent in object.parent_ids() {
                    if parent == ancestor {
                        return true;
                    }
                    stack.push(parent);
                }
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Shared ownership
    // ------------------------------------------------------------------

    /// Link `id` under another parent, keeping its existing parents.
    pub fn set_additional_parent(&mut self, id: DataObjectId, parent: DataObjectId) -> Result<()> {
        let object = self
            .objects
            .get(&id)
            .ok_or_else(|| DataGraphError::MissingInput(format!("object {}", id)))?;
        if object.parent_ids().contains(&parent) {
            return Err(DataGraphError::GraphConsistency(format!(
                "{} is already a child of {}",
                id, parent
            )));
        }
        if parent == id || self.is_ancestor(id, parent) {
            return Err(DataGraphError::MoveCycle { id, parent });
        }
        let name = object.name().to_string();
        self.check_can_adopt(parent, &name, &object.payload)?;

        if let Some(children) = self.child_map_mut(parent) {
            children.insert(name, id);
        }
        if let Some(object) = self.objects.get_mut(&id) {
            object.parent_ids.insert(parent);
        }
        tracing::debug!("Linked {} under additional parent {}", id, parent);
        Ok(())
    }

    /// Drop one parent link; the object is deallocated with its last link.
    pub fn remove_parent(&mut self, id: DataObjectId, parent: DataObjectId) -> Result<()> {
        let object = self
            .objects
            .get(&id)
            .ok_or_else(|| DataGraphError::MissingInput(format!("object {}", id)))?;
        if !object.parent_ids().contains(&parent) {
            return Err(DataGraphError::GraphConsistency(format!(
                "{} is not a child of {}",
                id, parent
            )));
        }
        self.unlink(id, parent);
        Ok(())
    }

    /// Remove every link to `id`, deallocating it.
    pub fn remove_data(&mut self, id: DataObjectId) -> Result<()> {
        let parents: Vec<DataObjectId> = self
            .objects
            .get(&id)
            .ok_or_else(|| DataGraphError::MissingInput(format!("object {}", id)))?
            .parent_ids()
            .iter()
            .copied()
            .collect();
        for parent in parents {
            self.unlink(id, parent);
        }
        Ok(())
    }

    fn unlink(&mut self, id: DataObjectId, parent: DataObjectId) {
        if let Some(children) = self.child_map_mut(parent) {
            children.remove_id(id);
        }
        let orphaned = match self.objects.get_mut(&id) {
            Some(object) => {
                object.parent_ids.remove(&parent);
                object.parent_ids.is_empty()
            }
            None => false,
        };
        if orphaned {
            self.deallocate(id);
        }
    }

    fn deallocate(&mut self, id: DataObjectId) {
        let Some(object) = self.objects.remove(&id) else {
            return;
        };
        tracing::debug!("Deallocated {} '{}'", id, object.name());
        self.clear_geometry_references(id);
        if let Some(children) = object.children() {
            for child in children.ids() {
                self.unlink(child, id);
            }
        }
    }

    fn clear_geometry_references(&mut self, removed: DataObjectId) {
        for object in self.objects.values_mut() {
            match &mut object.payload {
                ObjectPayload::ImageGeom(geom) if geom.cell_data == Some(removed) => {
                    geom.cell_data = None;
                }
                ObjectPayload::TriangleGeom(geom) => {
                    for slot in [&mut geom.vertices, &mut geom.faces, &mut geom.face_data] {
                        if *slot == Some(removed) {
                            *slot = None;
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Rename an object, checking for collisions under every parent.
    pub fn rename(&mut self, id: DataObjectId, new_name: &str) -> Result<()> {
        DataPath::check_segment(new_name)?;
        let object = self
            .objects
            .get(&id)
            .ok_or_else(|| DataGraphError::MissingInput(format!("object {}", id)))?;
        if object.name() == new_name {
            return Ok(());
        }
        let parents: Vec<DataObjectId> = object.parent_ids().iter().copied().collect();
        for &parent in &parents {
            if self.children_of_id(parent)?.contains_name(new_name) {
                return Err(DataGraphError::NameCollision {
                    name: new_name.to_string(),
                    parent: self.describe_parent(parent),
                });
            }
        }
        for parent in parents {
            if let Some(children) = self.child_map_mut(parent) {
                children.rename(id, new_name);
            }
        }
        if let Some(object) = self.objects.get_mut(&id) {
            tracing::debug!("Renamed {} '{}' to '{}'", id, object.name(), new_name);
            object.set_name(new_name.to_string());
        }
        Ok(())
    }

    /// Resolve `path`, creating missing groups along the way.
    pub fn make_path(&mut self, path: &DataPath) -> Result<DataObjectId> {
        if path.is_empty() {
            return Err(DataGraphError::EmptyPath);
        }
        // Validate the whole walk before creating anything.
        let mut parent = DataObjectId::ROOT;
        let mut existing = 0;
        for segment in path.segments() {
            match self.children_of_id(parent)?.get(segment) {
                Some(id) => {
                    parent = id;
                    existing += 1;
                }
                None => break,
            }
        }
        if existing == path.len() {
            return Ok(parent);
        }

        for segment in &path.segments()[existing..] {
            parent = self.create_group(segment, Some(parent).filter(|p| !p.is_root()))?;
        }
        Ok(parent)
    }

    // ------------------------------------------------------------------
    // Geometry and attribute matrix helpers
    // ------------------------------------------------------------------

    /// Number of elements a geometry's element data must have.
    pub fn geometry_element_count(&self, geom_id: DataObjectId) -> Result<usize> {
        let object = self.objects.get(&geom_id).ok_or(DataGraphError::DanglingId(geom_id))?;
        match &object.payload {
            ObjectPayload::ImageGeom(geom) => Ok(geom.number_of_elements()),
            ObjectPayload::TriangleGeom(geom) => match geom.faces {
                Some(faces) => Ok(self.get_object_as::<AnyDataArray>(faces)?.number_of_tuples()),
                None => Ok(0),
            },
            _ => Err(DataGraphError::type_mismatch(geom_id, "geometry", describe_kind(object))),
        }
    }

    /// Associate an AttributeMatrix as a geometry's per-element data.
    pub fn set_geometry_element_data(&mut self, geom_id: DataObjectId, matrix_id: DataObjectId) -> Result<()> {
        let tuples = self.get_object_as::<AttributeMatrix>(matrix_id)?.number_of_tuples();
        let expected = self.geometry_element_count(geom_id)?;
        if tuples != expected {
            return Err(DataGraphError::ShapeMismatch(format!(
                "element data {} has {} tuples but geometry {} has {} elements",
                matrix_id, tuples, geom_id, expected
            )));
        }
        match self.objects.get_mut(&geom_id).map(|o| &mut o.payload) {
            Some(ObjectPayload::ImageGeom(geom)) => geom.cell_data = Some(matrix_id),
            Some(ObjectPayload::TriangleGeom(geom)) => geom.face_data = Some(matrix_id),
            _ => return Err(DataGraphError::DanglingId(geom_id)),
        }
        Ok(())
    }

    /// Set the vertex list of a triangle mesh: float32 with 3 components.
    pub fn set_triangle_vertices(&mut self, geom_id: DataObjectId, vertices_id: DataObjectId) -> Result<()> {
        self.check_mesh_array(vertices_id, DataType::Float32)?;
        self.get_object_as_mut::<TriangleGeom>(geom_id)?.vertices = Some(vertices_id);
        Ok(())
    }

    /// Set the face list of a triangle mesh: uint64 with 3 components.
    pub fn set_triangle_faces(&mut self, geom_id: DataObjectId, faces_id: DataObjectId) -> Result<()> {
        self.check_mesh_array(faces_id, DataType::UInt64)?;
        let geom = self.get_object_as::<TriangleGeom>(geom_id)?;
        if let Some(face_data) = geom.face_data {
            let faces = self.get_object_as::<AnyDataArray>(faces_id)?.number_of_tuples();
            let tuples = self.get_object_as::<AttributeMatrix>(face_data)?.number_of_tuples();
            if faces != tuples {
                return Err(DataGraphError::ShapeMismatch(format!(
                    "{} faces but face data has {} tuples",
                    faces, tuples
                )));
            }
        }
        self.get_object_as_mut::<TriangleGeom>(geom_id)?.faces = Some(faces_id);
        Ok(())
    }

    fn check_mesh_array(&self, id: DataObjectId, data_type: DataType) -> Result<()> {
        let array = self.get_object_as::<AnyDataArray>(id)?;
        if array.data_type() != data_type {
            return Err(DataGraphError::type_mismatch(id, data_type, array.data_type()));
        }
        if array.number_of_components() != 3 {
            return Err(DataGraphError::ShapeMismatch(format!(
                "{} has {} components, expected 3",
                id,
                array.number_of_components()
            )));
        }
        Ok(())
    }

    fn get_object_as_mut<K: ObjectKind>(&mut self, id: DataObjectId) -> Result<&mut K> {
        let object = self.objects.get_mut(&id).ok_or(DataGraphError::DanglingId(id))?;
        let actual = describe_kind(object);
        object
            .as_kind_mut::<K>()
            .ok_or_else(|| DataGraphError::type_mismatch(id, K::kind_name(), actual))
    }

    /// Change an AttributeMatrix's tuple shape and reshape every child array.
    pub fn resize_attribute_matrix(&mut self, matrix_id: DataObjectId, tuple_shape: Vec<usize>) -> Result<()> {
        let children: Vec<DataObjectId> = self
            .get_object_as::<AttributeMatrix>(matrix_id)?
            .children()
            .ids()
            .collect();
        if tuple_shape.is_empty() {
            return Err(DataGraphError::ShapeMismatch(
                "attribute matrix needs a non-empty tuple shape".to_string(),
            ));
        }
        checked_shape_size(&tuple_shape)?;
        for &child in &children {
            if let Some(object) = self.objects.get(&child) {
                if object.parent_ids().len() > 1 {
                    return Err(DataGraphError::GraphConsistency(format!(
                        "cannot reshape {} while it is shared by other parents",
                        child
                    )));
                }
                if let Some(array) = object.as_kind::<AnyDataArray>() {
                    array
                        .check_reshape(&tuple_shape)
                        .context(format!("Reshaping {}", child))?;
                }
            }
        }
        for child in children {
            if let Some(array) = self
                .objects
                .get_mut(&child)
                .and_then(|o| o.as_kind_mut::<AnyDataArray>())
            {
                array.reshape_tuples(&tuple_shape)?;
            }
        }
        self.get_object_as_mut::<AttributeMatrix>(matrix_id)?
            .set_tuple_shape(tuple_shape);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Snapshots and checks
    // ------------------------------------------------------------------

    /// Depth-first listing of every reachable path in child insertion order.
    pub fn hierarchy(&self) -> Vec<HierarchyEntry> {
        let mut entries = Vec::new();
        self.walk(&self.root, &DataPath::root(), &mut entries);
        entries
    }

    fn walk(&self, children: &ChildMap, base: &DataPath, out: &mut Vec<HierarchyEntry>) {
        for (name, id) in children.iter() {
            let Some(object) = self.objects.get(&id) else {
                continue;
            };
            let Ok(path) = base.create_child_path(name) else {
                continue;
            };
            let (data_type, tuple_shape, component_shape, placeholder) = match &object.payload {
                ObjectPayload::Array(array) => (
                    Some(array.data_type()),
                    array.tuple_shape().to_vec(),
                    array.component_shape().to_vec(),
                    array.is_placeholder(),
                ),
                ObjectPayload::AttributeMatrix(matrix) => (None, matrix.tuple_shape().to_vec(), Vec::new(), false),
                _ => (None, Vec::new(), Vec::new(), false),
            };
            out.push(HierarchyEntry {
                path: path.clone(),
                id,
                object_type: object.object_type(),
                data_type,
                tuple_shape,
                component_shape,
                placeholder,
            });
            if let Some(grandchildren) = object.children() {
                self.walk(grandchildren, &path, out);
            }
        }
    }

    /// Verify parent/child bookkeeping is symmetric and free of dangling IDs.
    pub fn check_integrity(&self) -> Result<()> {
        for id in self.root.ids() {
            let object = self.objects.get(&id).ok_or(DataGraphError::DanglingId(id))?;
            if !object.parent_ids().contains(&DataObjectId::ROOT) {
                return Err(DataGraphError::GraphConsistency(format!("{} missing root link", id)));
            }
        }
        for object in self.objects.values() {
            if object.parent_ids().is_empty() {
                return Err(DataGraphError::GraphConsistency(format!("{} has no parent", object.id())));
            }
            for &parent in object.parent_ids() {
                let children = self.children_of_id(parent)?;
                if children.name_of(object.id()) != Some(object.name()) {
                    return Err(DataGraphError::GraphConsistency(format!(
                        "{} is not listed under parent {}",
                        object.id(),
                        parent
                    )));
                }
            }
            if let Some(children) = object.children() {
                for child in children.ids() {
                    let child_object = self.objects.get(&child).ok_or(DataGraphError::DanglingId(child))?;
                    if !child_object.parent_ids().contains(&object.id()) {
                        return Err(DataGraphError::GraphConsistency(format!(
                            "{} does not record parent {}",
                            child,
                            object.id()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn describe_parent(&self, parent: DataObjectId) -> String {
        if parent.is_root() {
            return parent.to_string();
        }
        match self.get_data_paths_for_id(parent).first() {
            Some(path) => format!("'{}'", path),
            None => parent.to_string(),
        }
    }
}

static EMPTY_CHILDREN: ChildMap = ChildMap::EMPTY;

fn describe_payload(ds: &DataStructure, id: DataObjectId) -> String {
    ds.objects
        .get(&id)
        .map(describe_kind)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_path;
    use crate::structure::store::DataStoreBuf;

    fn sample() -> (DataStructure, DataObjectId, DataObjectId) {
        let mut ds = DataStructure::new();
        let group = ds.create_group("Data", None).unwrap();
        let array = ds
            .create_array::<f32>("Values", &[10], &[3], StoreMode::Materialized, Some(group))
            .unwrap();
        (ds, group, array)
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut ds = DataStructure::new();
        let a = ds.create_group("A", None).unwrap();
        let b = ds.create_group("B", None).unwrap();
        ds.remove_data(a).unwrap();
        let c = ds.create_group("C", None).unwrap();
        assert!(a < b && b < c);
        assert_eq!(ds.next_id(), c.next());
    }

    #[test]
    fn test_name_collision_is_rejected() {
        let (mut ds, group, _) = sample();
        let err = ds
            .create_array::<i32>("Values", &[10], &[1], StoreMode::Materialized, Some(group))
            .unwrap_err();
        assert!(matches!(err, DataGraphError::NameCollision { .. }));
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn test_invalid_names() {
        let mut ds = DataStructure::new();
        assert!(matches!(ds.create_group("", None), Err(DataGraphError::InvalidName(_))));
        assert!(matches!(ds.create_group("a/b", None), Err(DataGraphError::InvalidName(_))));
    }

    #[test]
    fn test_parent_must_exist_and_be_group_like() {
        let (mut ds, _, array) = sample();
        assert!(matches!(
            ds.create_group("X", Some(DataObjectId(99))),
            Err(DataGraphError::MissingInput(_))
        ));
        assert!(matches!(
            ds.create_group("X", Some(array)),
            Err(DataGraphError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_get_data_as() {
        let (ds, _, _) = sample();
        let path = data_path!["Data", "Values"];
        assert_eq!(ds.get_data_as::<DataArray<f32>>(&path).unwrap().number_of_tuples(), 10);
        assert!(matches!(
            ds.get_data_as::<DataArray<i32>>(&path),
            Err(DataGraphError::TypeMismatch { .. })
        ));
        assert!(matches!(
            ds.get_data_as::<DataGroup>(&data_path!["Nope"]),
            Err(DataGraphError::NotFound(_))
        ));
    }

    #[test]
    fn test_multi_parent_paths_and_removal() {
        let (mut ds, group, array) = sample();
        let other = ds.create_group("Other", None).unwrap();
        ds.set_additional_parent(array, other).unwrap();

        let mut paths: Vec<String> = ds
            .get_data_paths_for_id(array)
            .iter()
            .map(ToString::to_string)
            .collect();
        paths.sort();
        assert_eq!(paths, vec!["Data/Values", "Other/Values"]);

        ds.remove_parent(array, group).unwrap();
        assert!(ds.contains(array));
        ds.remove_parent(array, other).unwrap();
        assert!(!ds.contains(array));
        ds.check_integrity().unwrap();
    }

    #[test]
    fn test_removing_group_cascades() {
        let (mut ds, group, array) = sample();
        let nested = ds.create_group("Nested", Some(group)).unwrap();
        ds.remove_data(group).unwrap();
        assert!(!ds.contains(array));
        assert!(!ds.contains(nested));
        assert!(ds.is_empty());
    }

    #[test]
    fn test_shared_child_survives_cascade() {
        let (mut ds, group, array) = sample();
        let keep = ds.create_group("Keep", None).unwrap();
        ds.set_additional_parent(array, keep).unwrap();
        ds.remove_data(group).unwrap();
        assert!(ds.contains(array));
        assert_eq!(ds.get_data_paths_for_id(array), vec![data_path!["Keep", "Values"]]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut ds = DataStructure::new();
        let a = ds.create_group("A", None).unwrap();
        let b = ds.create_group("B", Some(a)).unwrap();
        assert!(matches!(ds.set_additional_parent(a, b), Err(DataGraphError::MoveCycle { .. })));
        assert!(matches!(ds.set_additional_parent(a, a), Err(DataGraphError::MoveCycle { .. })));
    }

    #[test]
    fn test_make_path() {
        let mut ds = DataStructure::new();
        let id = ds.make_path(&data_path!["A", "B", "C"]).unwrap();
        assert_eq!(ds.get_id(&data_path!["A", "B", "C"]), Some(id));
        assert_eq!(ds.make_path(&data_path!["A", "B", "C"]).unwrap(), id);
        assert_eq!(ds.len(), 3);

        let b = ds.get_id(&data_path!["A", "B"]).unwrap();
        ds.create_array::<u8>("Leaf", &[1], &[1], StoreMode::Materialized, Some(b))
            .unwrap();
        let before = ds.len();
        assert!(matches!(
            ds.make_path(&data_path!["A", "B", "Leaf", "Deeper"]),
            Err(DataGraphError::TypeMismatch { .. })
        ));
        assert_eq!(ds.len(), before);
    }

    #[test]
    fn test_rename_checks_every_parent() {
        let (mut ds, _, array) = sample();
        let other = ds.create_group("Other", None).unwrap();
        ds.create_group("Taken", Some(other)).unwrap();
        ds.set_additional_parent(array, other).unwrap();
        assert!(matches!(ds.rename(array, "Taken"), Err(DataGraphError::NameCollision { .. })));
        ds.rename(array, "Renamed").unwrap();
        assert!(ds.get_id(&data_path!["Data", "Renamed"]).is_some());
        assert!(ds.get_id(&data_path!["Other", "Renamed"]).is_some());
        ds.check_integrity().unwrap();
    }

    #[test]
    fn test_attribute_matrix_tuple_invariant() {
        let mut ds = DataStructure::new();
        let matrix = ds.create_attribute_matrix("Cell Data", vec![2, 3], None).unwrap();
        ds.create_array::<f64>("Ok", &[6], &[1], StoreMode::Materialized, Some(matrix))
            .unwrap();
        assert!(matches!(
            ds.create_array::<f64>("Bad", &[5], &[1], StoreMode::Materialized, Some(matrix)),
            Err(DataGraphError::ShapeMismatch(_))
        ));
        ds.resize_attribute_matrix(matrix, vec![4]).unwrap();
        let ok = ds.get_data_as::<AnyDataArray>(&data_path!["Cell Data", "Ok"]).unwrap();
        assert_eq!(ok.number_of_tuples(), 4);
    }

    #[test]
    fn test_resize_attribute_matrix_checks_every_child_first() {
        let mut ds = DataStructure::new();
        let matrix = ds.create_attribute_matrix("Cell Data", vec![4], None).unwrap();
        ds.create_array::<f32>("Resizable", &[4], &[1], StoreMode::Materialized, Some(matrix))
            .unwrap();
        let fixed = DataStoreBuf::<f32>::new(&[4], &[1]).unwrap().fixed();
        ds.insert_object("Fixed", DataArray::from_store(Box::new(fixed)), Some(matrix))
            .unwrap();

        let err = ds.resize_attribute_matrix(matrix, vec![5]).unwrap_err();
        assert!(matches!(err.root_cause(), DataGraphError::ShapeMismatch(_)));

        let resizable = ds.get_data_as::<AnyDataArray>(&data_path!["Cell Data", "Resizable"]).unwrap();
        assert_eq!(resizable.number_of_tuples(), 4);
        assert_eq!(ds.get_object_as::<AttributeMatrix>(matrix).unwrap().number_of_tuples(), 4);

        // Same element count keeps the fixed store valid
        ds.resize_attribute_matrix(matrix, vec![2, 2]).unwrap();
        let fixed = ds.get_data_as::<AnyDataArray>(&data_path!["Cell Data", "Fixed"]).unwrap();
        assert_eq!(fixed.tuple_shape(), &[2, 2]);
        ds.check_integrity().unwrap();
    }

    #[test]
    fn test_overflowing_shapes_rejected() {
        let mut ds = DataStructure::new();
        assert!(matches!(
            ds.create_attribute_matrix("Huge", vec![usize::MAX, 2], None),
            Err(DataGraphError::ShapeMismatch(_))
        ));
        let spec = ImageGeomSpec {
            dimensions: [usize::MAX, 2, 1],
            ..Default::default()
        };
        assert!(matches!(
            ds.create_image_geom("Huge", spec, None),
            Err(DataGraphError::ShapeMismatch(_))
        ));
        let matrix = ds.create_attribute_matrix("Cells", vec![2], None).unwrap();
        assert!(ds.resize_attribute_matrix(matrix, vec![usize::MAX, 2]).is_err());
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_geometry_element_data() {
        let mut ds = DataStructure::new();
        let spec = ImageGeomSpec {
            dimensions: [2, 2, 2],
            ..Default::default()
        };
        let geom = ds.create_image_geom("Image", spec, None).unwrap();
        let good = ds.create_attribute_matrix("Cells", vec![2, 2, 2], Some(geom)).unwrap();
        let bad = ds.create_attribute_matrix("Wrong", vec![3], Some(geom)).unwrap();
        assert!(matches!(
            ds.set_geometry_element_data(geom, bad),
            Err(DataGraphError::ShapeMismatch(_))
        ));
        ds.set_geometry_element_data(geom, good).unwrap();
        assert_eq!(ds.get_object_as::<ImageGeom>(geom).unwrap().cell_data_id(), Some(good));

        ds.remove_data(good).unwrap();
        assert_eq!(ds.get_object_as::<ImageGeom>(geom).unwrap().cell_data_id(), None);
    }

    #[test]
    fn test_triangle_geometry() {
        let mut ds = DataStructure::new();
        let mesh = ds.create_triangle_geom("Mesh", None).unwrap();
        let verts = ds
            .create_array::<f32>("Vertices", &[4], &[3], StoreMode::Materialized, Some(mesh))
            .unwrap();
        let faces = ds
            .create_array::<u64>("Faces", &[2], &[3], StoreMode::Materialized, Some(mesh))
            .unwrap();
        assert!(ds.set_triangle_vertices(mesh, faces).is_err());
        ds.set_triangle_vertices(mesh, verts).unwrap();
        ds.set_triangle_faces(mesh, faces).unwrap();
        assert_eq!(ds.geometry_element_count(mesh).unwrap(), 2);
        let face_data = ds.create_attribute_matrix("Face Data", vec![2], Some(mesh)).unwrap();
        ds.set_geometry_element_data(mesh, face_data).unwrap();
    }

    #[test]
    fn test_metadata_clone_drops_values_only() {
        let (ds, _, array) = sample();
        let copy = ds.metadata_clone();
        assert_eq!(copy.next_id(), ds.next_id());
        let entries: Vec<_> = copy.hierarchy().into_iter().map(|e| (e.path, e.id)).collect();
        let original: Vec<_> = ds.hierarchy().into_iter().map(|e| (e.path, e.id)).collect();
        assert_eq!(entries, original);
        let cloned = copy.get_object_as::<AnyDataArray>(array).unwrap();
        assert!(cloned.is_placeholder());
        assert_eq!(cloned.size(), 30);
        copy.check_integrity().unwrap();
    }

    #[test]
    fn test_hierarchy_lists_shared_objects_per_path() {
        let (mut ds, _, array) = sample();
        let other = ds.create_group("Other", None).unwrap();
        ds.set_additional_parent(array, other).unwrap();
        let entries = ds.hierarchy();
        let paths: Vec<String> = entries.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["Data", "Data/Values", "Other", "Other/Values"]);
        assert_eq!(entries[1].data_type, Some(DataType::Float32));
        assert_eq!(entries[1].component_shape, vec![3]);
    }
}
