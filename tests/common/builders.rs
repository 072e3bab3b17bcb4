//! Test data builders for creating structures and arguments

use datagraph_rs::{
    data_path,
    filters::{CreateDataArrayFilter, CreateDataGroupFilter, InitType},
    parameters::Arguments,
    structure::{DataArray, DataObjectId, DataPath, DataStructure, ImageGeomSpec, StoreMode},
    types::DataType,
};

/// Builder for small structures used across integration tests
pub struct StructureBuilder {
    ds: DataStructure,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self {
            ds: DataStructure::new(),
        }
    }

    /// Add a group at `path`, creating missing parents
    pub fn group(mut self, path: DataPath) -> Self {
        self.ds.make_path(&path).expect("make_path");
        self
    }

    /// Add a materialized float32 array with values 0, 1, 2, ...
    pub fn ramp(mut self, path: DataPath, tuples: usize, components: usize) -> Self {
        let parent = self.parent_of(&path);
        let values: Vec<f32> = (0..tuples * components).map(|i| i as f32).collect();
        let array = DataArray::from_vec(values, &[tuples], &[components]).expect("from_vec");
        self.ds
            .insert_object(path.target_name().expect("name"), array, parent)
            .expect("insert ramp");
        self
    }

    /// Add an array of any kind without values
    pub fn placeholder(mut self, path: DataPath, data_type: DataType, tuples: usize) -> Self {
        let parent = self.parent_of(&path);
        let array = datagraph_rs::structure::AnyDataArray::new(data_type, &[tuples], &[1], StoreMode::Placeholder)
            .expect("placeholder");
        self.ds
            .insert_object(path.target_name().expect("name"), array, parent)
            .expect("insert placeholder");
        self
    }

    /// Add an image geometry with its cell data matrix
    pub fn image(mut self, name: &str, dimensions: [usize; 3]) -> Self {
        let spec = ImageGeomSpec {
            dimensions,
            ..ImageGeomSpec::default()
        };
        let geom = self.ds.create_image_geom(name, spec, None).expect("image");
        let cells = self
            .ds
            .create_attribute_matrix("Cell Data", spec.cell_tuple_shape(), Some(geom))
            .expect("cell data");
        self.ds.set_geometry_element_data(geom, cells).expect("link cell data");
        self
    }

    /// Link an existing object under another existing group
    pub fn share(mut self, object: DataPath, parent: DataPath) -> Self {
        let id = self.ds.get_id(&object).expect("shared object");
        let parent = self.ds.get_id(&parent).expect("new parent");
        self.ds.set_additional_parent(id, parent).expect("share");
        self
    }

    fn parent_of(&mut self, path: &DataPath) -> Option<DataObjectId> {
        let parent = path.parent();
        if parent.is_empty() {
            None
        } else {
            Some(self.ds.make_path(&parent).expect("parent"))
        }
    }

    pub fn build(self) -> DataStructure {
        self.ds
    }
}

impl Default for StructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Arguments for CreateDataGroupFilter
pub fn group_args(path: DataPath) -> Arguments {
    Arguments::new().with(CreateDataGroupFilter::K_DATA_OBJECT_PATH, path)
}

/// Arguments for CreateDataArrayFilter filling with a constant
pub fn array_args(path: DataPath, data_type: DataType, tuples: Vec<usize>, fill: f64) -> Arguments {
    Arguments::new()
        .with(CreateDataArrayFilter::K_DATA_PATH, path)
        .with(CreateDataArrayFilter::K_DATA_TYPE, data_type)
        .with(CreateDataArrayFilter::K_TUPLE_SHAPE, tuples)
        .with(CreateDataArrayFilter::K_INIT_TYPE, InitType::Fill.index())
        .with(CreateDataArrayFilter::K_INIT_VALUE, fill)
}

/// The standard "Data/Values" scenario path
pub fn values_path() -> DataPath {
    data_path!["Data", "Values"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_builder() {
        let ds = StructureBuilder::new()
            .group(data_path!["A", "B"])
            .ramp(data_path!["A", "B", "X"], 3, 2)
            .build();
        assert_eq!(ds.len(), 3);
        let array = ds.get_data_as::<DataArray<f32>>(&data_path!["A", "B", "X"]).unwrap();
        assert_eq!(array.get_component(2, 1).unwrap(), 5.0);
    }
}
