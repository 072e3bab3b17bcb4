use crate::actions::{resolve_parent, DataAction, DataCreationAction, Mode};
use crate::error::Result;
use crate::structure::{DataPath, DataStructure, ImageGeomSpec};

/// Create an image geometry together with its cell AttributeMatrix.
#[derive(Debug, Clone)]
pub struct CreateImageGeometryAction {
    path: DataPath,
    spec: ImageGeomSpec,
    cell_data_name: String,
}

impl CreateImageGeometryAction {
    pub const DEFAULT_CELL_DATA_NAME: &'static str = "Cell Data";

    pub fn new(path: DataPath, spec: ImageGeomSpec) -> Self {
        Self {
            path,
            spec,
            cell_data_name: Self::DEFAULT_CELL_DATA_NAME.to_string(),
        }
    }

    pub fn with_cell_data_name(mut self, name: &str) -> Self {
        self.cell_data_name = name.to_string();
        self
    }

    fn cell_data_path(&self) -> Result<DataPath> {
        self.path.create_child_path(&self.cell_data_name)
    }
}

impl DataAction for CreateImageGeometryAction {
    fn apply(&self, ds: &mut DataStructure, _mode: Mode) -> Result<()> {
        let name = self.path.target_name()?;
        DataPath::check_segment(&self.cell_data_name)?;
        let parent = resolve_parent(ds, &self.path)?;
        let geom = ds.create_image_geom(name, self.spec, parent)?;
        let cells = ds.create_attribute_matrix(&self.cell_data_name, self.spec.cell_tuple_shape(), Some(geom))?;
        ds.set_geometry_element_data(geom, cells)
    }

    fn clone_box(&self) -> Box<dyn DataAction> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("create image geometry '{}' {:?}", self.path, self.spec.dimensions)
    }

    fn as_creation(&self) -> Option<&dyn DataCreationAction> {
        Some(self)
    }
}

impl DataCreationAction for CreateImageGeometryAction {
    fn created_path(&self) -> &DataPath {
        &self.path
    }

    fn all_created_paths(&self) -> Vec<DataPath> {
        let mut paths = vec![self.path.clone()];
        paths.extend(self.cell_data_path().ok());
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_path;
    use crate::structure::{AttributeMatrix, ImageGeom};

    #[test]
    fn test_geometry_with_cell_data() {
        let spec = ImageGeomSpec {
            dimensions: [3, 2, 1],
            ..Default::default()
        };
        let action = CreateImageGeometryAction::new(data_path!["Image"], spec);
        let mut ds = DataStructure::new();
        action.apply(&mut ds, Mode::Preflight).unwrap();

        let cells = ds
            .get_data_as::<AttributeMatrix>(&data_path!["Image", "Cell Data"])
            .unwrap();
        assert_eq!(cells.tuple_shape(), &[1, 2, 3]);
        let geom = ds.get_data_as::<ImageGeom>(&data_path!["Image"]).unwrap();
        assert!(geom.cell_data_id().is_some());
        assert_eq!(
            action.all_created_paths(),
            vec![data_path!["Image"], data_path!["Image", "Cell Data"]]
        );
    }
}
