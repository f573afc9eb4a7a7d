//! Script-wide placeholders resolved after rendering.

use std::borrow::Cow;

use super::template;
use crate::model::entity::MeshParameters;

/// Values that are only known once extraction has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Globals {
    pub geometry_file_name: Option<String>,
    pub surface_element_type: Option<String>,
    pub surface_mesh_parameters_id: String,
    pub test_bench_name: String,
}

impl Globals {
    pub const GEOMETRY_FILE_NAME: &'static str = "Geometry_File_Name";
    pub const SURFACE_ELEMENT_TYPE: &'static str = "Surface_Element_Type";
    pub const SURFACE_MESH_PARAMETERS_ID: &'static str = "Surface_Mesh_Parameters_ID";
    pub const TEST_BENCH_NAME: &'static str = "Test_Bench_Name";

    pub fn new(test_bench_name: &str) -> Self {
        Self {
            geometry_file_name: None,
            surface_element_type: None,
            surface_mesh_parameters_id: MeshParameters::ID.to_string(),
            test_bench_name: test_bench_name.to_string(),
        }
    }

    fn value(&self, name: &str) -> Option<&str> {
        match name {
            Self::GEOMETRY_FILE_NAME => self.geometry_file_name.as_deref(),
            Self::SURFACE_ELEMENT_TYPE => self.surface_element_type.as_deref(),
            Self::SURFACE_MESH_PARAMETERS_ID => Some(&self.surface_mesh_parameters_id),
            Self::TEST_BENCH_NAME => Some(&self.test_bench_name),
            _ => None,
        }
    }

    /// Substitutes the globals into the fully rendered script.
    ///
    /// Must run once, after every block has been rendered. Unset globals are
    /// left as placeholders.
    pub fn apply(&self, script: &str) -> String {
        template::substitute(script, |name| self.value(name).map(Cow::Borrowed))
    }
}
