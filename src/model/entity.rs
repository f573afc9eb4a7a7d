//! Entity records.
//!
//! One record type per entity kind emitted into the script. Cross-references
//! between records are sequential [`Id`]s into the owning tables of a
//! [`CompiledModel`](super::compiled::CompiledModel); the external metric or
//! component identifiers are kept alongside for diagnostics only.

use super::table::Id;
use super::types::{AxisSetting, Instructions, LoadKind};

/// A reference point whose coordinates come from the computed-values document.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: Id,
    pub metric_id: String,
    /// `x`, `y`, `z`, kept as written in the computed values.
    pub coordinates: [String; 3],
    pub units: String,
    pub xml_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Face,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Face => "FACE",
        }
    }
}

/// A point-anchored geometric feature (a face picked by a point).
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub id: Id,
    pub metric_id: String,
    pub kind: GeometryKind,
    pub point: Id,
    pub xml_text: String,
}

/// A meshable surface on a layered component.
///
/// Element type and mesh-parameter set are resolved by the global pass, since
/// the shell element type is read after components are walked.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub id: Id,
    pub metric_id: String,
    pub geometry: Id,
    pub xml_text: String,
}

/// A solid component meshed with volume elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    pub id: Id,
    pub component_id: String,
    pub material: Id,
}

impl Solid {
    pub const ELEMENT_TYPE: &'static str = "TETRA10";
    pub const MESH_PARAMETERS_ID: u32 = 1;
}

/// One material property as it will be written.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A value in the output unit system.
    Known(String),
    /// A raw library value that could not be converted; emitted with a marker.
    Flagged(String),
    /// No value could be obtained from the library.
    Missing,
}

impl PropertyValue {
    pub const ATTENTION_MARKER: &'static str = "NEEDS_ATTENTION";

    pub fn render(&self) -> String {
        match self {
            PropertyValue::Known(v) => v.clone(),
            PropertyValue::Flagged(raw) => format!("{raw}  # {}", Self::ATTENTION_MARKER),
            PropertyValue::Missing => Self::ATTENTION_MARKER.to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, PropertyValue::Known(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProperties {
    /// Elastic modulus in MPa.
    pub elastic_modulus: PropertyValue,
    pub poissons_ratio: PropertyValue,
    pub density: PropertyValue,
    pub thermal_expansion: PropertyValue,
}

impl MaterialProperties {
    pub fn missing() -> Self {
        Self {
            elastic_modulus: PropertyValue::Missing,
            poissons_ratio: PropertyValue::Missing,
            density: PropertyValue::Missing,
            thermal_expansion: PropertyValue::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: Id,
    /// Name as first referenced by the assembly.
    pub name: String,
    /// Whether the name was found in the material library.
    pub resolved: bool,
    pub properties: MaterialProperties,
}

impl Material {
    pub const TROPIC_TYPE: &'static str = "ISOTROPIC";
}

/// One ply of a layup.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: Id,
    /// Layer identifier as written in the assembly.
    pub source_id: String,
    pub component_id: String,
    pub material: Id,
    pub material_name: String,
    pub thickness: String,
    pub orientation: String,
    pub drop_order: String,
    pub xml_text: String,
}

/// Ordered stack of layers applied to a layered component.
#[derive(Debug, Clone, PartialEq)]
pub struct Layup {
    pub id: Id,
    pub component_id: String,
    pub layers: Vec<Id>,
    pub position: String,
    pub offset_value: String,
}

/// Association of a surface with its layup and reference direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceContents {
    pub id: Id,
    pub component_id: String,
    pub surface: Id,
    pub layup: Id,
    pub direction_start: Id,
    pub direction_end: Id,
    pub position: String,
    pub offset_value: String,
    pub xml_text: String,
}

/// Pin constraint data; one property per child element of the `Pin` node.
#[derive(Debug, Clone, PartialEq)]
pub struct PinSpecifier {
    pub id: Id,
    pub source_id: String,
    pub properties: Vec<(String, String)>,
    pub xml_text: String,
}

/// A translation or rotation group of a displacement constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisGroup {
    /// Settings for x, y and z, in that order.
    pub axes: [AxisSetting; 3],
    pub units: String,
}

/// Displacement constraint data.
///
/// A missing group leaves every field of that group unset.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementSpecifier {
    pub id: Id,
    pub source_id: String,
    pub translation: Option<AxisGroup>,
    pub rotation: Option<AxisGroup>,
    pub xml_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Displacement,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Displacement => "DISPLACEMENT",
        }
    }
}

/// Link between a displacement specifier and the geometry it restrains.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub id: Id,
    pub kind: ConstraintKind,
    pub subcase: u32,
    pub geometry: Id,
    pub displacement: Id,
    pub feature_source_id: String,
    pub xml_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Load {
    pub id: Id,
    pub kind: LoadKind,
    pub subcase: u32,
    pub geometry: Id,
    pub value: Id,
    pub metric_id: String,
    pub comments: String,
    pub xml_text: String,
}

/// Magnitude and units of a scalar load.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarLoadValue {
    pub id: Id,
    pub magnitude: String,
    pub units: String,
    pub xml_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshParameters {
    pub max_global_length: String,
    pub max_curvature_delta: String,
    pub ratio_min_to_max_edge: String,
    pub face_proximity_tolerance: String,
    pub comments: String,
    pub xml_text: Option<String>,
}

impl MeshParameters {
    /// Only one mesh-parameter set is supported per model.
    pub const ID: u32 = 1;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub configuration_id: String,
    /// `101` for structural analyses, `103` otherwise.
    pub type_code: u16,
    pub solver: String,
    pub declared_solver: String,
    pub instructions: Instructions,
    pub date: String,
    pub xml_text: String,
}

impl Analysis {
    pub const SOURCE_MODEL: &'static str = "0101";
}
