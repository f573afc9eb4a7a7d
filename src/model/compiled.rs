use super::entity::{
    Analysis, Constraint, DisplacementSpecifier, Geometry, Layer, Layup, Load, Material,
    MeshParameters, PinSpecifier, Point, ScalarLoadValue, Solid, Surface, SurfaceContents,
};
use super::table::Table;

/// Every entity table built during one compiler run.
///
/// Tables are listed in the order they are rendered.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    pub analysis: Analysis,
    pub mesh_parameters: MeshParameters,
    pub points: Table<Point>,
    pub geometries: Table<Geometry>,
    pub surfaces: Table<Surface>,
    pub solids: Table<Solid>,
    pub materials: Table<Material>,
    pub loads: Table<Load>,
    pub load_values: Table<ScalarLoadValue>,
    pub constraints: Table<Constraint>,
    pub displacements: Table<DisplacementSpecifier>,
    pub pins: Table<PinSpecifier>,
    pub layups: Table<Layup>,
    pub layers: Table<Layer>,
    pub surface_contents: Table<SurfaceContents>,
}

/// Row count of one entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCount {
    pub name: &'static str,
    pub count: usize,
}

impl CompiledModel {
    /// Whether any component contributed a layup.
    #[inline]
    pub fn is_surface_model(&self) -> bool {
        !self.layups.is_empty()
    }

    /// Whether any component was meshed as solid stock.
    #[inline]
    pub fn has_solids(&self) -> bool {
        !self.solids.is_empty()
    }

    /// Row counts of every per-instance table, in render order.
    pub fn table_counts(&self) -> Vec<TableCount> {
        let count = |name, count| TableCount { name, count };
        vec![
            count("Point", self.points.len()),
            count("Geometry", self.geometries.len()),
            count("Surface", self.surfaces.len()),
            count("Solid", self.solids.len()),
            count("Material", self.materials.len()),
            count("Load", self.loads.len()),
            count("Load_Value_Scalar", self.load_values.len()),
            count("Constraint", self.constraints.len()),
            count("Constraint_Specifier_Displacement", self.displacements.len()),
            count("Constraint_Specifier_Pin", self.pins.len()),
            count("Material_Layup", self.layups.len()),
            count("Layer", self.layers.len()),
            count("Surface_Contents", self.surface_contents.len()),
        ]
    }
}
