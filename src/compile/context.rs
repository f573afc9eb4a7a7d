use std::collections::HashMap;

use tracing::warn;

use super::config::CompileConfig;
use super::error::{Diagnostic, Error, Severity};
use super::globals::Globals;
use super::materials::{MaterialLibrary, MaterialResolver};
use crate::model::compiled::CompiledModel;
use crate::model::entity::{
    Analysis, Constraint, DisplacementSpecifier, Geometry, Layer, Layup, Load, Material,
    MeshParameters, PinSpecifier, Point, ScalarLoadValue, Solid, Surface, SurfaceContents,
};
use crate::model::table::{Id, Table};

/// A three-component vector metric from the computed-values document.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedVector {
    pub coordinates: [String; 3],
    pub units: String,
    pub xml_text: String,
}

/// State owned by one compiler run while the input documents are walked.
///
/// Tables start empty and only grow. Nothing here outlives the run.
pub struct ExtractionContext<'a> {
    pub config: &'a CompileConfig,
    resolver: MaterialResolver<'a>,
    pub computed: HashMap<String, ComputedVector>,
    /// Material name per component instance ID, from the metrics document.
    pub assignments: HashMap<String, String>,
    pub globals: Globals,

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

    diagnostics: Vec<Diagnostic>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(library: &'a MaterialLibrary, config: &'a CompileConfig) -> Self {
        Self {
            config,
            resolver: MaterialResolver::new(library),
            computed: HashMap::new(),
            assignments: HashMap::new(),
            globals: Globals::new(&config.test_bench_name),
            points: Table::new(),
            geometries: Table::new(),
            surfaces: Table::new(),
            solids: Table::new(),
            materials: Table::new(),
            loads: Table::new(),
            load_values: Table::new(),
            constraints: Table::new(),
            displacements: Table::new(),
            pins: Table::new(),
            layups: Table::new(),
            layers: Table::new(),
            surface_contents: Table::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Records warning-severity errors and passes fatal ones through.
    ///
    /// Returns `Ok(None)` when `result` held a warning.
    pub fn soften<T>(&mut self, result: Result<T, Error>) -> Result<Option<T>, Error> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.severity() == Severity::Warning => {
                self.warn(&error);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Records a warning.
    pub fn warn(&mut self, error: &Error) {
        warn!("{error}");
        self.diagnostics.push(Diagnostic::from(error));
    }

    /// Records a warning that has no error variant of its own.
    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Resolves `name` through the material cache, recording any warnings.
    pub fn material(&mut self, name: &str) -> Id {
        let (id, warnings) = self.resolver.resolve(&mut self.materials, name);
        for warning in &warnings {
            self.warn(warning);
        }
        id
    }

    /// ID of the point extracted for `metric_id`.
    pub fn point_for_metric(&self, metric_id: &str, origin: &str) -> Result<Id, Error> {
        self.points
            .id_of(metric_id)
            .ok_or_else(|| Error::unresolved(origin, "point", metric_id))
    }

    /// ID of the geometry extracted for `metric_id`.
    pub fn geometry_for_metric(&self, metric_id: &str, origin: &str) -> Result<Id, Error> {
        self.geometries
            .id_of(metric_id)
            .ok_or_else(|| Error::unresolved(origin, "geometry", metric_id))
    }

    /// Hands the tables over once extraction is complete.
    pub fn finish(
        self,
        analysis: Analysis,
        mesh_parameters: MeshParameters,
    ) -> (CompiledModel, Globals, Vec<Diagnostic>) {
        let model = CompiledModel {
            analysis,
            mesh_parameters,
            points: self.points,
            geometries: self.geometries,
            surfaces: self.surfaces,
            solids: self.solids,
            materials: self.materials,
            loads: self.loads,
            load_values: self.load_values,
            constraints: self.constraints,
            displacements: self.displacements,
            pins: self.pins,
            layups: self.layups,
            layers: self.layers,
            surface_contents: self.surface_contents,
        };
        (model, self.globals, self.diagnostics)
    }
}
