//! Entity extraction.
//!
//! Walks the three documents in a fixed dependency order so that every
//! cross-reference points at an entity that already has its ID:
//! computed vectors and material assignments, points, geometries, components
//! (solids, layups, surfaces, surface contents), constraint specifiers and
//! constraints, mesh parameters, analysis, and finally loads.

mod analysis;
mod components;
mod constraints;
mod loads;
mod points;

use tracing::info;

use super::context::ExtractionContext;
use super::error::Error;
use crate::io::{Documents, Element};
use crate::model::entity::{Analysis, MeshParameters};

/// Populates every table of `ctx` from `docs`.
pub fn extract(
    docs: &Documents,
    ctx: &mut ExtractionContext<'_>,
) -> Result<(Analysis, MeshParameters), Error> {
    let assembly = docs.assembly.root();

    ctx.computed = points::computed_vectors(docs.computed_values.root())?;
    ctx.assignments = components::material_assignments(docs.metrics.root())?;
    info!(
        vectors = ctx.computed.len(),
        assignments = ctx.assignments.len(),
        "read auxiliary documents"
    );

    analysis::assembly_name(ctx, assembly)?;
    loads::reject_unsupported(assembly)?;

    points::points(ctx, assembly)?;
    points::geometries(ctx, assembly)?;
    info!(
        points = ctx.points.len(),
        geometries = ctx.geometries.len(),
        "extracted points and geometries"
    );

    components::components(ctx, assembly)?;
    info!(
        solids = ctx.solids.len(),
        layups = ctx.layups.len(),
        surfaces = ctx.surfaces.len(),
        materials = ctx.materials.len(),
        "extracted components"
    );

    constraints::constraint_specifiers(ctx, assembly)?;
    info!(
        pins = ctx.pins.len(),
        displacements = ctx.displacements.len(),
        constraints = ctx.constraints.len(),
        "extracted constraints"
    );

    let mesh = analysis::mesh_parameters(ctx, assembly)?;
    let analysis = analysis::analysis(ctx, assembly)?;

    loads::loads(ctx, assembly)?;
    info!(
        loads = ctx.loads.len(),
        values = ctx.load_values.len(),
        "extracted loads"
    );

    Ok((analysis, mesh))
}

fn required<'e>(element: &'e Element, attribute: &str) -> Result<&'e str, Error> {
    element
        .attr(attribute)
        .ok_or_else(|| Error::missing_attribute(element.origin(), format!("attribute '{attribute}'")))
}

fn required_child<'e>(element: &'e Element, path: &str) -> Result<&'e Element, Error> {
    element
        .find(path)
        .ok_or_else(|| Error::missing_attribute(element.origin(), format!("element '{path}'")))
}
