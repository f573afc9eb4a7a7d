use std::str::FromStr;

use tracing::debug;

use super::{required, required_child};
use crate::compile::context::ExtractionContext;
use crate::compile::error::Error;
use crate::io::Element;
use crate::io::xml::SOURCE_ID_ATTR;
use crate::model::entity::{AxisGroup, Constraint, ConstraintKind, DisplacementSpecifier, PinSpecifier};
use crate::model::table::Id;
use crate::model::types::{Axis, AxisSetting, Motion};

const ANALYSIS_CONSTRAINTS: &str = "Assembly/Analyses/FEA/AnalysisConstraints/AnalysisConstraint";

/// Extracts pin specifiers, then displacement specifiers together with the
/// constraint linking each displacement to its geometry.
pub(super) fn constraint_specifiers(ctx: &mut ExtractionContext<'_>, root: &Element) -> Result<(), Error> {
    let analysis_constraints = root.select(ANALYSIS_CONSTRAINTS);

    for node in analysis_constraints.iter().flat_map(|ac| ac.children_named("Pin")) {
        pin(ctx, node)?;
    }

    for ac in &analysis_constraints {
        for node in ac.children_named("Displacement") {
            let displacement = displacement(ctx, node)?;
            constraint(ctx, ac, displacement)?;
        }
    }
    Ok(())
}

fn pin(ctx: &mut ExtractionContext<'_>, node: &Element) -> Result<(), Error> {
    let source_id = required(node, SOURCE_ID_ATTR)?;
    let properties = node
        .children()
        .map(|child| Ok((child.name().to_string(), required(child, "Property")?.to_string())))
        .collect::<Result<Vec<_>, Error>>()?;

    ctx.pins.insert(|id| PinSpecifier {
        id,
        source_id: source_id.to_string(),
        properties,
        xml_text: node.to_xml(),
    });
    Ok(())
}

fn displacement(ctx: &mut ExtractionContext<'_>, node: &Element) -> Result<Id, Error> {
    let source_id = required(node, SOURCE_ID_ATTR)?;
    let translation = node
        .child(Motion::Translation.element())
        .map(|group| axis_group(node, group, Motion::Translation))
        .transpose()?;
    let rotation = node
        .child(Motion::Rotation.element())
        .map(|group| axis_group(node, group, Motion::Rotation))
        .transpose()?;

    let id = ctx.displacements.insert(|id| DisplacementSpecifier {
        id,
        source_id: source_id.to_string(),
        translation,
        rotation,
        xml_text: node.to_xml(),
    });
    debug!(source_id, %id, "added displacement specifier");
    Ok(id)
}

/// Decodes the x, y and z settings of a `Translation` or `Rotation` group.
fn axis_group(displacement: &Element, group: &Element, motion: Motion) -> Result<AxisGroup, Error> {
    let setting = |axis: Axis| -> Result<AxisSetting, Error> {
        let raw = required(group, axis.name())?;
        AxisSetting::from_str(raw).map_err(|_| {
            Error::unsupported_constraint_value(displacement.origin(), motion, axis, raw)
        })
    };
    let axes = [setting(Axis::X)?, setting(Axis::Y)?, setting(Axis::Z)?];
    let units = required(group, "Units")?;

    Ok(AxisGroup {
        axes,
        units: units.to_string(),
    })
}

fn constraint(
    ctx: &mut ExtractionContext<'_>,
    analysis_constraint: &Element,
    displacement: Id,
) -> Result<(), Error> {
    let feature = required_child(analysis_constraint, "Geometry/Features/Feature")?;
    let metric_id = required(feature, "MetricID")?;
    let geometry = ctx.geometry_for_metric(metric_id, &feature.origin())?;

    ctx.constraints.insert(|id| Constraint {
        id,
        kind: ConstraintKind::Displacement,
        subcase: 1,
        geometry,
        displacement,
        feature_source_id: feature.attr(SOURCE_ID_ATTR).unwrap_or_default().to_string(),
        xml_text: feature.to_xml(),
    });
    Ok(())
}
