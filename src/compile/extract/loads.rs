use std::str::FromStr;

use tracing::debug;

use super::required;
use crate::compile::context::ExtractionContext;
use crate::compile::error::Error;
use crate::io::Element;
use crate::io::xml::SOURCE_ID_ATTR;
use crate::model::entity::{Load, ScalarLoadValue};
use crate::model::table::Id;
use crate::model::types::LoadKind;

const LOADS: &str = "Assembly/Analyses/FEA/Loads/Load";

/// Fails on the first Force or ForceMoment payload in the assembly.
///
/// Runs before any geometry is resolved so that an unsupported load is
/// reported as such even when its target does not resolve either.
pub(super) fn reject_unsupported(root: &Element) -> Result<(), Error> {
    for node in root.select(LOADS) {
        payload(node)?;
    }
    Ok(())
}

/// Extracts every load with its scalar value.
///
/// Force and moment loads are recognized but rejected.
pub(super) fn loads(ctx: &mut ExtractionContext<'_>, root: &Element) -> Result<(), Error> {
    for node in root.select(LOADS) {
        load(ctx, node)?;
    }
    Ok(())
}

/// First supported payload child of a load, or `None` when it has none.
fn payload(node: &Element) -> Result<Option<(LoadKind, &Element)>, Error> {
    let mut found = None;
    for child in node.children() {
        let Ok(kind) = LoadKind::from_str(child.name()) else {
            continue;
        };
        if !kind.is_supported() {
            return Err(Error::unsupported_load(child.origin(), kind));
        }
        found.get_or_insert((kind, child));
    }
    Ok(found)
}

fn load(ctx: &mut ExtractionContext<'_>, node: &Element) -> Result<(), Error> {
    let (kind, value_node) = payload(node)?.ok_or_else(|| {
        Error::missing_attribute(node.origin(), "load payload (Pressure, Force or ForceMoment)")
    })?;

    let mut target: Option<(Id, String)> = None;
    let mut comments = String::new();
    for child in node.children_named("Geometry") {
        let features = child.select("Features/Feature");
        let Some(first) = features.first() else {
            return Err(Error::missing_attribute(child.origin(), "element 'Features/Feature'"));
        };
        if features.len() > 1 {
            let ids: Vec<&str> = features
                .iter()
                .map(|f| f.attr(SOURCE_ID_ATTR).unwrap_or("?"))
                .collect();
            comments.push_str(&format!(
                "Multiple features for one load (_id: {}); using the first. ",
                ids.join(", ")
            ));
            ctx.note(format!(
                "{}: {} features on one load, using the first",
                node.origin(),
                features.len()
            ));
        }
        let metric_id = required(first, "MetricID")?;
        let geometry = ctx.geometry_for_metric(metric_id, &node.origin())?;
        target = Some((geometry, metric_id.to_string()));
    }
    let (geometry, metric_id) =
        target.ok_or_else(|| Error::missing_attribute(node.origin(), "element 'Geometry'"))?;

    let magnitude = required(value_node, "Value")?;
    if !magnitude.trim().parse::<f64>().is_ok_and(f64::is_finite) {
        return Err(Error::invalid_attribute(
            value_node.origin(),
            "Value",
            magnitude,
            "expected a finite number",
        ));
    }
    let units = required(value_node, "Units")?;
    let value = ctx.load_values.insert(|id| ScalarLoadValue {
        id,
        magnitude: magnitude.to_string(),
        units: units.to_string(),
        xml_text: value_node.to_xml(),
    });

    comments.push_str(&format!("(MetricID: {metric_id})"));
    let id = ctx.loads.insert(|id| Load {
        id,
        kind,
        subcase: 1,
        geometry,
        value,
        metric_id,
        comments,
        xml_text: node.to_xml(),
    });
    debug!(%id, %kind, %value, "added load");
    Ok(())
}
