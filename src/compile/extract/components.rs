use std::collections::HashMap;

use tracing::{debug, warn};

use super::points::{FACE_BY_POINT, point_for_metric};
use super::{required, required_child};
use crate::compile::context::ExtractionContext;
use crate::compile::error::Error;
use crate::compile::materials::UNASSIGNED_MATERIAL;
use crate::io::Element;
use crate::model::entity::{Layer, Layup, Solid, Surface, SurfaceContents};
use crate::model::table::Id;

const PART_METRICS: &str = "MetricComponents/MetricComponent[@Type='PART']";
const PARTS: &str = "//CADComponent[@Type='PART']";
const MATERIAL_LAYUP: &str = "Elements/Element/ElementContents/MaterialLayup";
const SURFACE_ELEMENT: &str = "Elements/Element[@ElementType='SURFACE']";
const DIRECTION_FEATURE: &str = "ElementContents/Orientation/Geometry/Features/Feature";

/// Material name per component instance, from the metrics document.
pub(super) fn material_assignments(root: &Element) -> Result<HashMap<String, String>, Error> {
    let mut assignments = HashMap::new();
    for component in root.select(PART_METRICS) {
        let metric_id = required(component, "MetricID")?;
        let Some(material) = component.child("Material") else {
            debug!(metric_id, "metric component has no material");
            continue;
        };
        let material_type = required(material, "Type")?;

        let linked = root
            .find(&format!("//CADComponent[@MetricID='{metric_id}']"))
            .ok_or_else(|| Error::unresolved(component.origin(), "CAD component", metric_id))?;
        let instance_id = required(linked, "ComponentInstanceID")?;

        assignments.insert(instance_id.to_string(), material_type.to_string());
    }
    Ok(assignments)
}

/// Walks the part components. A component with a material layup contributes
/// a layup and, when it has a surface element, a surface with its contents;
/// any other component is meshed as a solid.
pub(super) fn components(ctx: &mut ExtractionContext<'_>, root: &Element) -> Result<(), Error> {
    for component in root.select(PARTS) {
        let component_id = required(component, "ComponentID")?;

        match component.find(MATERIAL_LAYUP) {
            None => solid(ctx, component_id)?,
            Some(layup_node) => {
                let layup = layup(ctx, component_id, layup_node)?;
                if let Some(element) = component.find(SURFACE_ELEMENT) {
                    surface_contents(ctx, component_id, element, layup)?;
                }
            }
        }
    }
    Ok(())
}

fn solid(ctx: &mut ExtractionContext<'_>, component_id: &str) -> Result<(), Error> {
    let name = match ctx.assignments.get(component_id) {
        Some(name) => name.clone(),
        None => {
            warn!(component_id, "component has no material assignment");
            UNASSIGNED_MATERIAL.to_string()
        }
    };
    let material = ctx.material(&name);
    let id = ctx.solids.insert(|id| Solid {
        id,
        component_id: component_id.to_string(),
        material,
    });
    debug!(component_id, %id, material = %name, "added solid");
    Ok(())
}

fn layup(ctx: &mut ExtractionContext<'_>, component_id: &str, node: &Element) -> Result<Id, Error> {
    // Older assemblies spell the attribute `Postion`.
    let position = node
        .attr("Position")
        .or_else(|| node.attr("Postion"))
        .ok_or_else(|| Error::missing_attribute(node.origin(), "attribute 'Position'"))?;
    let offset_value = required(node, "OffsetValue")?;

    let mut layers = Vec::new();
    for layer in node.children_named("Layer") {
        let source_id = required(layer, "ID")?;
        let material_name = required(layer, "Material_Name")?;
        let thickness = required(layer, "Thickness")?;
        let orientation = required(layer, "Orientation")?;
        let drop_order = required(layer, "Drop_Order")?;

        let material = ctx.material(material_name);
        let id = ctx.layers.insert(|id| Layer {
            id,
            source_id: source_id.to_string(),
            component_id: component_id.to_string(),
            material,
            material_name: material_name.to_string(),
            thickness: thickness.to_string(),
            orientation: orientation.to_string(),
            drop_order: drop_order.to_string(),
            xml_text: layer.to_xml(),
        });
        layers.push(id);
    }

    let id = ctx.layups.insert(|id| Layup {
        id,
        component_id: component_id.to_string(),
        layers,
        position: position.to_string(),
        offset_value: offset_value.to_string(),
    });
    debug!(component_id, %id, "added layup");
    Ok(id)
}

fn surface_contents(
    ctx: &mut ExtractionContext<'_>,
    component_id: &str,
    element: &Element,
    layup: Id,
) -> Result<(), Error> {
    let features = required_child(element, &format!("Geometry/{FACE_BY_POINT}"))?;
    let feature = required_child(features, "Feature")?;
    let metric_id = required(feature, "MetricID")?;

    let geometry = ctx.geometry_for_metric(metric_id, &feature.origin())?;
    let (surface, _) = ctx.surfaces.insert_keyed(metric_id, |id| Surface {
        id,
        metric_id: metric_id.to_string(),
        geometry,
        xml_text: feature.to_xml(),
    });

    let direction_start = direction_point(ctx, element, "Direction_Start_Pt")?;
    let direction_end = direction_point(ctx, element, "Direction_End_Pt")?;

    let (position, offset_value) = ctx
        .layups
        .get(layup)
        .map(|l| (l.position.clone(), l.offset_value.clone()))
        .unwrap_or_default();

    ctx.surface_contents.insert(|id| SurfaceContents {
        id,
        component_id: component_id.to_string(),
        surface,
        layup,
        direction_start,
        direction_end,
        position,
        offset_value,
        xml_text: feature.to_xml(),
    });
    Ok(())
}

fn direction_point(ctx: &mut ExtractionContext<'_>, element: &Element, name: &str) -> Result<Id, Error> {
    let path = format!("{DIRECTION_FEATURE}[@Name='{name}']");
    let feature = required_child(element, &path)?;
    let metric_id = required(feature, "MetricID")?;
    point_for_metric(ctx, metric_id, &feature.origin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::config::CompileConfig;
    use crate::compile::extract::points;
    use crate::compile::materials::MaterialLibrary;
    use crate::io::xml::parse_str;

    const METRICS: &str = r#"
        <CADAssemblyMetrics>
          <MetricComponents>
            <MetricComponent MetricID="100" Name="BRACKET" Type="PART">
              <Material Type="Aluminum 6061"/>
            </MetricComponent>
            <MetricComponent MetricID="200" Name="ROOT" Type="ASSEMBLY"/>
          </MetricComponents>
          <Assemblies>
            <CADComponent MetricID="200" ComponentInstanceID="root">
              <CADComponent MetricID="100" ComponentInstanceID="bracket"/>
            </CADComponent>
          </Assemblies>
        </CADAssemblyMetrics>"#;

    const COMPUTED: &str = r#"
        <ComputedValues><Component><Metrics>
          <Metric MetricID="face" Type="VECTOR" Units="mm" ArrayValue="0;0;0"/>
          <Metric MetricID="start" Type="VECTOR" Units="mm" ArrayValue="0;0;1"/>
          <Metric MetricID="end" Type="VECTOR" Units="mm" ArrayValue="1;0;1"/>
        </Metrics></Component></ComputedValues>"#;

    const ASSEMBLY: &str = r#"
        <Assemblies>
          <Assembly ConfigurationID="cfg">
            <Analyses><Static><Metrics>
              <Metric MetricID="face" MetricType="POINTCOORDINATES"/>
            </Metrics></Static></Analyses>
            <CADComponent ComponentID="root" Type="ASSEMBLY" Name="Rig">
              <CADComponent ComponentID="bracket" Type="PART" Name="BRACKET"/>
              <CADComponent ComponentID="skin" Type="PART" Name="SKIN">
                <Elements>
                  <Element ElementType="SURFACE">
                    <Geometry>
                      <Features GeometryType="FACE" FeatureGeometryType="POINT">
                        <Feature _id="sf" MetricID="face"/>
                      </Features>
                    </Geometry>
                    <ElementContents>
                      <MaterialLayup Postion="TOP" OffsetValue="0.5">
                        <Layer ID="L1" Material_Name="Carbon" Thickness="0.2" Orientation="0" Drop_Order="1"/>
                        <Layer ID="L2" Material_Name="Aluminum 6061" Thickness="0.1" Orientation="45" Drop_Order="2"/>
                      </MaterialLayup>
                      <Orientation>
                        <Geometry>
                          <Features>
                            <Feature Name="Direction_Start_Pt" MetricID="start"/>
                            <Feature Name="Direction_End_Pt" MetricID="end"/>
                          </Features>
                        </Geometry>
                      </Orientation>
                    </ElementContents>
                  </Element>
                </Elements>
              </CADComponent>
              <CADComponent ComponentID="loose" Type="PART" Name="LOOSE"/>
            </CADComponent>
          </Assembly>
        </Assemblies>"#;

    const LIBRARY: &str = r#"{"Material library": {"aluminum 6061": {
        "mechanical__modulus_elastic": {"value": 68900000000.0, "unit": "Pa"},
        "mechanical__ratio_poissons": {"value": 0.33},
        "density": {"value": 2700.0},
        "thermal__coefficient_expansion_linear": {"value": 2.36e-05}
    }}}"#;

    #[test]
    fn assignments_link_metrics_to_component_instances() {
        let assignments = material_assignments(&parse_str(METRICS).unwrap()).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments["bracket"], "Aluminum 6061");
    }

    #[test]
    fn unlinked_metric_component_is_unresolved() {
        let doc = parse_str(
            r#"<M><MetricComponents>
                 <MetricComponent MetricID="9" Type="PART"><Material Type="Steel"/></MetricComponent>
               </MetricComponents></M>"#,
        )
        .unwrap();
        let err = material_assignments(&doc).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { .. }));
    }

    #[test]
    fn components_branch_between_solids_and_layups() {
        let library = MaterialLibrary::from_json(LIBRARY).unwrap();
        let config = CompileConfig::default();
        let mut ctx = ExtractionContext::new(&library, &config);
        ctx.computed = points::computed_vectors(&parse_str(COMPUTED).unwrap()).unwrap();
        ctx.assignments = material_assignments(&parse_str(METRICS).unwrap()).unwrap();

        let root = parse_str(ASSEMBLY).unwrap();
        points::points(&mut ctx, &root).unwrap();
        points::geometries(&mut ctx, &root).unwrap();
        components(&mut ctx, &root).unwrap();

        // bracket and loose are solids; skin is layered.
        assert_eq!(ctx.solids.len(), 2);
        assert_eq!(ctx.layups.len(), 1);
        assert_eq!(ctx.layers.len(), 2);
        assert_eq!(ctx.surfaces.len(), 1);
        assert_eq!(ctx.surface_contents.len(), 1);

        // Materials are numbered in first-use order.
        let names: Vec<_> = ctx.materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Aluminum 6061", "Carbon", "UNASSIGNED"]);
        let loose = ctx.solids.iter().nth(1).unwrap();
        assert_eq!(loose.id.get(), 2);
        assert_eq!(loose.component_id, "loose");
        assert_eq!(loose.material.get(), 3);

        let layup = ctx.layups.get(Id::FIRST).unwrap();
        assert_eq!(layup.position, "TOP");
        assert_eq!(layup.offset_value, "0.5");
        let second = ctx.layers.get(layup.layers[1]).unwrap();
        assert_eq!(second.source_id, "L2");
        assert_eq!(second.material.get(), 1);

        // Direction points are appended after the face point.
        let contents = ctx.surface_contents.get(Id::FIRST).unwrap();
        assert_eq!(ctx.points.len(), 3);
        assert_eq!(contents.direction_start.get(), 2);
        assert_eq!(contents.direction_end.get(), 3);
        assert_eq!(contents.position, "TOP");
    }
}
