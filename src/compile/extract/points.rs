use std::collections::HashMap;

use tracing::debug;

use super::{required, required_child};
use crate::compile::context::{ComputedVector, ExtractionContext};
use crate::compile::error::Error;
use crate::io::Element;
use crate::model::entity::{Geometry, GeometryKind, Point};
use crate::model::table::Id;

const VECTOR_METRICS: &str = "Component/Metrics/Metric[@Type='VECTOR']";
const POINT_METRICS: &str = "Assembly/Analyses/Static/Metrics/Metric[@MetricType='POINTCOORDINATES']";
pub(super) const FACE_BY_POINT: &str = "Features[@GeometryType='FACE'][@FeatureGeometryType='POINT']";

/// Vector metrics of the computed-values document, keyed by metric ID.
pub(super) fn computed_vectors(root: &Element) -> Result<HashMap<String, ComputedVector>, Error> {
    let mut vectors = HashMap::new();
    for metric in root.select(VECTOR_METRICS) {
        let metric_id = required(metric, "MetricID")?;
        let units = required(metric, "Units")?;
        let array = required(metric, "ArrayValue")?;

        let parts: Vec<&str> = array.split(';').map(str::trim).collect();
        let coordinates: [String; 3] = match parts.as_slice() {
            [x, y, z] => [x.to_string(), y.to_string(), z.to_string()],
            _ => {
                return Err(Error::invalid_attribute(
                    metric.origin(),
                    "ArrayValue",
                    array,
                    format!("expected 3 components separated by ';', found {}", parts.len()),
                ));
            }
        };

        vectors.insert(
            metric_id.to_string(),
            ComputedVector {
                coordinates,
                units: units.to_string(),
                xml_text: metric.to_xml(),
            },
        );
    }
    Ok(vectors)
}

/// The point for `metric_id`, appended from the computed values if it has
/// not been extracted yet.
pub(super) fn point_for_metric(
    ctx: &mut ExtractionContext<'_>,
    metric_id: &str,
    origin: &str,
) -> Result<Id, Error> {
    if let Some(id) = ctx.points.id_of(metric_id) {
        return Ok(id);
    }
    let vector = ctx
        .computed
        .get(metric_id)
        .ok_or_else(|| Error::unresolved(origin, "computed value", metric_id))?;

    let (id, _) = ctx.points.insert_keyed(metric_id, |id| Point {
        id,
        metric_id: metric_id.to_string(),
        coordinates: vector.coordinates.clone(),
        units: vector.units.clone(),
        xml_text: vector.xml_text.clone(),
    });
    debug!(metric_id, %id, "added point");
    Ok(id)
}

pub(super) fn points(ctx: &mut ExtractionContext<'_>, root: &Element) -> Result<(), Error> {
    for metric in root.select(POINT_METRICS) {
        let metric_id = required(metric, "MetricID")?;
        point_for_metric(ctx, metric_id, &metric.origin())?;
    }
    Ok(())
}

/// Point-anchored faces anywhere in the assembly, one geometry per metric ID.
pub(super) fn geometries(ctx: &mut ExtractionContext<'_>, root: &Element) -> Result<(), Error> {
    let path = format!("//Geometry/{FACE_BY_POINT}");
    for features in root.select(&path) {
        let feature = required_child(features, "Feature")?;
        let metric_id = required(feature, "MetricID")?;
        if ctx.geometries.id_of(metric_id).is_some() {
            continue;
        }

        let point = ctx.point_for_metric(metric_id, &feature.origin())?;
        ctx.geometries.insert_keyed(metric_id, |id| Geometry {
            id,
            metric_id: metric_id.to_string(),
            kind: GeometryKind::Face,
            point,
            xml_text: feature.to_xml(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::config::CompileConfig;
    use crate::compile::materials::MaterialLibrary;
    use crate::io::xml::parse_str;

    const COMPUTED: &str = r#"
        <ComputedValues>
          <Component ComponentID="c1">
            <Metrics>
              <Metric MetricID="m1" Type="VECTOR" Units="mm" ArrayValue="1.0;2.0;3.0"/>
              <Metric MetricID="m2" Type="VECTOR" Units="mm" ArrayValue="4;5;6"/>
              <Metric MetricID="s1" Type="SCALAR" Units="kg" Value="3"/>
            </Metrics>
          </Component>
        </ComputedValues>"#;

    const ASSEMBLY: &str = r#"
        <Assemblies>
          <Assembly ConfigurationID="cfg">
            <Analyses>
              <Static>
                <Metrics>
                  <Metric MetricID="m1" MetricType="POINTCOORDINATES"/>
                  <Metric MetricID="m1" MetricType="POINTCOORDINATES"/>
                  <Metric MetricID="m2" MetricType="POINTCOORDINATES"/>
                </Metrics>
              </Static>
              <FEA>
                <Loads>
                  <Load _id="l1">
                    <Geometry>
                      <Features GeometryType="FACE" FeatureGeometryType="POINT">
                        <Feature _id="f1" MetricID="m2"/>
                      </Features>
                    </Geometry>
                  </Load>
                  <Load _id="l2">
                    <Geometry>
                      <Features GeometryType="FACE" FeatureGeometryType="POINT">
                        <Feature _id="f2" MetricID="m2"/>
                      </Features>
                    </Geometry>
                  </Load>
                </Loads>
                <AnalysisConstraints>
                  <AnalysisConstraint>
                    <Geometry>
                      <Features GeometryType="FACE" FeatureGeometryType="POINT">
                        <Feature _id="f3" MetricID="m1"/>
                      </Features>
                    </Geometry>
                  </AnalysisConstraint>
                </AnalysisConstraints>
              </FEA>
            </Analyses>
          </Assembly>
        </Assemblies>"#;

    #[test]
    fn computed_vectors_are_keyed_by_metric() {
        let vectors = computed_vectors(&parse_str(COMPUTED).unwrap()).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors["m1"].coordinates, ["1.0", "2.0", "3.0"]);
        assert_eq!(vectors["m2"].units, "mm");
    }

    #[test]
    fn short_array_value_is_rejected() {
        let doc = parse_str(
            r#"<CV><Component><Metrics>
                 <Metric MetricID="m1" Type="VECTOR" Units="mm" ArrayValue="1;2"/>
               </Metrics></Component></CV>"#,
        )
        .unwrap();
        let err = computed_vectors(&doc).unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { .. }));
    }

    #[test]
    fn points_and_geometries_are_deduplicated() {
        let library = MaterialLibrary::default();
        let config = CompileConfig::default();
        let mut ctx = ExtractionContext::new(&library, &config);
        ctx.computed = computed_vectors(&parse_str(COMPUTED).unwrap()).unwrap();

        let root = parse_str(ASSEMBLY).unwrap();
        points(&mut ctx, &root).unwrap();
        geometries(&mut ctx, &root).unwrap();

        assert_eq!(ctx.points.len(), 2);
        assert_eq!(ctx.points.id_of("m1").map(Id::get), Some(1));
        assert_eq!(ctx.points.id_of("m2").map(Id::get), Some(2));

        // Both loads reference m2; the second reuses the first geometry.
        assert_eq!(ctx.geometries.len(), 2);
        let first = ctx.geometries.get(Id::FIRST).unwrap();
        assert_eq!(first.metric_id, "m2");
        assert_eq!(first.point.get(), 2);
        assert_eq!(ctx.geometries.id_of("m1").map(Id::get), Some(2));
    }

    #[test]
    fn point_without_computed_value_is_unresolved() {
        let library = MaterialLibrary::default();
        let config = CompileConfig::default();
        let mut ctx = ExtractionContext::new(&library, &config);

        let root = parse_str(ASSEMBLY).unwrap();
        let err = points(&mut ctx, &root).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { ref key, .. } if key == "m1"));
    }
}
