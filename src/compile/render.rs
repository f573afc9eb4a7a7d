//! Block rendering.
//!
//! Each entity record is mapped onto the placeholder names of its template
//! section, then emitted in a fixed order: single-instance sections, fixed
//! sections, the per-instance tables, layups with their nested layers, and
//! surface contents last.

use std::borrow::Cow;
use std::fmt::Display;

use tracing::debug;

use super::error::Error;
use super::template::{self, INDENT, TemplateRegistry};
use crate::model::compiled::CompiledModel;
use crate::model::entity::{
    Analysis, Constraint, DisplacementSpecifier, Geometry, Layer, Layup, Load, Material,
    MeshParameters, PinSpecifier, Point, ScalarLoadValue, Solid, Surface, SurfaceContents,
};
use crate::model::types::{Axis, Motion};

/// Value of a field that is deliberately unset.
pub const NO_VALUE: &str = "None";

/// Placeholder values for one block.
#[derive(Debug, Default)]
struct Fields {
    values: Vec<(String, String)>,
}

impl Fields {
    fn new() -> Self {
        Self::default()
    }

    fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.values.push((name.into(), value.to_string()));
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Rendered script text before the global pass.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub text: String,
    /// Lines removed from displacement blocks because their value was unset.
    pub pruned: Vec<String>,
}

struct Renderer<'t> {
    registry: &'t TemplateRegistry,
    copy_xml_text: bool,
    out: Rendered,
}

impl Renderer<'_> {
    fn block(&self, section: &str, indent: &str, fields: &Fields) -> Result<String, Error> {
        let raw = self
            .registry
            .section(section)?
            .block(section, indent, self.copy_xml_text);
        Ok(template::substitute(&raw, |name| {
            fields.get(name).map(Cow::Borrowed)
        }))
    }

    fn emit(&mut self, section: &str, fields: &Fields) -> Result<(), Error> {
        let text = self.block(section, "", fields)?;
        self.out.text.push_str(&text);
        self.out.text.push('\n');
        Ok(())
    }

    fn emit_all<'r, T: 'r>(
        &mut self,
        section: &str,
        rows: impl IntoIterator<Item = &'r T>,
        fields: impl Fn(&T) -> Fields,
    ) -> Result<(), Error> {
        for row in rows {
            self.emit(section, &fields(row))?;
        }
        Ok(())
    }

    fn emit_pruned(&mut self, section: &str, fields: &Fields) -> Result<(), Error> {
        let text = self.block(section, "", fields)?;
        let (kept, removed) = prune_unset(&text);
        if !removed.is_empty() {
            debug!(section, lines = ?removed, "removed unset lines");
        }
        self.out.text.push_str(&kept);
        self.out.text.push('\n');
        self.out.pruned.extend(removed);
        Ok(())
    }

    /// Emits a pin block. Properties the section has no placeholder for are
    /// appended as `Name = value` lines so none is dropped.
    fn emit_pin(&mut self, pin: &PinSpecifier) -> Result<(), Error> {
        const SECTION: &str = "Constraint_Specifier_Pin";
        let used = template::placeholders(&self.registry.section(SECTION)?.lines.join("\n"));
        let mut text = self.block(SECTION, "", &pin_fields(pin))?;
        for (name, value) in &pin.properties {
            if used.iter().any(|u| u == name) {
                continue;
            }
            debug!(pin = %pin.id, property = %name, "appending pin property without placeholder");
            text.push_str(&format!("{INDENT}{name} = {value}\n"));
        }
        self.out.text.push_str(&text);
        self.out.text.push('\n');
        Ok(())
    }
}

/// Renders every table of `model` in script order.
pub fn render(
    model: &CompiledModel,
    registry: &TemplateRegistry,
    copy_xml_text: bool,
) -> Result<Rendered, Error> {
    let mut r = Renderer {
        registry,
        copy_xml_text,
        out: Rendered::default(),
    };

    r.emit("Analysis", &analysis_fields(&model.analysis))?;
    r.emit("Mesh_Parameters", &mesh_fields(&model.mesh_parameters))?;
    r.emit("SubCase", &Fields::new())?;
    r.emit("Files", &Fields::new())?;

    r.emit_all("Point", &model.points, point_fields)?;
    r.emit_all("Geometry", &model.geometries, geometry_fields)?;
    r.emit_all("Surface", &model.surfaces, surface_fields)?;
    r.emit_all("Solid", &model.solids, solid_fields)?;
    r.emit_all("Material", &model.materials, material_fields)?;
    r.emit_all("Load", &model.loads, load_fields)?;
    r.emit_all("Load_Value_Scalar", &model.load_values, load_value_fields)?;
    r.emit_all("Constraint", &model.constraints, constraint_fields)?;
    for specifier in &model.displacements {
        r.emit_pruned("Constraint_Specifier_Displacement", &displacement_fields(specifier))?;
    }
    for pin in &model.pins {
        r.emit_pin(pin)?;
    }

    for layup in &model.layups {
        let header = r.block("Material_Layup", "", &layup_fields(layup))?;
        r.out.text.push_str(&header);
        for &layer_id in &layup.layers {
            if let Some(layer) = model.layers.get(layer_id) {
                let text = r.block("Layer", INDENT, &layer_fields(layer))?;
                r.out.text.push_str(&text);
                r.out.text.push('\n');
            }
        }
    }

    r.emit_all("Surface_Contents", &model.surface_contents, surface_contents_fields)?;

    Ok(r.out)
}

/// Drops lines whose value is [`NO_VALUE`], returning the kept text and the
/// removed lines.
pub fn prune_unset(block: &str) -> (String, Vec<String>) {
    let mut kept = String::with_capacity(block.len());
    let mut removed = Vec::new();
    for line in block.split_inclusive('\n') {
        let unset = line
            .split_once('=')
            .is_some_and(|(_, rhs)| rhs.split_whitespace().next() == Some(NO_VALUE));
        if unset {
            removed.push(line.trim_end().to_string());
        } else {
            kept.push_str(line);
        }
    }
    (kept, removed)
}

fn analysis_fields(a: &Analysis) -> Fields {
    Fields::new()
        .with("Comments", format!("Solver declared as {}", a.declared_solver))
        .with("XML_Text", &a.xml_text)
        .with("Configuration_ID", &a.configuration_id)
        .with("Date", &a.date)
        .with("Source_Model", Analysis::SOURCE_MODEL)
        .with("Type", a.type_code)
        .with("Solver", &a.solver)
        .with("Instructions", a.instructions)
}

fn mesh_fields(m: &MeshParameters) -> Fields {
    Fields::new()
        .with("Comments", &m.comments)
        .with("XML_Text", m.xml_text.as_deref().unwrap_or(NO_VALUE))
        .with("ID", MeshParameters::ID)
        .with("Max_Global_Length", &m.max_global_length)
        .with("Max_Curv_Delta_Div_Edge_Len", &m.max_curvature_delta)
        .with("Ratio_Min_Edge_To_Max_Edge", &m.ratio_min_to_max_edge)
        .with("Match_Face_Proximity_Tol", &m.face_proximity_tolerance)
}

fn point_fields(p: &Point) -> Fields {
    let [x, y, z] = &p.coordinates;
    Fields::new()
        .with("Comments", format!("(Units={};MetricID={})", p.units, p.metric_id))
        .with("XML_Text", &p.xml_text)
        .with("ID", p.id)
        .with("x_Cord", x)
        .with("y_Cord", y)
        .with("z_Cord", z)
}

fn geometry_fields(g: &Geometry) -> Fields {
    Fields::new()
        .with("Comments", format!("(MetricID={})", g.metric_id))
        .with("XML_Text", &g.xml_text)
        .with("ID", g.id)
        .with("Type", g.kind.as_str())
        .with("Point_ID", g.point)
}

fn surface_fields(s: &Surface) -> Fields {
    Fields::new()
        .with("Comments", format!("(MetricID={})", s.metric_id))
        .with("XML_Text", &s.xml_text)
        .with("ID", s.id)
        .with("Geometry_ID", s.geometry)
        .with("Element_Type", "$Surface_Element_Type")
        .with("Mesh_Parameters_ID", "$Surface_Mesh_Parameters_ID")
}

fn solid_fields(s: &Solid) -> Fields {
    Fields::new()
        .with(
            "Comments",
            format!(
                "CADComponent ID: {}; element type is fixed, one mesh-parameter set",
                s.component_id
            ),
        )
        .with("ID", s.id)
        .with("Element_Type", Solid::ELEMENT_TYPE)
        .with("Material_ID", s.material)
        .with("Mesh_Parameters_ID", Solid::MESH_PARAMETERS_ID)
}

fn material_fields(m: &Material) -> Fields {
    let comments = if m.resolved {
        m.name.clone()
    } else {
        format!("{}: not found in the material library", m.name)
    };
    let props = &m.properties;
    Fields::new()
        .with("Comments", comments)
        .with("ID", m.id)
        .with("Name", &m.name)
        .with("Description", &m.name)
        .with("Tropic_Type", Material::TROPIC_TYPE)
        .with("Elastic_Modulus", props.elastic_modulus.render())
        .with("Poissons_Ratio", props.poissons_ratio.render())
        .with("Density", props.density.render())
        .with("Therm_Expan_Coef", props.thermal_expansion.render())
}

fn load_fields(l: &Load) -> Fields {
    Fields::new()
        .with("Comments", &l.comments)
        .with("XML_Text", &l.xml_text)
        .with("ID", l.id)
        .with("Type", l.kind)
        .with("SubCase_ID", l.subcase)
        .with("Geometry_ID", l.geometry)
        .with("Load_Value_ID", l.value)
}

fn load_value_fields(v: &ScalarLoadValue) -> Fields {
    Fields::new()
        .with("Comments", format!("Units: {}", v.units))
        .with("XML_Text", &v.xml_text)
        .with("ID", v.id)
        .with("Scalar_Value", &v.magnitude)
}

fn constraint_fields(c: &Constraint) -> Fields {
    Fields::new()
        .with("Comments", format!("Feature Node _id:{}", c.feature_source_id))
        .with("XML_Text", &c.xml_text)
        .with("ID", c.id)
        .with("Type", c.kind.as_str())
        .with("SubCase_ID", c.subcase)
        .with("Geometry_ID", c.geometry)
        .with("Displacement_ID", c.displacement)
}

fn displacement_fields(d: &DisplacementSpecifier) -> Fields {
    let mut comments = format!("CadAssembly _id:{}", d.source_id);
    let mut fields = Fields::new().with("XML_Text", &d.xml_text).with("ID", d.id);

    for (motion, group) in [
        (Motion::Translation, &d.translation),
        (Motion::Rotation, &d.rotation),
    ] {
        if let Some(group) = group {
            comments.push_str(&format!("; {} Units:'{}'", motion.element(), group.units));
        }
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            let setting = group.as_ref().map(|g| &g.axes[i]);
            let infix = motion.field_infix();
            fields = fields
                .with(
                    format!("{axis}_{infix}_Val"),
                    setting.and_then(|s| s.value()).unwrap_or(NO_VALUE),
                )
                .with(
                    format!("{axis}_{infix}_State"),
                    setting.and_then(|s| s.state()).unwrap_or(NO_VALUE),
                );
        }
    }
    fields.with("Comments", comments)
}

fn pin_fields(p: &PinSpecifier) -> Fields {
    p.properties.iter().fold(
        Fields::new()
            .with("Comments", format!("CadAssembly _id:{}", p.source_id))
            .with("XML_Text", &p.xml_text)
            .with("ID", p.id),
        |fields, (name, value)| fields.with(name.as_str(), value),
    )
}

fn layup_fields(l: &Layup) -> Fields {
    Fields::new()
        .with("Comments", format!("CADComponent ID: {}", l.component_id))
        .with("ID", l.id)
}

fn layer_fields(l: &Layer) -> Fields {
    Fields::new()
        .with(
            "Comments",
            format!("CADComponent ID: {}, layer {}", l.component_id, l.source_id),
        )
        .with("XML_Text", &l.xml_text)
        .with("ID", l.id)
        .with("Material_ID", l.material)
        .with("Material_Name", &l.material_name)
        .with("Thickness", &l.thickness)
        .with("Orientation", &l.orientation)
        .with("Drop_Order", &l.drop_order)
}

fn surface_contents_fields(s: &SurfaceContents) -> Fields {
    Fields::new()
        .with("Comments", format!("CADComponent ID: {}", s.component_id))
        .with("XML_Text", &s.xml_text)
        .with("ID", s.id)
        .with("Surface_ID", s.surface)
        .with("Material_Layup_ID", s.layup)
        .with("Direction_Start_Point_ID", s.direction_start)
        .with("Direction_End_Point_ID", s.direction_end)
        .with("Position", &s.position)
        .with("Offset_Value", &s.offset_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::template::default_templates;
    use crate::model::entity::AxisGroup;
    use crate::model::table::{Id, Table};
    use crate::model::types::AxisSetting;

    fn registry() -> TemplateRegistry {
        default_templates().clone()
    }

    fn displacement(translation: Option<[AxisSetting; 3]>) -> DisplacementSpecifier {
        DisplacementSpecifier {
            id: Id::FIRST,
            source_id: "d1".into(),
            translation: translation.map(|axes| AxisGroup {
                axes,
                units: "mm".into(),
            }),
            rotation: None,
            xml_text: "<Displacement/>".into(),
        }
    }

    #[test]
    fn prune_removes_only_unset_values() {
        let block = "Header\n    a = None\n    b = 0.0\n    c = None  # note\n    # None = comment\n    d = Nonesuch\n";
        let (kept, removed) = prune_unset(block);
        assert_eq!(kept, "Header\n    b = 0.0\n    # None = comment\n    d = Nonesuch\n");
        assert_eq!(removed, ["    a = None", "    c = None  # note"]);
    }

    #[test]
    fn displacement_keeps_exactly_one_line_per_axis() {
        let registry = registry();
        let mut r = Renderer {
            registry: &registry,
            copy_xml_text: false,
            out: Rendered::default(),
        };
        let specifier = displacement(Some([
            AxisSetting::Value("0.0".into()),
            AxisSetting::Fixed,
            AxisSetting::Free,
        ]));
        r.emit_pruned("Constraint_Specifier_Displacement", &displacement_fields(&specifier))
            .unwrap();

        let text = &r.out.text;
        assert!(text.contains("    x_Disp_Val = 0.0\n"));
        assert!(!text.contains("x_Disp_State"));
        assert!(text.contains("    y_Disp_State = FIXED\n"));
        assert!(!text.contains("y_Disp_Val"));
        assert!(text.contains("    z_Disp_State = FREE\n"));
        assert!(!text.contains("z_Disp_Val"));
        // No rotation group: every rotation line is unset.
        assert!(!text.contains("_Rot_"));
        assert_eq!(r.out.pruned.len(), 9);
        assert!(text.contains("# CadAssembly _id:d1; Translation Units:'mm'\n"));
    }

    #[test]
    fn xml_text_lines_follow_the_toggle() {
        let fields = Fields::new()
            .with("ID", 1)
            .with("XML_Text", "<Metric/>")
            .with("Comments", "c");
        let registry = registry();

        let hidden = Renderer {
            registry: &registry,
            copy_xml_text: false,
            out: Rendered::default(),
        };
        assert!(!hidden.block("Point", "", &fields).unwrap().contains("<Metric/>"));

        let shown = Renderer {
            registry: &registry,
            copy_xml_text: true,
            out: Rendered::default(),
        };
        assert!(
            shown
                .block("Point", "", &fields)
                .unwrap()
                .contains("    # <Metric/>\n")
        );
    }

    #[test]
    fn missing_section_fails_rendering() {
        let registry = template::load_templates(Some(
            "[sections.Analysis]\nlines = [\"x\"]\n",
        ))
        .unwrap();
        let r = Renderer {
            registry: &registry,
            copy_xml_text: false,
            out: Rendered::default(),
        };
        let err = r.block("Mesh_Parameters", "", &Fields::new()).unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));
    }

    #[test]
    fn layers_nest_under_their_layup() {
        let mut layers = Table::new();
        let layer = layers.insert(|id| Layer {
            id,
            source_id: "L7".into(),
            component_id: "skin".into(),
            material: Id::FIRST,
            material_name: "Carbon".into(),
            thickness: "0.2".into(),
            orientation: "45".into(),
            drop_order: "1".into(),
            xml_text: String::new(),
        });
        let registry = registry();
        let r = Renderer {
            registry: &registry,
            copy_xml_text: false,
            out: Rendered::default(),
        };
        let text = r
            .block("Layer", INDENT, &layer_fields(layers.get(layer).unwrap()))
            .unwrap();
        assert_eq!(
            text,
            "    Layer\n        # CADComponent ID: skin, layer L7\n        ID = 1\n        \
             Material_ID = 1  # Carbon\n        Thickness = 0.2\n        Orientation = 45\n        \
             Drop_Order = 1\n"
        );
    }

    #[test]
    fn pin_properties_without_placeholder_are_appended() {
        let registry = registry();
        let mut r = Renderer {
            registry: &registry,
            copy_xml_text: false,
            out: Rendered::default(),
        };
        let pin = PinSpecifier {
            id: Id::FIRST,
            source_id: "p1".into(),
            properties: vec![
                ("AxialDisplacement".into(), "FIXED".into()),
                ("Twist".into(), "FREE".into()),
                ("AxialRotation".into(), "FREE".into()),
            ],
            xml_text: String::new(),
        };
        r.emit_pin(&pin).unwrap();

        assert_eq!(
            r.out.text,
            "Constraint_Specifier_Pin\n    # CadAssembly _id:p1\n    ID = 1\n    \
             AxialDisplacement = FIXED\n    AxialRotation = FREE\n    Twist = FREE\n\n"
        );
    }
}
