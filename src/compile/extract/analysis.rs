use tracing::info;

use super::{required, required_child};
use crate::compile::context::ExtractionContext;
use crate::compile::error::Error;
use crate::io::Element;
use crate::io::xml::SOURCE_ID_ATTR;
use crate::model::entity::{Analysis, MeshParameters};
use crate::model::types::Instructions;

const ASSEMBLY_COMPONENTS: &str = "//CADComponent[@Type='ASSEMBLY']";
const MESH_PARAMETERS: &str = "Assembly/Analyses/FEA/MeshParameters";
const FEA: &str = "Assembly/Analyses/FEA";
const SOLVER: &str = "Assembly/Analyses/FEA/Solvers/Solver";

/// Written for a model without a mesh-parameters node.
const DEFAULT_MESH: [&str; 4] = ["0.101", "0.102", "0.201", "0.0501"];

/// Date written when no run stamp is configured.
pub(super) const UNSTAMPED: &str = "not recorded";

/// Derives the geometry file name from the single top-level assembly.
pub(super) fn assembly_name(ctx: &mut ExtractionContext<'_>, root: &Element) -> Result<(), Error> {
    let assemblies = root.select(ASSEMBLY_COMPONENTS);
    match assemblies.as_slice() {
        [assembly] => {
            let name = required(assembly, "Name")?;
            ctx.globals.geometry_file_name = Some(format!("{name}_asm.x_t"));
        }
        others => ctx.note(format!(
            "expected exactly one ASSEMBLY component, found {}; geometry file name left unset",
            others.len()
        )),
    }
    Ok(())
}

/// Reads the first mesh-parameters node, falling back to built-in values.
pub(super) fn mesh_parameters(
    ctx: &mut ExtractionContext<'_>,
    root: &Element,
) -> Result<MeshParameters, Error> {
    let nodes = root.select(MESH_PARAMETERS);
    let mut comments = format!("{MESH_PARAMETERS}.");

    let Some(node) = nodes.first() else {
        ctx.note("no MeshParameters node found; using built-in values");
        comments.push_str("  No MeshParameters node found; using built-in values.");
        let [length, curvature, ratio, proximity] = DEFAULT_MESH.map(str::to_string);
        return Ok(MeshParameters {
            max_global_length: length,
            max_curvature_delta: curvature,
            ratio_min_to_max_edge: ratio,
            face_proximity_tolerance: proximity,
            comments,
            xml_text: None,
        });
    };

    if nodes.len() > 1 {
        let ids: Vec<&str> = nodes
            .iter()
            .map(|n| n.attr(SOURCE_ID_ATTR).unwrap_or("?"))
            .collect();
        comments.push_str(&format!(
            " Multiple MeshParameters nodes (_id: {}); using the first.",
            ids.join(", ")
        ));
        ctx.note(format!(
            "{} MeshParameters nodes found, using {}",
            nodes.len(),
            node.origin()
        ));
    }

    Ok(MeshParameters {
        max_global_length: required(node, "Max_Global_Length")?.to_string(),
        max_curvature_delta: required(node, "Max_Curv_Delta_Div_Edge_Len")?.to_string(),
        ratio_min_to_max_edge: required(node, "Ratio_Min_Edge_To_Max_Edge")?.to_string(),
        face_proximity_tolerance: required(node, "Match_Face_Proximity_Tol")?.to_string(),
        comments,
        xml_text: Some(node.to_xml()),
    })
}

/// Reads the analysis settings and the solver's shell element type.
pub(super) fn analysis(ctx: &mut ExtractionContext<'_>, root: &Element) -> Result<Analysis, Error> {
    let assembly = required_child(root, "Assembly")?;
    let configuration_id = required(assembly, "ConfigurationID")?;

    let fea = required_child(root, FEA)?;
    let type_code = if required(fea, "Type")? == "STRUCTURAL" {
        101
    } else {
        103
    };
    let instructions = Instructions::from_mesh_only_flag(required(fea, "MeshOnly")?);

    let solver = required_child(root, SOLVER)?;
    let declared_solver = required(solver, "Type")?;
    let solver_name = match declared_solver {
        "PATRAN_NASTRAN" => "NASTRAN",
        other => other,
    };

    if let Some(shell) = solver.attr("ShellElementType") {
        let mapped = ctx.soften(surface_element_type(solver, shell))?;
        ctx.globals.surface_element_type =
            Some(mapped.unwrap_or_else(|| format!("UNSUPPORTED({shell})")));
    }

    let date = ctx
        .config
        .stamp
        .clone()
        .unwrap_or_else(|| UNSTAMPED.to_string());

    info!(
        configuration_id,
        solver = solver_name,
        %instructions,
        "read analysis settings"
    );
    Ok(Analysis {
        configuration_id: configuration_id.to_string(),
        type_code,
        solver: solver_name.to_string(),
        declared_solver: declared_solver.to_string(),
        instructions,
        date,
        xml_text: fea.to_xml(),
    })
}

/// Element type used for surfaces meshed with the given shell element.
fn surface_element_type(solver: &Element, shell: &str) -> Result<String, Error> {
    match shell {
        "PLATE_4_NODE" => Ok("QUAD4".to_string()),
        other => Err(Error::unsupported_element_type(solver.origin(), other)),
    }
}
