use anyhow::{Context, Result};
use tracing::info;

use patran_forge::io::{self as pio, InputPaths};
use patran_forge::{CompileConfig, CompiledScript, Extraction, extract_model, render_script};

use crate::cli::Cli;
use crate::config::{build_compile_config, build_input_paths, build_output_target};
use crate::display::{Context as DisplayContext, Progress, print_diagnostics, print_model_summary};

const TOTAL_STEPS: u8 = 4;

pub fn run_compile(cli: Cli, ctx: DisplayContext) -> Result<()> {
    let paths = build_input_paths(&cli.input);
    let target = build_output_target(&cli.output);
    let config = build_compile_config(&cli.compile)?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Loading input documents");
    let docs = pio::load_documents(&paths).context("Failed to load input documents")?;
    let library = pio::load_material_library(&paths.material_library)
        .context("Failed to load the material library")?;
    let load_substeps = build_load_substeps(&paths, library.len());
    progress.complete_step("Loading input documents", &as_refs(&load_substeps));

    progress.step("Extracting entities");
    let extraction = extract_model(&docs, &library, &config).context("Extraction failed")?;
    let extract_substeps = build_extract_substeps(&extraction);
    progress.complete_step("Extracting entities", &as_refs(&extract_substeps));

    if ctx.interactive {
        print_model_summary(&extraction.model);
    }

    progress.step("Rendering script");
    let script = render_script(extraction, &config).context("Rendering failed")?;
    let render_substeps = build_render_substeps(&config, &script);
    progress.complete_step("Rendering script", &as_refs(&render_substeps));

    progress.step("Writing output");
    let path = pio::write_script(&target, &script.text).context("Failed to write the script")?;
    let written = path.display().to_string();
    progress.complete_step("Writing output", &[written.as_str()]);

    if ctx.interactive {
        print_diagnostics(&script.diagnostics);
    }

    progress.finish();

    info!(
        path = %path.display(),
        warnings = script.warnings().count(),
        "script written"
    );
    Ok(())
}

fn as_refs(steps: &[String]) -> Vec<&str> {
    steps.iter().map(|s| s.as_str()).collect()
}

fn build_load_substeps(paths: &InputPaths, materials: usize) -> Vec<String> {
    let mut steps: Vec<String> = [&paths.assembly, &paths.metrics, &paths.computed_values]
        .iter()
        .map(|p| format!("Parse {}", p.display()))
        .collect();
    steps.push(format!("Read material library ({materials} entries)"));
    steps
}

fn build_extract_substeps(extraction: &Extraction) -> Vec<String> {
    let model = &extraction.model;
    let mut steps = vec![
        format!(
            "{} points, {} geometries",
            model.points.len(),
            model.geometries.len()
        ),
        format!(
            "{} solids, {} layups, {} materials",
            model.solids.len(),
            model.layups.len(),
            model.materials.len()
        ),
        format!(
            "{} loads, {} constraints, {} pins",
            model.loads.len(),
            model.constraints.len(),
            model.pins.len()
        ),
    ];
    if !extraction.diagnostics.is_empty() {
        steps.push(format!("{} warnings", extraction.diagnostics.len()));
    }
    steps
}

fn build_render_substeps(config: &CompileConfig, script: &CompiledScript) -> Vec<String> {
    let mut steps = vec![
        if config.templates.is_some() {
            "Apply custom template registry".to_string()
        } else {
            "Apply built-in template registry".to_string()
        },
        format!("Substitute globals (test bench {})", config.test_bench_name),
    ];
    if !script.pruned.is_empty() {
        steps.push(format!("Drop {} unset displacement lines", script.pruned.len()));
    }
    steps
}
