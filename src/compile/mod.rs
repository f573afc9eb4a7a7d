mod config;
mod context;
mod error;
mod extract;
mod globals;
mod materials;
mod render;
mod template;

pub use config::{CompileConfig, DEFAULT_TEST_BENCH_NAME, PlaceholderMode};
pub use error::{Diagnostic, Error, Severity};
pub use globals::Globals;
pub use materials::{MaterialEntry, MaterialLibrary, Quantity, UNASSIGNED_MATERIAL};
pub use render::NO_VALUE;
pub use template::{TemplateRegistry, TemplateSection, default_templates, load_templates};

use std::path::PathBuf;

use tracing::{info, warn};

use crate::io::{self, Documents, InputPaths, OutputTarget};
use crate::model::compiled::CompiledModel;

/// Entity tables and script-wide values gathered from the input documents.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub model: CompiledModel,
    pub globals: Globals,
    pub diagnostics: Vec<Diagnostic>,
}

/// The generated script together with everything that went into it.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    pub text: String,
    pub model: CompiledModel,
    pub diagnostics: Vec<Diagnostic>,
    /// Lines dropped from displacement blocks because their value was unset.
    pub pruned: Vec<String>,
}

impl CompiledScript {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

/// Walks the documents and builds every entity table.
pub fn extract_model(
    docs: &Documents,
    library: &MaterialLibrary,
    config: &CompileConfig,
) -> Result<Extraction, Error> {
    let mut ctx = context::ExtractionContext::new(library, config);
    let (analysis, mesh_parameters) = extract::extract(docs, &mut ctx)?;
    let (model, globals, diagnostics) = ctx.finish(analysis, mesh_parameters);
    Ok(Extraction {
        model,
        globals,
        diagnostics,
    })
}

/// Renders the extracted model and applies the global pass.
pub fn render_script(extraction: Extraction, config: &CompileConfig) -> Result<CompiledScript, Error> {
    let registry = load_templates(config.templates.as_deref())?;
    let rendered = render::render(&extraction.model, &registry, config.copy_xml_text)?;
    let text = extraction.globals.apply(&rendered.text);

    let leftover = template::placeholders(&text);
    if !leftover.is_empty() {
        match config.placeholders {
            PlaceholderMode::Strict => {
                return Err(Error::UnresolvedPlaceholder { names: leftover });
            }
            PlaceholderMode::Permissive => {
                warn!(placeholders = ?leftover, "placeholders left in output");
            }
        }
    }

    info!(
        bytes = text.len(),
        pruned = rendered.pruned.len(),
        "rendered script"
    );
    Ok(CompiledScript {
        text,
        model: extraction.model,
        diagnostics: extraction.diagnostics,
        pruned: rendered.pruned,
    })
}

/// Compiles in-memory documents into a script.
///
/// # Errors
///
/// Returns the first fatal error raised while extracting or rendering.
/// Warnings do not fail the run; they are collected in
/// [`CompiledScript::diagnostics`].
pub fn compile(
    docs: &Documents,
    library: &MaterialLibrary,
    config: &CompileConfig,
) -> Result<CompiledScript, Error> {
    let extraction = extract_model(docs, library, config)?;
    render_script(extraction, config)
}

/// Loads the inputs, compiles them and writes the script.
///
/// The output file is only touched once compilation has fully succeeded.
pub fn compile_files(
    paths: &InputPaths,
    target: &OutputTarget,
    config: &CompileConfig,
) -> Result<(CompiledScript, PathBuf), Error> {
    let docs = io::load_documents(paths)?;
    let library = io::load_material_library(&paths.material_library)?;
    let script = compile(&docs, &library, config)?;
    let path = io::write_script(target, &script.text)?;
    Ok((script, path))
}
