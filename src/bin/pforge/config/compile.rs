use anyhow::{Context, Result};

use patran_forge::{CompileConfig, PlaceholderMode};

use crate::cli::CompileOptions;

pub fn build_compile_config(opts: &CompileOptions) -> Result<CompileConfig> {
    let templates = opts
        .templates
        .as_ref()
        .map(|path| {
            crate::io::read_text(path)
                .with_context(|| format!("Failed to load template registry '{}'", path.display()))
        })
        .transpose()?;

    Ok(CompileConfig {
        templates,
        copy_xml_text: opts.copy_xml_text,
        placeholders: if opts.strict {
            PlaceholderMode::Strict
        } else {
            PlaceholderMode::Permissive
        },
        test_bench_name: opts.test_bench.clone(),
        stamp: opts.stamp.clone(),
    })
}
