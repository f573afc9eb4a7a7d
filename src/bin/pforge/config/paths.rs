use patran_forge::io::{InputPaths, OutputTarget};

use crate::cli::{InputOptions, OutputOptions};

pub fn build_input_paths(opts: &InputOptions) -> InputPaths {
    InputPaths {
        assembly: opts.assembly.clone(),
        metrics: opts.metrics.clone(),
        computed_values: opts.computed_values.clone(),
        material_library: opts.material_library.clone(),
    }
}

pub fn build_output_target(opts: &OutputOptions) -> OutputTarget {
    OutputTarget {
        directory: opts.output_dir.clone(),
        file_name: opts.output.clone(),
    }
}
