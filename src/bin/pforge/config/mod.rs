mod compile;
mod paths;

pub use compile::build_compile_config;
pub use paths::{build_input_paths, build_output_target};
