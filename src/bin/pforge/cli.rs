use std::path::PathBuf;

use clap::{Args, Parser};

use patran_forge::io::{
    DEFAULT_ASSEMBLY, DEFAULT_COMPUTED_VALUES, DEFAULT_MATERIAL_LIBRARY, DEFAULT_METRICS,
    DEFAULT_OUTPUT_FILE,
};
use patran_forge::DEFAULT_TEST_BENCH_NAME;

#[derive(Parser)]
#[command(
    name = "pforge",
    about = "Compile a CAD assembly into a Patran model-creation script",
    version,
    author,
    before_help = crate::display::banner_for_help()
)]
pub struct Cli {
    #[command(flatten)]
    pub input: InputOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub compile: CompileOptions,

    #[command(flatten)]
    pub logging: LoggingOptions,
}

/// Input documents.
#[derive(Args)]
#[command(next_help_heading = "Input Documents")]
pub struct InputOptions {
    /// Assembly description written by the CAD assembler
    #[arg(long = "cadassembly", value_name = "FILE", default_value = DEFAULT_ASSEMBLY)]
    pub assembly: PathBuf,

    /// Assembly metrics (component to material assignments)
    #[arg(long, value_name = "FILE", default_value = DEFAULT_METRICS)]
    pub metrics: PathBuf,

    /// Computed point coordinates
    #[arg(long = "computed-values", value_name = "FILE", default_value = DEFAULT_COMPUTED_VALUES)]
    pub computed_values: PathBuf,

    /// Material property library (JSON)
    #[arg(long = "material-library", value_name = "FILE", default_value = DEFAULT_MATERIAL_LIBRARY)]
    pub material_library: PathBuf,
}

/// Where the script and the failure marker go.
#[derive(Args)]
#[command(next_help_heading = "Output")]
pub struct OutputOptions {
    /// Directory receiving the script, the log and any failure marker
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// File name of the generated script
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: String,
}

#[derive(Args)]
#[command(next_help_heading = "Compilation")]
pub struct CompileOptions {
    /// Custom template registry (TOML) replacing the built-in one
    #[arg(long, value_name = "FILE")]
    pub templates: Option<PathBuf>,

    /// Include the source XML of every entity in the script
    #[arg(long = "copy-xml-text")]
    pub copy_xml_text: bool,

    /// Fail when any placeholder is left unresolved
    #[arg(long)]
    pub strict: bool,

    /// Test bench name used for the database and subcase
    #[arg(long = "test-bench", value_name = "NAME", default_value = DEFAULT_TEST_BENCH_NAME)]
    pub test_bench: String,

    /// Text recorded in the Analysis date field
    #[arg(long, value_name = "TEXT")]
    pub stamp: Option<String>,
}

#[derive(Args)]
#[command(next_help_heading = "Logging")]
pub struct LoggingOptions {
    /// Suppress progress output and the stderr log mirror
    #[arg(short, long)]
    pub quiet: bool,

    /// Log file (default: <output-dir>/log/CreatePatranInputFile.log)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_library_file_names() {
        let cli = Cli::try_parse_from(["pforge"]).unwrap();
        assert_eq!(cli.input.assembly, PathBuf::from("CADAssembly.xml"));
        assert_eq!(cli.input.material_library, PathBuf::from("material_library.json"));
        assert_eq!(cli.output.output_dir, PathBuf::from("."));
        assert_eq!(cli.output.output, "CreatePatranModelInput.txt");
        assert_eq!(cli.compile.test_bench, "A_horse_with_no_name");
        assert!(!cli.compile.strict);
    }

    #[test]
    fn flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "pforge",
            "--cadassembly",
            "in/asm.xml",
            "--output-dir",
            "out",
            "--strict",
            "--copy-xml-text",
            "--stamp",
            "2024-01-01",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.input.assembly, PathBuf::from("in/asm.xml"));
        assert_eq!(cli.output.output_dir, PathBuf::from("out"));
        assert!(cli.compile.strict);
        assert!(cli.compile.copy_xml_text);
        assert_eq!(cli.compile.stamp.as_deref(), Some("2024-01-01"));
        assert!(cli.logging.quiet);
    }
}
