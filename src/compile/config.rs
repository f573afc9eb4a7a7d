pub const DEFAULT_TEST_BENCH_NAME: &str = "A_horse_with_no_name";

#[derive(Debug, Clone)]
pub struct CompileConfig {
    pub templates: Option<String>,
    pub copy_xml_text: bool,
    pub placeholders: PlaceholderMode,
    pub test_bench_name: String,
    pub stamp: Option<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            templates: None,
            copy_xml_text: false,
            placeholders: PlaceholderMode::Permissive,
            test_bench_name: DEFAULT_TEST_BENCH_NAME.to_string(),
            stamp: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderMode {
    /// Unknown placeholders are left verbatim in the output.
    #[default]
    Permissive,
    /// Any placeholder left after the global pass fails the run.
    Strict,
}
