//! Reading the input documents and writing the generated script.
//!
//! The compiler consumes three XML documents produced by the CAD assembler
//! (the assembly description, its metrics, and the computed values) plus a
//! JSON material library, and produces one plain-text script consumed by the
//! meshing tool in batch mode.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::compile::MaterialLibrary;

pub mod error;
pub mod xml;

pub use error::Error;
pub use xml::Element;

pub const DEFAULT_ASSEMBLY: &str = "CADAssembly.xml";
pub const DEFAULT_METRICS: &str = "CADAssembly_metrics.xml";
pub const DEFAULT_COMPUTED_VALUES: &str = "ComputedValues.xml";
pub const DEFAULT_MATERIAL_LIBRARY: &str = "material_library.json";
pub const DEFAULT_OUTPUT_FILE: &str = "CreatePatranModelInput.txt";

/// Name of the file written next to the output when a run fails.
pub const FAILURE_SENTINEL: &str = "_FAILED.txt";

/// Locations of every input the compiler reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub assembly: PathBuf,
    pub metrics: PathBuf,
    pub computed_values: PathBuf,
    pub material_library: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            assembly: PathBuf::from(DEFAULT_ASSEMBLY),
            metrics: PathBuf::from(DEFAULT_METRICS),
            computed_values: PathBuf::from(DEFAULT_COMPUTED_VALUES),
            material_library: PathBuf::from(DEFAULT_MATERIAL_LIBRARY),
        }
    }
}

impl InputPaths {
    /// Default file names resolved against `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        let defaults = Self::default();
        Self {
            assembly: dir.join(defaults.assembly),
            metrics: dir.join(defaults.metrics),
            computed_values: dir.join(defaults.computed_values),
            material_library: dir.join(defaults.material_library),
        }
    }

    fn documents(&self) -> [&Path; 3] {
        [&self.assembly, &self.metrics, &self.computed_values]
    }
}

/// Where the generated script goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub file_name: String,
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_name: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

impl OutputTarget {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            directory: dir.into(),
            ..Self::default()
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    pub fn sentinel_path(&self) -> PathBuf {
        self.directory.join(FAILURE_SENTINEL)
    }
}

/// A parsed input document.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    root: Element,
}

impl Document {
    /// Parses `xml`, labelling diagnostics with `source`.
    pub fn parse(source: impl Into<String>, xml: &str) -> Result<Self, Error> {
        let source = source.into();
        let root = xml::parse_str(xml).map_err(|e| e.with_origin(source.clone()))?;
        Ok(Self { source, root })
    }

    #[inline]
    pub fn root(&self) -> &Element {
        &self.root
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// The three documents one compiler run reads.
#[derive(Debug, Clone)]
pub struct Documents {
    pub assembly: Document,
    pub metrics: Document,
    pub computed_values: Document,
}

impl Documents {
    /// Parses the documents from in-memory text.
    pub fn parse(assembly: &str, metrics: &str, computed_values: &str) -> Result<Self, Error> {
        Ok(Self {
            assembly: Document::parse(DEFAULT_ASSEMBLY, assembly)?,
            metrics: Document::parse(DEFAULT_METRICS, metrics)?,
            computed_values: Document::parse(DEFAULT_COMPUTED_VALUES, computed_values)?,
        })
    }
}

/// Loads the assembly, metrics and computed-values documents.
///
/// Every path is checked for existence before any document is parsed.
///
/// # Errors
///
/// Returns [`Error::MissingInputFile`] naming the first absent path, or
/// [`Error::Xml`] if a document is not well-formed.
pub fn load_documents(paths: &InputPaths) -> Result<Documents, Error> {
    for path in paths.documents() {
        require_file(path)?;
    }

    let load = |path: &Path| -> Result<Document, Error> {
        let text = read_file(path)?;
        let doc = Document::parse(path.display().to_string(), &text)?;
        debug!(path = %path.display(), root = doc.root().name(), "parsed document");
        Ok(doc)
    };

    Ok(Documents {
        assembly: load(&paths.assembly)?,
        metrics: load(&paths.metrics)?,
        computed_values: load(&paths.computed_values)?,
    })
}

/// Loads the material property library.
pub fn load_material_library(path: &Path) -> Result<MaterialLibrary, Error> {
    require_file(path)?;
    let text = read_file(path)?;
    let library = MaterialLibrary::from_json(&text).map_err(|e| Error::MaterialLibrary {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    info!(
        path = %path.display(),
        materials = library.len(),
        "loaded material library"
    );
    Ok(library)
}

/// Writes the script, replacing any output of a previous run.
pub fn write_script(target: &OutputTarget, text: &str) -> Result<PathBuf, Error> {
    let path = target.path();
    fs::write(&path, text).map_err(|source| Error::OutputWriteFailure {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), bytes = text.len(), "wrote script");
    Ok(path)
}

/// Records a failed run for the pipeline driver.
pub fn write_failure_sentinel(directory: &Path, message: &str) -> Result<PathBuf, Error> {
    let path = directory.join(FAILURE_SENTINEL);
    fs::write(&path, message).map_err(|source| Error::OutputWriteFailure {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn require_file(path: &Path) -> Result<(), Error> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::MissingInputFile {
            path: path.to_path_buf(),
        })
    }
}

fn read_file(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_use_conventional_names() {
        let paths = InputPaths::default();
        assert_eq!(paths.assembly, PathBuf::from("CADAssembly.xml"));
        assert_eq!(paths.metrics, PathBuf::from("CADAssembly_metrics.xml"));
        assert_eq!(paths.computed_values, PathBuf::from("ComputedValues.xml"));

        let target = OutputTarget::default();
        assert_eq!(
            target.path(),
            Path::new(".").join("CreatePatranModelInput.txt")
        );
        assert_eq!(target.sentinel_path(), Path::new(".").join("_FAILED.txt"));
    }

    #[test]
    fn missing_document_is_reported_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_ASSEMBLY), "not xml at all <").unwrap();

        let err = load_documents(&InputPaths::in_dir(dir.path())).unwrap_err();
        match err {
            Error::MissingInputFile { path } => {
                assert!(path.ends_with(DEFAULT_METRICS));
            }
            other => panic!("expected MissingInputFile, got {other:?}"),
        }
    }

    #[test]
    fn malformed_document_names_its_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_ASSEMBLY), "<A><B></A>").unwrap();
        fs::write(dir.path().join(DEFAULT_METRICS), "<M/>").unwrap();
        fs::write(dir.path().join(DEFAULT_COMPUTED_VALUES), "<C/>").unwrap();

        let err = load_documents(&InputPaths::in_dir(dir.path())).unwrap_err();
        assert!(err.to_string().contains(DEFAULT_ASSEMBLY));
    }

    #[test]
    fn write_script_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::in_dir(dir.path());
        fs::write(target.path(), "old contents that are longer").unwrap();

        let path = write_script(&target, "new").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::in_dir(dir.path().join("does-not-exist"));
        let err = write_script(&target, "text").unwrap_err();
        assert!(matches!(err, Error::OutputWriteFailure { .. }));
    }

    #[test]
    fn sentinel_contains_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_failure_sentinel(dir.path(), "it broke").unwrap();
        assert!(path.ends_with(FAILURE_SENTINEL));
        assert_eq!(fs::read_to_string(path).unwrap(), "it broke");
    }

    #[test]
    fn material_library_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_material_library(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::MissingInputFile { .. }));
    }

    #[test]
    fn invalid_material_library_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.json");
        fs::write(&path, "{\"unexpected\": 1}").unwrap();
        let err = load_material_library(&path).unwrap_err();
        assert!(matches!(err, Error::MaterialLibrary { .. }));
    }
}
