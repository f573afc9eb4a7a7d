use std::io::{self, Write};

use anyhow::Error;

use patran_forge::CompileError;
use patran_forge::io::Error as IoError;

use crate::util::text::wrap;

const WIDTH: usize = 59;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let rule = "─".repeat(WIDTH + 3);

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔{}╗", "═".repeat(WIDTH + 3));
    let _ = writeln!(stderr, "   ║  {:<WIDTH$} ║", "✗ Error");
    let _ = writeln!(stderr, "   ╟{rule}╢");

    for line in wrap(&err.to_string(), WIDTH) {
        let _ = writeln!(stderr, "   ║  {:<WIDTH$} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟{rule}╢");
        let _ = writeln!(stderr, "   ║  {:<WIDTH$} ║", "Caused by:");
        for line in wrap(&cause.to_string(), WIDTH - 2) {
            let _ = writeln!(stderr, "   ║    {:<w$} ║", line, w = WIDTH - 2);
        }
    }

    let hints = hints_for(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟{rule}╢");
        let _ = writeln!(stderr, "   ║  {:<WIDTH$} ║", "Hints:");
        for hint in hints {
            let wrapped = wrap(&hint, WIDTH - 4);
            for (i, line) in wrapped.iter().enumerate() {
                let bullet = if i == 0 { "•" } else { " " };
                let _ = writeln!(stderr, "   ║    {bullet} {:<w$} ║", line, w = WIDTH - 4);
            }
        }
    }

    let _ = writeln!(stderr, "   ╚{}╝", "═".repeat(WIDTH + 3));
    let _ = writeln!(stderr);
}

/// Suggestions for the failure, looked up from the typed error when there
/// is one.
fn hints_for(err: &Error) -> Vec<String> {
    if let Some(e) = err.downcast_ref::<CompileError>() {
        return compile_hints(e);
    }
    if let Some(e) = err.downcast_ref::<IoError>() {
        return io_hints(e);
    }
    fallback_hints(err)
}

fn compile_hints(err: &CompileError) -> Vec<String> {
    match err {
        CompileError::Io(e) => io_hints(e),
        CompileError::MissingRequiredAttribute { origin, .. } => vec![
            format!("Check the {origin} element in the assembly documents"),
            "Regenerate the assembly if the element was written by hand".into(),
        ],
        CompileError::InvalidAttribute { attribute, .. } => vec![format!(
            "The {attribute} value does not have the expected shape"
        )],
        CompileError::UnresolvedReference { key, .. } => vec![
            format!("Metric '{key}' is referenced but never defined"),
            "Make sure ComputedValues.xml belongs to the same assembly run".into(),
        ],
        CompileError::UnsupportedConstraintValue { .. } => vec![
            "Displacement axes take a number, FIXED or FREE".into(),
        ],
        CompileError::UnsupportedLoadType { .. } => vec![
            "Only Pressure loads can be written for Patran".into(),
            "Replace Force and ForceMoment loads, or use another solver".into(),
        ],
        CompileError::TemplateNotFound(section) => vec![
            format!("The template registry has no [sections.{section}] table"),
            "Start from the built-in registry and edit it".into(),
        ],
        CompileError::TemplateParse(_) => vec!["The --templates file is not valid TOML".into()],
        CompileError::UnresolvedPlaceholder { .. } => vec![
            "A template names a field that the entity does not have".into(),
            "Drop --strict to leave unknown placeholders in place".into(),
        ],
        CompileError::MaterialLookupFailure { .. }
        | CompileError::UnitConversion { .. }
        | CompileError::MissingMaterialProperty { .. }
        | CompileError::UnsupportedElementType { .. } => {
            vec!["Review the warnings in the log file".into()]
        }
    }
}

fn io_hints(err: &IoError) -> Vec<String> {
    match err {
        IoError::MissingInputFile { path } => vec![
            format!("'{}' was not found", path.display()),
            "Run from the analysis directory or pass the path explicitly".into(),
        ],
        IoError::Xml { origin, .. } => vec![
            format!("{origin} is not well-formed XML"),
            "The file may be truncated by an interrupted CAD run".into(),
        ],
        IoError::MaterialLibrary { .. } => vec![
            "The material library must hold a top-level \"Material library\" object".into(),
        ],
        IoError::Io { source }
        | IoError::Read { source, .. }
        | IoError::OutputWriteFailure { source, .. } => std_io_hints(source),
    }
}

fn std_io_hints(source: &std::io::Error) -> Vec<String> {
    use std::io::ErrorKind;

    match source.kind() {
        ErrorKind::NotFound => vec!["Check the path spelling and that the directory exists".into()],
        ErrorKind::PermissionDenied => vec!["Check file permissions with `ls -la`".into()],
        ErrorKind::InvalidData => vec!["The file is not valid UTF-8 text".into()],
        _ => vec!["Check file paths, permissions and disk space".into()],
    }
}

fn fallback_hints(err: &Error) -> Vec<String> {
    let text = err
        .chain()
        .map(|c| c.to_string().to_lowercase())
        .collect::<Vec<_>>()
        .join("\n");

    if text.contains("template") {
        vec!["Check the --templates path".into()]
    } else if text.contains("log") {
        vec!["Use --log-file to put the log somewhere writable".into()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    #[test]
    fn typed_hints_survive_context() {
        let err: anyhow::Result<()> = Err(CompileError::unsupported_load("Load[_id=l1]", "Force").into());
        let err = err.context("Extraction failed").unwrap_err();
        let hints = hints_for(&err);
        assert!(hints.iter().any(|h| h.contains("Only Pressure")));
    }

    #[test]
    fn missing_input_names_the_file() {
        let err = Error::new(IoError::MissingInputFile {
            path: "CADAssembly.xml".into(),
        });
        assert!(hints_for(&err)[0].contains("CADAssembly.xml"));
    }

    #[test]
    fn untyped_errors_fall_back_to_text() {
        let err = anyhow::anyhow!("Failed to load template registry 'x.toml'");
        assert_eq!(hints_for(&err), ["Check the --templates path"]);
        assert!(hints_for(&anyhow::anyhow!("boom")).is_empty());
    }
}
