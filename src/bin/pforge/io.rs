use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Error, Result};
use tracing::{info, warn};

/// Returns `true` if stderr is a terminal (interactive).
pub fn stderr_is_tty() -> bool {
    io::stderr().is_terminal()
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

/// Writes the failure marker the job driver looks for. A marker that cannot
/// be written is logged; the run has already failed.
pub fn record_failure(directory: &Path, err: &Error) {
    let message = format!("pforge failed: {err:#}\n");
    match patran_forge::io::write_failure_sentinel(directory, &message) {
        Ok(path) => info!(path = %path.display(), "wrote failure marker"),
        Err(e) => warn!("could not write failure marker: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patran_forge::io::FAILURE_SENTINEL;

    #[test]
    fn failure_marker_holds_the_error_chain() {
        let dir = tempfile::tempdir().unwrap();
        let err = anyhow::anyhow!("inner problem").context("Extraction failed");
        record_failure(dir.path(), &err);

        let text = fs::read_to_string(dir.path().join(FAILURE_SENTINEL)).unwrap();
        assert!(text.contains("Extraction failed: inner problem"));
    }

    #[test]
    fn read_text_names_the_path() {
        let err = read_text(Path::new("/no/such/file.toml")).unwrap_err();
        assert!(err.to_string().contains("/no/such/file.toml"));
    }
}
