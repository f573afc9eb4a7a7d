mod compile;

pub use compile::run_compile;

use anyhow::{Error, Result};

use patran_forge::{COMPILE_FAILURE_EXIT_CODE, CompileError};

use crate::cli::Cli;
use crate::display::Context;

pub fn run(cli: Cli, ctx: Context) -> Result<()> {
    run_compile(cli, ctx)
}

/// Failures raised by the compiler itself map to the status the job driver
/// checks for; anything else (bad flags, unreadable template file) is a
/// plain failure.
pub fn exit_status(err: &Error) -> u8 {
    let from_compiler = err.downcast_ref::<CompileError>().is_some()
        || err.downcast_ref::<patran_forge::io::Error>().is_some();
    if from_compiler {
        COMPILE_FAILURE_EXIT_CODE
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    #[test]
    fn compiler_errors_exit_with_99() {
        let err: Result<()> = Err(CompileError::material_lookup("Unobtainium").into());
        let err = err.context("Extraction failed").unwrap_err();
        assert_eq!(exit_status(&err), 99);
    }

    #[test]
    fn io_errors_exit_with_99() {
        let err = Error::new(patran_forge::io::Error::MissingInputFile {
            path: "CADAssembly.xml".into(),
        });
        assert_eq!(exit_status(&err), 99);
    }

    #[test]
    fn other_errors_exit_with_1() {
        assert_eq!(exit_status(&anyhow::anyhow!("bad flag")), 1);
    }
}
