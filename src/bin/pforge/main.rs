use std::process::ExitCode;

mod cli;
mod commands;
mod config;
mod display;
mod io;
mod logging;
mod util;

fn main() -> ExitCode {
    let cli = cli::parse();
    let ctx = display::Context::detect().with_quiet(cli.logging.quiet);

    if let Err(e) = logging::init(&cli.logging, &cli.output.output_dir) {
        display::print_error(&e);
        return ExitCode::FAILURE;
    }

    if ctx.interactive {
        display::print_banner();
    }

    let output_dir = cli.output.output_dir.clone();
    match commands::run(cli, ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            display::print_error(&e);
            io::record_failure(&output_dir, &e);
            ExitCode::from(commands::exit_status(&e))
        }
    }
}
