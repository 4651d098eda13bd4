//! stepwisec: lowers the generator functions of a TypeScript file into
//! resumable state-machine classes.

mod cli;
mod commands;
mod config;
mod diagnostics;
mod error;

use clap::Parser;
use cli::Cli;
use error::CliError;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "STEPWISE_LOG";

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(err) = commands::run(&cli) {
        let reported = err
            .downcast_ref::<CliError>()
            .is_some_and(CliError::is_reported);
        if !reported {
            diagnostics::report_error(&format!("{:#}", err));
        }
        std::process::exit(1);
    }
}
