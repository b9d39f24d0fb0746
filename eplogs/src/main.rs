use clap::Parser;
use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

mod app;
mod cli;
mod config;
mod credentials;
mod metrics_defs;
mod output;
mod telemetry;

use cli::Cli;
use config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _sentry = telemetry::init_logging(config.logging.as_ref());
    if let Some(metrics) = &config.metrics
        && let Err(e) = telemetry::init_metrics(metrics)
    {
        tracing::warn!(error = %e, "Metrics are disabled");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: could not start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(app::run(cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // stderr is all we can report to; a failed write changes nothing
            let _ = report(&mut io::stderr().lock(), &e);
            ExitCode::FAILURE
        }
    }
}

/// Prints the error once on `out` and hands it to sentry, which drops it
/// when no DSN is configured.
fn report<W: Write>(out: &mut W, error: &app::CliError) -> io::Result<()> {
    sentry::capture_error(error);
    writeln!(out, "error: {}", error_chain(error))
}

fn error_chain(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        // thiserror variants often embed their source in their own message
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}
