//! Binary crate for the `forecast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Prompting for coordinates
//! - Reporting failures and choosing the exit status

use clap::Parser;
use forecast_core::ForecastError;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod prompt;

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);

    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", report(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "forecast=warn,forecast_core=warn",
        1 => "forecast=info,forecast_core=info",
        _ => "forecast=debug,forecast_core=debug",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// One line naming the failure kind, followed by the error chain.
fn report(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ForecastError>() {
        Some(forecast) => format!("error: {}: {err:#}", forecast.kind()),
        None => format!("error: {err:#}"),
    }
}
