//! fkprune - prune a SQLite database without leaving orphans.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fkprune_cli::{format_report, run, Args};

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting fkprune");

    match run(&args) {
        Ok(report) => {
            println!("{}", format_report(&report));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "pruning failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
