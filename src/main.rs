//! restock CLI - demand forecasting and order-quantity optimization.

use std::process::ExitCode;

use restock::cli::{run_cli, Args};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run_cli(Args::parse())
}
