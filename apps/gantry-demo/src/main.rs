use std::error::Error as _;

use clap::Parser;
use gantry_demo::cli::Cli;
use gantry_demo::run;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run::run(cli).await {
        // Failures go to stderr the way clap's own usage errors do.
        eprintln!("error: {err}");
        if let Some(source) = err.source() {
            eprintln!("  caused by: {source}");
        }
        std::process::exit(err.exit_code());
    }
}
