//! bistro - CLI tool for the bistro dashboard API.
//!
//! A thin wrapper over `bistro-http`. Credentials are kept in a file under
//! the user's data directory, and every call goes through the same refresh
//! coordinator a dashboard would use.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{api, auth};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Auth(cmd) => auth::handle(cmd, &cli.client).await,
        Commands::Api(cmd) => api::handle(cmd, &cli.client).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so command output on stdout stays parseable.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
