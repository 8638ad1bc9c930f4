//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;

    eprintln!("{}", "Refreshing session...".dimmed());

    session
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    Ok(())
}
