//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::ClientArgs;
use crate::output::{self, JsonStyle};
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the raw account JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;

    if session.store().access_token()?.is_none() {
        anyhow::bail!("No active session. Run 'bistro auth login' first.");
    }

    let account = session.account().await.context("Failed to load account")?;

    if args.json {
        return output::json(&account, JsonStyle::Pretty);
    }

    output::profile(&account);
    output::field("API", session.api_url().as_str());

    Ok(())
}
