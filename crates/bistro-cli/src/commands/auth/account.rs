//! Account update command.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::ClientArgs;
use crate::output::{self, JsonStyle};
use crate::session;

#[derive(Args, Debug)]
pub struct UpdateAccountArgs {
    /// New display name
    #[arg(long)]
    pub name: String,
}

pub async fn run(args: UpdateAccountArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;

    let account = session
        .update_account(&args.name)
        .await
        .context("Failed to update account")?;

    output::success("Account updated");
    output::json(&account, JsonStyle::Pretty)
}
