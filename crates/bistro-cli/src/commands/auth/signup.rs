//! Signup command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Your name
    #[arg(long)]
    pub name: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: SignupArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;

    session
        .sign_up(&args.name, &args.email, &args.password)
        .await
        .context("Failed to create account")?;

    output::success("Account created");
    output::field("Next", "check your email for a code, then run 'bistro auth verify-email'");

    Ok(())
}
