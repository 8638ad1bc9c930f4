//! Email verification commands.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

use super::login::finish_setup;

#[derive(Args, Debug)]
pub struct VerifyEmailArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Code from the verification email
    #[arg(long)]
    pub code: String,

    /// Business name to create once the email is verified
    #[arg(long)]
    pub business_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ResendVerificationArgs {
    /// Account email
    #[arg(long)]
    pub email: String,
}

pub async fn run(args: VerifyEmailArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;

    let setup_issued = session
        .verify_email(&args.email, &args.code)
        .await
        .context("Failed to verify email")?;

    output::success("Email verified");

    match (setup_issued, args.business_name.as_deref()) {
        (true, Some(name)) => finish_setup(&session, Some(name)).await,
        _ => {
            output::field("Next", "run 'bistro auth login --business-name <NAME>'");
            Ok(())
        }
    }
}

pub async fn resend(args: ResendVerificationArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;

    session
        .resend_verification(&args.email)
        .await
        .context("Failed to send verification code")?;

    output::success(&format!("Verification code sent to {}", args.email));
    Ok(())
}
