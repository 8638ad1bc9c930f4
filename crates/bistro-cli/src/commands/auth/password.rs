//! Password commands.

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ForgotPasswordArgs {
    /// Account email
    #[arg(long)]
    pub email: String,
}

#[derive(Args, Debug)]
pub struct VerifyResetTokenArgs {
    /// Token from the reset link
    #[arg(long)]
    pub token: String,
}

#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    /// Token from the reset link
    #[arg(long)]
    pub token: String,

    /// New password
    #[arg(long)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct ChangePasswordArgs {
    /// Current password
    #[arg(long)]
    pub old_password: String,

    /// New password
    #[arg(long)]
    pub new_password: String,
}

pub async fn forgot(args: ForgotPasswordArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;

    session
        .forgot_password(&args.email)
        .await
        .context("Failed to request password reset")?;

    output::success(&format!("Reset instructions sent to {}", args.email));
    Ok(())
}

pub async fn verify_reset_token(args: VerifyResetTokenArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;

    let valid = session
        .verify_reset_token(&args.token)
        .await
        .context("Failed to check reset token")?;

    if !valid {
        bail!("Reset token is invalid or expired");
    }

    output::success("Reset token is valid");
    Ok(())
}

pub async fn reset(args: ResetPasswordArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;

    session
        .reset_password(&args.token, &args.password)
        .await
        .context("Failed to reset password")?;

    output::success("Password reset. Sign in with your new password.");
    Ok(())
}

pub async fn change(args: ChangePasswordArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;

    session
        .change_password(&args.old_password, &args.new_password)
        .await
        .context("Failed to change password")?;

    output::success("Password changed");
    Ok(())
}
