//! Auth subcommand implementations.

mod account;
mod login;
mod logout;
mod password;
mod refresh;
mod signup;
mod verify_email;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::ClientArgs;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Sign in and store the session
    Login(login::LoginArgs),

    /// Create a new account
    Signup(signup::SignupArgs),

    /// Confirm an email address with the emailed code
    VerifyEmail(verify_email::VerifyEmailArgs),

    /// Send a new verification code
    ResendVerification(verify_email::ResendVerificationArgs),

    /// Refresh the access token
    Refresh(refresh::RefreshArgs),

    /// Sign out and remove stored credentials
    Logout(logout::LogoutArgs),

    /// Display the signed-in account
    Whoami(whoami::WhoamiArgs),

    /// Change the account's display name
    UpdateAccount(account::UpdateAccountArgs),

    /// Email a password reset link
    ForgotPassword(password::ForgotPasswordArgs),

    /// Check whether a password reset token is still valid
    VerifyResetToken(password::VerifyResetTokenArgs),

    /// Set a new password with a reset token
    ResetPassword(password::ResetPasswordArgs),

    /// Change the password of the signed-in account
    ChangePassword(password::ChangePasswordArgs),
}

pub async fn handle(cmd: AuthCommand, client: &ClientArgs) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login::run(args, client).await,
        AuthSubcommand::Signup(args) => signup::run(args, client).await,
        AuthSubcommand::VerifyEmail(args) => verify_email::run(args, client).await,
        AuthSubcommand::ResendVerification(args) => verify_email::resend(args, client).await,
        AuthSubcommand::Refresh(args) => refresh::run(args, client).await,
        AuthSubcommand::Logout(args) => logout::run(args, client).await,
        AuthSubcommand::Whoami(args) => whoami::run(args, client).await,
        AuthSubcommand::UpdateAccount(args) => account::run(args, client).await,
        AuthSubcommand::ForgotPassword(args) => password::forgot(args, client).await,
        AuthSubcommand::VerifyResetToken(args) => password::verify_reset_token(args, client).await,
        AuthSubcommand::ResetPassword(args) => password::reset(args, client).await,
        AuthSubcommand::ChangePassword(args) => password::change(args, client).await,
    }
}
