//! Login command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use bistro_core::Credentials;
use bistro_http::{ApiSession, SignInOutcome};

use crate::cli::ClientArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// Business name to create if the account has none yet
    #[arg(long)]
    pub business_name: Option<String>,
}

pub async fn run(args: LoginArgs, client: &ClientArgs) -> Result<()> {
    let session = session::open(client)?;
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Signing in...".dimmed());

    let outcome = session
        .sign_in(&credentials)
        .await
        .context("Failed to sign in")?;

    match outcome {
        SignInOutcome::Active => {
            output::success("Signed in successfully");
        }
        SignInOutcome::SetupRequired => {
            finish_setup(&session, args.business_name.as_deref()).await?;
        }
        SignInOutcome::VerificationRequired { email } => {
            output::warning(&format!("Email not verified. A new code was sent to {}.", email));
            bail!("Run 'bistro auth verify-email --email {} --code <CODE>' and sign in again.", email);
        }
    }

    println!();
    output::field("Email", &args.email);
    output::field("API", session.api_url().as_str());

    Ok(())
}

/// Create the business for an account holding a setup token.
///
/// The setup token only lives in this process, so setup has to finish here.
pub(super) async fn finish_setup(session: &ApiSession, business_name: Option<&str>) -> Result<()> {
    let Some(name) = business_name else {
        bail!("This account has no business yet. Re-run with --business-name <NAME> to finish setup.");
    };

    eprintln!("{}", "Creating business...".dimmed());

    session
        .create_organization(name)
        .await
        .context("Failed to create business")?;

    output::success(&format!("Business '{}' created and signed in", name));
    Ok(())
}
