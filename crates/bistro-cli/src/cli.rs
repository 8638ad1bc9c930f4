//! CLI argument definitions.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use bistro_core::{ApiUrl, ClientConfig};

use crate::commands::api::ApiCommand;
use crate::commands::auth::AuthCommand;

/// Command-line client for the bistro dashboard API.
#[derive(Parser, Debug)]
#[command(name = "bistro")]
#[command(author, version = env!("BISTRO_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub client: ClientArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Base URL of the dashboard API
    #[arg(long, env = "BISTRO_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

impl ClientArgs {
    pub fn config(&self) -> Result<ClientConfig> {
        let api_url = self
            .api_url
            .as_deref()
            .context("No API URL. Pass --api-url or set BISTRO_API_URL.")?;
        let api_url = ApiUrl::new(api_url).context("Invalid API URL")?;

        Ok(ClientConfig::new(api_url)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_user_agent(concat!("bistro-cli/", env!("BISTRO_VERSION"))))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign-in, onboarding and account operations
    Auth(AuthCommand),

    /// Call any API endpoint with the stored session
    Api(ApiCommand),
}
