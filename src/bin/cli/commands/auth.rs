use clap::Subcommand;

use crate::client::NewStepsClient;
use crate::output::{self, OutputConfig};

/// Session commands
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in and print a session token
    Login {
        /// Account email
        #[clap(long)]
        email: String,
        /// Account password
        #[clap(long, env = "NEWSTEPS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the account the current token belongs to
    Whoami,
}

/// Executes a session command
pub async fn execute(
    client: &NewStepsClient,
    cmd: AuthCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let session = client.login(email, password).await?;
            output::print_session(&session, config);
        }
        AuthCommands::Whoami => {
            let user = client.me().await?;
            output::print_user(&user, config);
        }
    }
    Ok(())
}
