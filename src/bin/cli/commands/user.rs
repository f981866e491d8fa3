use clap::Subcommand;
use newsteps::models::Role;

use crate::client::NewStepsClient;
use crate::output::{self, OutputConfig};

/// Account commands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List all accounts
    List,
    /// Change an account's role
    Role {
        /// The user ID
        id: String,
        /// user or admin
        role: Role,
    },
}

/// Executes an account command
pub async fn execute(
    client: &NewStepsClient,
    cmd: UserCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        UserCommands::List => {
            let users = client.list_users().await?;
            output::print_users(&users, config);
        }
        UserCommands::Role { id, role } => {
            let user = client.update_user_role(&id, role).await?;
            output::print_user(&user, config);
        }
    }
    Ok(())
}
