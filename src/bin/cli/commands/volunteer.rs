use clap::Subcommand;
use newsteps::models::VolunteerStatus;

use crate::client::NewStepsClient;
use crate::output::{self, OutputConfig};

/// Volunteer commands
#[derive(Subcommand, Debug)]
pub enum VolunteerCommands {
    /// List volunteers
    List {
        /// Only volunteers with this status
        #[clap(long)]
        status: Option<VolunteerStatus>,
    },
    /// Update a volunteer's status
    Status {
        /// The volunteer ID
        id: String,
        /// new, contacted, active, or inactive
        status: VolunteerStatus,
    },
}

/// Executes a volunteer command
pub async fn execute(
    client: &NewStepsClient,
    cmd: VolunteerCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        VolunteerCommands::List { status } => {
            let volunteers = client.list_volunteers(status).await?;
            output::print_volunteers(&volunteers, config);
        }
        VolunteerCommands::Status { id, status } => {
            let volunteer = client.update_volunteer_status(&id, status).await?;
            output::print_volunteer(&volunteer, config);
        }
    }
    Ok(())
}
