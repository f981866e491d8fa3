use clap::Subcommand;
use newsteps::dto::DonationQueryDto;
use newsteps::models::{DonationKind, DonationStatus};

use crate::client::NewStepsClient;
use crate::output::{self, OutputConfig};

/// Donation commands
#[derive(Subcommand, Debug)]
pub enum DonationCommands {
    /// List donations, newest first
    List {
        /// Only donations with this status
        #[clap(long)]
        status: Option<DonationStatus>,
        /// Only shoe or money donations
        #[clap(long)]
        kind: Option<DonationKind>,
        /// Text to look for in donor name, email, or reference
        #[clap(long)]
        search: Option<String>,
    },
    /// Get a donation by ID or reference (DON-...)
    Get {
        /// The donation ID or reference
        id: String,
    },
    /// Move a donation to a new status
    Status {
        /// The donation ID
        id: String,
        /// received, processed, or cancelled
        status: DonationStatus,
        /// Note recorded in the donation's history
        #[clap(long)]
        note: Option<String>,
    },
}

/// Executes a donation command
pub async fn execute(
    client: &NewStepsClient,
    cmd: DonationCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        DonationCommands::List { status, kind, search } => {
            let donations = client.list_donations(&DonationQueryDto { status, kind, search }).await?;
            output::print_donations(&donations, config);
        }
        DonationCommands::Get { id } => {
            let donation = client.get_donation(&id).await?;
            output::print_donation(&donation, config);
        }
        DonationCommands::Status { id, status, note } => {
            let donation = client.update_donation_status(&id, status, note).await?;
            output::print_donation(&donation, config);
        }
    }
    Ok(())
}
