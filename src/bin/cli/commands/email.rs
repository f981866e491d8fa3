use clap::Subcommand;
use newsteps::models::EmailStatus;

use crate::client::NewStepsClient;
use crate::output::{self, OutputConfig};

/// Email outbox commands
#[derive(Subcommand, Debug)]
pub enum EmailCommands {
    /// Send a test email now
    Test {
        /// Recipient address
        to: String,
    },
    /// List outbox emails, newest first
    List {
        /// Only emails with this status (pending, sent, failed)
        #[clap(long)]
        status: Option<EmailStatus>,
        /// Most emails to show
        #[clap(long)]
        limit: Option<i64>,
    },
}

/// Executes an email command
pub async fn execute(
    client: &NewStepsClient,
    cmd: EmailCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        EmailCommands::Test { to } => {
            let message = client.send_test_email(to).await?;
            output::print_message(&message, config);
        }
        EmailCommands::List { status, limit } => {
            let emails = client.list_emails(status, limit).await?;
            output::print_emails(&emails, config);
        }
    }
    Ok(())
}
