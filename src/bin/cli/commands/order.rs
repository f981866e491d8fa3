use clap::Subcommand;
use newsteps::models::OrderStatus;

use crate::client::NewStepsClient;
use crate::output::{self, OutputConfig};

/// Order commands
#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// List orders, newest first
    List {
        /// Only orders with this status
        #[clap(long)]
        status: Option<OrderStatus>,
    },
    /// Get a specific order by ID
    Get {
        /// The order ID
        id: String,
    },
    /// Move an order to a new status
    Status {
        /// The order ID
        id: String,
        /// confirmed, shipped, delivered, or cancelled
        status: OrderStatus,
        /// Note recorded in the order's history, e.g. a tracking number
        #[clap(long)]
        note: Option<String>,
    },
}

/// Executes an order command
pub async fn execute(
    client: &NewStepsClient,
    cmd: OrderCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        OrderCommands::List { status } => {
            let orders = client.list_orders(status).await?;
            output::print_orders(&orders, config);
        }
        OrderCommands::Get { id } => {
            let order = client.get_order(&id).await?;
            output::print_order(&order, config);
        }
        OrderCommands::Status { id, status, note } => {
            let order = client.update_order_status(&id, status, note).await?;
            output::print_order(&order, config);
        }
    }
    Ok(())
}
