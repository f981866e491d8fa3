use clap::Subcommand;
use newsteps::dto::{CreateShoeDto, ShoeQueryDto, UpdateShoeDto};
use newsteps::models::ShoeStatus;

use crate::client::NewStepsClient;
use crate::output::{self, OutputConfig};

/// Shoe inventory commands
#[derive(Subcommand, Debug)]
pub enum ShoeCommands {
    /// List shoes with optional filters
    List {
        /// Only shoes with this status (available, out_of_stock, hidden)
        #[clap(long)]
        status: Option<ShoeStatus>,
        #[clap(long)]
        gender: Option<String>,
        /// Size to include; repeat for several
        #[clap(long)]
        size: Vec<String>,
        #[clap(long)]
        sport: Option<String>,
        #[clap(long)]
        brand: Option<String>,
        /// Text to look for in name, brand, or description
        #[clap(long)]
        search: Option<String>,
        /// Include hidden items
        #[clap(long)]
        all: bool,
    },
    /// Get a specific shoe by ID
    Get {
        /// The shoe ID
        id: String,
    },
    /// Add a shoe to inventory
    Create {
        #[clap(long)]
        name: String,
        #[clap(long)]
        brand: String,
        #[clap(long)]
        gender: String,
        #[clap(long)]
        size: String,
        #[clap(long)]
        sport: String,
        #[clap(long, default_value = "Good")]
        condition: String,
        #[clap(long)]
        description: Option<String>,
        /// Key of an uploaded image
        #[clap(long)]
        image_key: Option<String>,
        /// Pairs on hand
        #[clap(long, default_value_t = 1)]
        quantity: i32,
        /// Keep the item out of the public catalog
        #[clap(long)]
        hidden: bool,
        /// ID of the donation the shoes came from
        #[clap(long)]
        donation_id: Option<String>,
    },
    /// Edit a shoe; only the given fields change
    Update {
        /// The shoe ID
        id: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        brand: Option<String>,
        #[clap(long)]
        gender: Option<String>,
        #[clap(long)]
        size: Option<String>,
        #[clap(long)]
        sport: Option<String>,
        #[clap(long)]
        condition: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        image_key: Option<String>,
        #[clap(long)]
        quantity: Option<i32>,
    },
    /// Hide a shoe from the catalog, or show it again
    Hide {
        /// The shoe ID
        id: String,
        /// Make the shoe visible again
        #[clap(long)]
        show: bool,
    },
    /// Delete a shoe that no order refers to
    Delete {
        /// The shoe ID
        id: String,
    },
}

/// Executes a shoe command
pub async fn execute(
    client: &NewStepsClient,
    cmd: ShoeCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ShoeCommands::List { status, gender, size, sport, brand, search, all } => {
            let query = ShoeQueryDto {
                status,
                gender,
                size,
                sport,
                brand,
                search,
                include_hidden: all,
            };
            let shoes = client.list_shoes(&query).await?;
            output::print_shoes(&shoes, config);
        }
        ShoeCommands::Get { id } => {
            let shoe = client.get_shoe(&id).await?;
            output::print_shoe(&shoe, config);
        }
        ShoeCommands::Create {
            name,
            brand,
            gender,
            size,
            sport,
            condition,
            description,
            image_key,
            quantity,
            hidden,
            donation_id,
        } => {
            let dto = CreateShoeDto {
                name,
                brand,
                gender,
                size,
                sport,
                condition,
                description,
                image_key,
                quantity,
                hidden,
                donation_id,
            };
            let shoe = client.create_shoe(&dto).await?;
            output::print_shoe(&shoe, config);
        }
        ShoeCommands::Update {
            id,
            name,
            brand,
            gender,
            size,
            sport,
            condition,
            description,
            image_key,
            quantity,
        } => {
            let dto = UpdateShoeDto {
                name,
                brand,
                gender,
                size,
                sport,
                condition,
                description,
                image_key,
                quantity,
                hidden: None,
            };
            let shoe = client.update_shoe(&id, &dto).await?;
            output::print_shoe(&shoe, config);
        }
        ShoeCommands::Hide { id, show } => {
            let dto = UpdateShoeDto { hidden: Some(!show), ..Default::default() };
            let shoe = client.update_shoe(&id, &dto).await?;
            output::print_shoe(&shoe, config);
        }
        ShoeCommands::Delete { id } => {
            let message = client.delete_shoe(&id).await?;
            output::print_message(&message, config);
        }
    }
    Ok(())
}
