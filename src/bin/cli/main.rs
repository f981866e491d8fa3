mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::NewStepsClient;
use newsteps::config;
use output::{OutputConfig, OutputFormat};
use std::process;

/// Admin CLI for the New Steps donation service
#[derive(Parser, Debug)]
#[clap(name = "newsteps-cli", about = "Admin CLI for the New Steps Project")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "NEWSTEPS_URL", global = true)]
    server_url: Option<String>,

    /// Session token from `newsteps-cli auth login`
    #[clap(long, env = "NEWSTEPS_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or tokens)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and inspect the current session
    #[command(subcommand)]
    Auth(commands::auth::AuthCommands),
    /// Manage shoe inventory
    #[command(subcommand)]
    Shoe(commands::shoe::ShoeCommands),
    /// Review and process donations
    #[command(subcommand)]
    Donation(commands::donation::DonationCommands),
    /// Review and fulfil orders
    #[command(subcommand)]
    Order(commands::order::OrderCommands),
    /// Manage volunteer sign-ups
    #[command(subcommand)]
    Volunteer(commands::volunteer::VolunteerCommands),
    /// Manage site settings
    #[command(subcommand)]
    Setting(commands::setting::SettingCommands),
    /// Inspect the email outbox
    #[command(subcommand)]
    Email(commands::email::EmailCommands),
    /// Manage accounts
    #[command(subcommand)]
    User(commands::user::UserCommands),
    /// Show dashboard counts
    Stats,
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > http://localhost:3000
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    if let Some(dir) = config::get_config_dir_path() {
        let config_path = dir.join("config.toml");
        if let Ok(update) = config::config_from_file(Some(config_path)) {
            if let Some(url) = update.server_url {
                return url;
            }
        }
    }

    "http://localhost:3000".to_string()
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!(
            "Could not connect to server. Is the newsteps server running?\n  {}",
            err_string
        );
    }

    // ClientError::Server already reads "Server error (STATUS): message"
    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = NewStepsClient::new(server_url, cli.token);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Auth(cmd) => commands::auth::execute(&client, cmd, &output_config).await,
        Commands::Shoe(cmd) => commands::shoe::execute(&client, cmd, &output_config).await,
        Commands::Donation(cmd) => commands::donation::execute(&client, cmd, &output_config).await,
        Commands::Order(cmd) => commands::order::execute(&client, cmd, &output_config).await,
        Commands::Volunteer(cmd) => commands::volunteer::execute(&client, cmd, &output_config).await,
        Commands::Setting(cmd) => commands::setting::execute(&client, cmd, &output_config).await,
        Commands::Email(cmd) => commands::email::execute(&client, cmd, &output_config).await,
        Commands::User(cmd) => commands::user::execute(&client, cmd, &output_config).await,
        Commands::Stats => match client.stats().await {
            Ok(stats) => {
                output::print_stats(&stats, &output_config);
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
