use clap::Subcommand;

use crate::client::NewStepsClient;
use crate::output::{self, OutputConfig};

/// Site setting commands
#[derive(Subcommand, Debug)]
pub enum SettingCommands {
    /// List all settings
    List,
    /// Show one setting
    Get {
        /// The setting key
        key: String,
    },
    /// Write a setting
    Set {
        /// The setting key
        key: String,
        /// The value; parsed as JSON when possible, otherwise stored as a string
        value: String,
    },
    /// Delete a setting
    Delete {
        /// The setting key
        key: String,
    },
}

/// Interprets a command-line value as JSON, falling back to a plain string
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// Executes a setting command
pub async fn execute(
    client: &NewStepsClient,
    cmd: SettingCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        SettingCommands::List => {
            let settings = client.list_settings().await?;
            output::print_settings(&settings, config);
        }
        SettingCommands::Get { key } => {
            let setting = client.get_setting(&key).await?;
            output::print_setting(&setting, config);
        }
        SettingCommands::Set { key, value } => {
            let setting = client.put_setting(&key, parse_value(&value)).await?;
            output::print_setting(&setting, config);
        }
        SettingCommands::Delete { key } => {
            let message = client.delete_setting(&key).await?;
            output::print_message(&message, config);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(r#"{"year": 2019}"#), json!({"year": 2019}));
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("Our story"), json!("Our story"));
    }
}
