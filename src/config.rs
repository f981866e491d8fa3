use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use tracing::{info, warn};

/// File name of the database created in the data directory by default
const DEFAULT_DATABASE_FILE: &str = "newsteps.db";

/// Directory name for uploaded files inside the data directory
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Configuration for the New Steps server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// Public base URL of the site, used in links inside emails
    pub public_url: String,
    /// Directory holding uploaded images
    pub upload_dir: PathBuf,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
    /// Lifetime of a login session in hours
    pub session_ttl_hours: i64,
    /// Most pairs a recipient may request in a single order
    pub max_items_per_order: i32,
    /// HTTP endpoint of the transactional email provider; emails are only logged when unset
    pub email_api_url: Option<String>,
    /// Bearer key for the email provider
    pub email_api_key: Option<String>,
    /// Sender address for outgoing email
    pub email_from: String,
    /// Address that receives admin notifications (new orders, volunteers)
    pub admin_email: Option<String>,
    /// Seconds between outbox delivery runs
    pub email_flush_interval_seconds: u64,
    /// Origins allowed by CORS; empty allows any origin
    pub cors_origins: Vec<String>,
    /// Directory for rolling log files; logs only go to stdout when unset
    pub log_dir: Option<PathBuf>,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfigUpdate {
    pub database_url: Option<String>,
    pub bind_address: Option<String>,
    pub public_url: Option<String>,
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
    pub session_ttl_hours: Option<i64>,
    pub max_items_per_order: Option<i32>,
    pub email_api_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: Option<String>,
    pub admin_email: Option<String>,
    pub email_flush_interval_seconds: Option<u64>,
    pub cors_origins: Option<Vec<String>>,
    pub log_dir: Option<PathBuf>,
    pub json_logs: Option<bool>,
    /// Server URL the CLI talks to; ignored by the server
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "newsteps", about = "New Steps Project donation-matching server")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:8080
    #[clap(long, env = "NEWSTEPS_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Public base URL used in email links
    #[clap(long, env = "NEWSTEPS_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Directory for uploaded images
    #[clap(long, env = "NEWSTEPS_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Largest accepted upload in bytes
    #[clap(long, env = "NEWSTEPS_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,

    /// Session lifetime in hours
    #[clap(long, env = "NEWSTEPS_SESSION_TTL_HOURS")]
    pub session_ttl_hours: Option<i64>,

    /// Most pairs per order
    #[clap(long, env = "NEWSTEPS_MAX_ITEMS_PER_ORDER")]
    pub max_items_per_order: Option<i32>,

    /// Email provider endpoint
    #[clap(long, env = "NEWSTEPS_EMAIL_API_URL")]
    pub email_api_url: Option<String>,

    /// Email provider key
    #[clap(long, env = "NEWSTEPS_EMAIL_API_KEY", hide_env_values = true)]
    pub email_api_key: Option<String>,

    /// Sender address
    #[clap(long, env = "NEWSTEPS_EMAIL_FROM")]
    pub email_from: Option<String>,

    /// Admin notification address
    #[clap(long, env = "NEWSTEPS_ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Seconds between outbox delivery runs
    #[clap(long, env = "NEWSTEPS_EMAIL_FLUSH_INTERVAL_SECONDS")]
    pub email_flush_interval_seconds: Option<u64>,

    /// Allowed CORS origins, comma separated
    #[clap(long, env = "NEWSTEPS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Directory for rolling log files
    #[clap(long, env = "NEWSTEPS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[clap(long, env = "NEWSTEPS_JSON_LOGS")]
    pub json_logs: Option<bool>,

    /// Create (or promote) this account as an admin at startup
    #[clap(long, env = "NEWSTEPS_BOOTSTRAP_ADMIN_EMAIL")]
    pub bootstrap_admin_email: Option<String>,

    /// Password for the bootstrap admin when the account has to be created
    #[clap(long, env = "NEWSTEPS_BOOTSTRAP_ADMIN_PASSWORD", hide_env_values = true)]
    pub bootstrap_admin_password: Option<String>,

    /// Debug mode
    #[clap(long, env = "NEWSTEPS_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            public_url: update.public_url.unwrap_or(self.public_url),
            upload_dir: update.upload_dir.unwrap_or(self.upload_dir),
            max_upload_bytes: update.max_upload_bytes.unwrap_or(self.max_upload_bytes),
            session_ttl_hours: update.session_ttl_hours.unwrap_or(self.session_ttl_hours),
            max_items_per_order: update.max_items_per_order.unwrap_or(self.max_items_per_order),
            email_api_url: update.email_api_url.or(self.email_api_url),
            email_api_key: update.email_api_key.or(self.email_api_key),
            email_from: update.email_from.unwrap_or(self.email_from),
            admin_email: update.admin_email.or(self.admin_email),
            email_flush_interval_seconds: update
                .email_flush_interval_seconds
                .unwrap_or(self.email_flush_interval_seconds),
            cors_origins: update.cors_origins.unwrap_or(self.cors_origins),
            log_dir: update.log_dir.or(self.log_dir),
            json_logs: update.json_logs.unwrap_or(self.json_logs),
        }
    }

    /// Returns the session lifetime as a chrono Duration
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }

    /// Returns the outbox delivery interval as a Duration
    pub fn email_flush_interval(&self) -> Duration {
        Duration::from_secs(self.email_flush_interval_seconds.max(1))
    }
}

/// Returns the base (default) configuration
///
/// When a data directory is known, the database and uploads live inside it;
/// otherwise they are created relative to the working directory.
pub fn base_config(data_path: Option<PathBuf>) -> Config {
    let (database_url, upload_dir) = match data_path {
        Some(path) => (
            path.join(DEFAULT_DATABASE_FILE).to_string_lossy().to_string(),
            path.join(DEFAULT_UPLOAD_DIR),
        ),
        None => (DEFAULT_DATABASE_FILE.to_string(), PathBuf::from(DEFAULT_UPLOAD_DIR)),
    };

    Config {
        database_url,
        bind_address: "127.0.0.1:3000".to_string(),
        public_url: "http://localhost:3000".to_string(),
        upload_dir,
        max_upload_bytes: 5 * 1024 * 1024,
        session_ttl_hours: 24 * 7,
        max_items_per_order: 2,
        email_api_url: None,
        email_api_key: None,
        email_from: "New Steps Project <no-reply@newstepsproject.org>".to_string(),
        admin_email: None,
        email_flush_interval_seconds: 30,
        cors_origins: Vec::new(),
        log_dir: None,
        json_logs: false,
    }
}

/// Loads configuration from a TOML file
///
/// A missing file is not an error; it yields an empty update.
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            },
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: &CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url.clone(),
        bind_address: args.bind_address.clone(),
        public_url: args.public_url.clone(),
        upload_dir: args.upload_dir.clone(),
        max_upload_bytes: args.max_upload_bytes,
        session_ttl_hours: args.session_ttl_hours,
        max_items_per_order: args.max_items_per_order,
        email_api_url: args.email_api_url.clone(),
        email_api_key: args.email_api_key.clone(),
        email_from: args.email_from.clone(),
        admin_email: args.admin_email.clone(),
        email_flush_interval_seconds: args.email_flush_interval_seconds,
        cors_origins: (!args.cors_origins.is_empty()).then(|| args.cors_origins.clone()),
        log_dir: args.log_dir.clone(),
        json_logs: args.json_logs,
        server_url: None,
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    let dirs = ProjectDirs::from("org", "newstepsproject", "newsteps");
    if dirs.is_none() {
        warn!("Could not determine platform directories, skipping config file");
    }
    dirs
}

/// Returns the directory holding `config.toml`, if the platform has one
pub fn get_config_dir_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the data directory if it exists
fn get_data_dir_path() -> Option<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                info!("Data directory not found at {:?}, using working directory", path);
            }
            exists
        })
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: &CliArgs) -> Config {
    let config_file = get_config_dir_path().map(|dir| dir.join("config.toml"));

    let base = base_config(get_data_dir_path());

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(config_from_file(config_file).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, bind_address={}, upload_dir={:?}, email_delivery={}",
        config.database_url,
        config.bind_address,
        config.upload_dir,
        if config.email_api_url.is_some() { "http" } else { "log-only" }
    );

    config
}
