use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use newsteps::config::{self, CliArgs, Config};
use newsteps::{create_app, db, notify, repo, run_migrations, AppState};

/// Sets up logging to stdout and, when a log directory is configured, to a
/// daily rolling file
///
/// The returned guard flushes the file writer and must live until shutdown.
fn init_tracing(config: &Config, debug: bool) -> Option<WorkerGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("newsteps={},tower_http={}", default_level, default_level)));

    let stdout_layer = if config.json_logs {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "newsteps.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}

/// Waits for Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Could not listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Could not listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Periodically delivers queued email and clears expired sessions
async fn run_background_jobs(state: Arc<AppState>) {
    let mut ticker = tokio::time::interval(state.config.email_flush_interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if let Err(e) = notify::flush_outbox(&state.pool, &state.mailer).await {
            warn!("Outbox flush failed: {:#}", e);
        }
        match repo::purge_expired_sessions(&state.pool).await {
            Ok(0) => {}
            Ok(purged) => info!("Purged {} expired sessions", purged),
            Err(e) => warn!("Session purge failed: {:#}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    if dotenv::dotenv().is_ok() {
        println!("Loaded .env file");
    }

    let args = CliArgs::parse();
    let config = config::get_config(&args);
    let _log_guard = init_tracing(&config, args.debug);

    info!("Starting New Steps server");

    // Initialize the database pool
    let pool = db::init_pool(&config.database_url)?;
    {
        let mut conn = pool.get().context("Failed to get a database connection")?;
        run_migrations(&mut conn)?;
    }

    if let Some(email) = &args.bootstrap_admin_email {
        let admin = repo::ensure_admin(&pool, email, args.bootstrap_admin_password.as_deref())
            .await
            .context("Failed to bootstrap the admin account")?;
        info!("Admin account ready: {}", admin.get_email());
    }

    let state = Arc::new(AppState::new(pool, config));
    state
        .storage
        .init()
        .await
        .with_context(|| format!("Failed to create upload directory {:?}", state.config.upload_dir))?;

    if !state.mailer.is_live() {
        warn!("No email API configured; outgoing email will only be logged");
    }

    let jobs = tokio::spawn(run_background_jobs(state.clone()));

    let app = create_app(state.clone());
    let listener = tokio::net::TcpListener::bind(&state.config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", state.config.bind_address))?;
    info!("Listening on {}", state.config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    jobs.abort();

    // Deliver whatever is still queued before exiting
    if let Err(e) = notify::flush_outbox(&state.pool, &state.mailer).await {
        warn!("Final outbox flush failed: {:#}", e);
    }

    info!("Server stopped");
    Ok(())
}
