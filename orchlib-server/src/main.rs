//! orchlib-server - orchestra sheet-music library service
//!
//! Serves the loan tracker API, runs the daily reminder job, and with
//! `--run-reminders` runs that job once and exits (for external cron).

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use orchlib_common::api::auth::load_api_token;
use orchlib_common::config::{resolve_root_folder, LibraryConfig};
use orchlib_common::db::init::init_database;
use orchlib_server::services::run_reminders;
use orchlib_server::{build_router, notify, scheduler, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ROOT_FOLDER_ENV: &str = "ORCHLIB_ROOT_FOLDER";

/// Command-line arguments for orchlib-server
#[derive(Parser, Debug)]
#[command(name = "orchlib-server")]
#[command(about = "Sheet-music library loan tracker")]
#[command(version)]
struct Args {
    /// Root folder holding the database and config file
    #[arg(short, long, env = ROOT_FOLDER_ENV)]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "ORCHLIB_PORT")]
    port: Option<u16>,

    /// Config file (default: <root>/orchlib.toml)
    #[arg(short, long, env = "ORCHLIB_CONFIG")]
    config: Option<PathBuf>,

    /// Run the reminder job once and exit
    #[arg(long)]
    run_reminders: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "orchlib_server=info,orchlib_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any slow startup work
    info!(
        "Starting orchlib-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV);
    info!("Root folder: {}", root_folder.display());

    let config = LibraryConfig::load(args.config.as_deref(), &root_folder)
        .context("Failed to load configuration")?;

    let db_path = config.database_path(&root_folder);
    let db = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let notifier =
        notify::from_config(&config.email).context("Failed to set up email delivery")?;

    if args.run_reminders {
        let report = run_reminders(&db, notifier.as_ref(), orchlib_common::time::now())
            .await
            .context("Reminder run failed")?;
        info!(
            "Reminder run complete: {} due, {} sent, {} failed, {} skipped",
            report.due, report.sent, report.failed, report.skipped
        );
        return Ok(());
    }

    let api_token = if !config.auth.enabled {
        warn!("API authentication disabled ([auth] enabled = false)");
        None
    } else if let Some(token) = config.auth.api_token.clone() {
        info!("Using API token from config file");
        Some(token)
    } else {
        let token = load_api_token(&db)
            .await
            .context("Failed to load API token")?;
        info!("Using API token from the settings table");
        Some(token)
    };

    if config.scheduler.enabled {
        let run_at = config.scheduler.run_at_time()?;
        tokio::spawn(scheduler::run_daily(db.clone(), notifier.clone(), run_at));
        info!("Daily reminder job scheduled at {}", run_at.format("%H:%M"));
    } else {
        info!("Daily reminder job disabled");
    }

    let state = AppState::new(db, notifier, api_token)
        .with_date_format(config.display.date_format.clone());
    let app = build_router(state);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid server.host '{}'", config.server.host))?;
    let addr = SocketAddr::new(host, args.port.unwrap_or(config.server.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("orchlib-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
