use pagerctl::console;
use pagerctl::error::ConsoleError;
use pagerctl::logger::initialize as LoggerInitialize;

use client_core::CONTROLLER_DEFAULT_URL;
use client_core::connection::{ClientConfig, start_client};
use client_core::credentials::CredentialStore;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::PathBuf;
use std::process::ExitCode;

use log::info;

/// Environment override for the controller endpoint.
const ENDPOINT_ENV: &str = "PAGERCTL_URL";

/// Environment override for the credential directory.
const CONFIG_DIR_ENV: &str = "PAGERCTL_CONFIG_DIR";

/// Environment override for the log directory.
const LOG_DIR_ENV: &str = "PAGERCTL_LOG_DIR";

/// Subdirectory of the credential directory holding the log file.
const LOG_DIR_NAME: &str = "logs";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pagerctl: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ConsoleError> {
    // A .env file can supply the endpoint and directory overrides
    let _ = dotenvy::dotenv();

    let endpoint = resolve_endpoint();
    let config_dir = resolve_config_dir()?;
    let log_dir = resolve_log_dir(&config_dir);

    // Ensure log directory exists
    create_dir_all(&log_dir).map_err(|e| ConsoleError::Console {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;

    info!("pagerctl starting");

    let config = ClientConfig::new(&endpoint)?;
    info!("Controller endpoint: {}", config.endpoint());
    info!("Credential directory: {}", config_dir.display());

    let store = CredentialStore::new(&config_dir);
    let handle = start_client(config, store.clone()).await;

    console::run(handle, store).await
}

/// Endpoint precedence: first argument, then the environment, then the
/// compiled-in default.
fn resolve_endpoint() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ENDPOINT_ENV).ok())
        .unwrap_or_else(|| String::from(CONTROLLER_DEFAULT_URL))
}

fn resolve_config_dir() -> Result<PathBuf, ConsoleError> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    CredentialStore::default_dir().ok_or_else(|| ConsoleError::Console {
        message: String::from("No user configuration directory available"),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn resolve_log_dir(config_dir: &std::path::Path) -> PathBuf {
    match std::env::var(LOG_DIR_ENV) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => config_dir.join(LOG_DIR_NAME),
    }
}
