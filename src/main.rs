mod analyzer;
mod cli;
mod config;
mod model;
mod normalizer;
mod parser;
mod report;
mod storage;
mod utils;

use cli::Menu;
use config::{apply_env_overrides, load_config, resolve_access_token, AppConfig, Backend, DEFAULT_CONFIG_PATH};
use std::io::{self, ErrorKind};
use storage::{RecordStore, SheetsStore, SqliteStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging on stderr so it stays out of the prompts
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    // Load configuration from file, then environment overrides
    let config_path = std::env::var("PT_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match load_config(&config_path) {
        Ok(mut cfg) => match apply_env_overrides(&mut cfg, |key| std::env::var(key).ok()) {
            Ok(()) => cfg,
            Err(e) => {
                error!("Config error: {}", e);
                eprintln!("Configuration error: {}", e);
                return;
            }
        },
        Err(e) => {
            error!("Config load error: {}", e);
            eprintln!("Configuration error: {}", e);
            return;
        }
    };

    // The store is opened once and lent to the menu for the whole session
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            eprintln!("Could not open the record store: {}", e);
            return;
        }
    };

    let menu = Menu::new(store.as_ref(), config.export_dir.clone());
    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    match menu.run(&mut input, &mut output) {
        Ok(()) => info!("Session finished"),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => info!("Input closed, exiting"),
        Err(e) => error!("Console error: {}", e),
    }
}

fn open_store(config: &AppConfig) -> Result<Box<dyn RecordStore>, Box<dyn std::error::Error>> {
    match config.backend {
        Backend::Sqlite => {
            info!("Using SQLite store at {}", config.sqlite_path);
            Ok(Box::new(SqliteStore::new(&config.sqlite_path)?))
        }
        Backend::Sheets => {
            let token = resolve_access_token(&config.sheets, |key| std::env::var(key).ok())?;
            Ok(Box::new(SheetsStore::connect(&config.sheets, token)?))
        }
    }
}
