use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use facilitydesk::cli::{self, Cli};
use facilitydesk::{AppConfig, AppState};
use facilitydesk_auth::SystemClock;
use facilitydesk_core::AppError;
use facilitydesk_store::LocalFileStore;
use tracing::error;

fn main() -> ExitCode {
    dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }

    facilitydesk_observability::init_tracing(&config.storage.log_dir());

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = %e.kind, error = %e, "Command failed");
            eprintln!("❌ {}", e);
            ExitCode::from(e.kind.exit_code() as u8)
        }
    }
}

fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    let store = Arc::new(LocalFileStore::new(&config.storage.data_dir));
    let mut state = AppState::bootstrap(store, Arc::new(SystemClock), config)?;
    cli::run(&mut state, cli)
}
