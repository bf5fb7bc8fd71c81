mod cli;
mod commands;
mod config;
mod data;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::config::builder::build_config;
use crate::data::DataManager;
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 odorkit CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let config_path = cli.config.clone().or_else(DataManager::default_config_file);
    if let Some(path) = &config_path {
        info!("Loading configuration from {:?}", path);
    }
    let app_config = build_config(config_path.as_deref(), &cli.set_values)?;

    let command_result = match cli.command {
        Commands::Resolve(args) => {
            info!("Dispatching to 'resolve' command.");
            commands::resolve::run(args, &app_config).await
        }
        Commands::Molecules(args) => {
            info!("Dispatching to 'molecules' command.");
            commands::molecules::run(args, &app_config).await
        }
        Commands::Standardize(args) => {
            info!("Dispatching to 'standardize' command.");
            commands::standardize::run(args, &app_config).await
        }
        Commands::Join(args) => {
            info!("Dispatching to 'join' command.");
            commands::join::run(args).await
        }
        Commands::Archive(args) => {
            info!("Dispatching to 'archive' command.");
            commands::archive::run(args, &app_config).await
        }
        Commands::Data(args) => {
            info!("Dispatching to 'data' command.");
            commands::data::run(args, &app_config).await
        }
    };

    match &command_result {
        Ok(()) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }
    command_result
}
