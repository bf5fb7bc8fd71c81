use crate::cli::{DataArgs, DataCommands};
use crate::config::models::AppConfig;
use crate::data::{DataManager, DataProgress};
use crate::error::Result;
use crate::utils::progress::download_bar;
use std::path::PathBuf;
use tracing::info;

pub async fn run(args: DataArgs, config: &AppConfig) -> Result<()> {
    match args.command {
        DataCommands::Path => handle_path(),
        DataCommands::SetPath { path } => handle_set_path(path),
        DataCommands::ResetPath => handle_reset_path(),
        DataCommands::Fetch { file, force } => {
            handle_fetch(&config.remote_url, &file, force).await
        }
    }
}

fn handle_path() -> Result<()> {
    let manager = DataManager::new()?;
    println!("{}", manager.get_data_path().display());
    Ok(())
}

fn handle_set_path(path: PathBuf) -> Result<()> {
    DataManager::set_custom_path(&path)?;
    info!("Data path set to {:?}", &path);
    println!("✓ Data path set to: {}", path.display());
    Ok(())
}

fn handle_reset_path() -> Result<()> {
    DataManager::reset_path()?;
    let manager = DataManager::new()?;
    println!(
        "✓ Data path reset to default: {}",
        manager.get_data_path().display()
    );
    Ok(())
}

async fn handle_fetch(remote_url: &str, file: &str, force: bool) -> Result<()> {
    let manager = DataManager::new()?;
    println!(
        "Fetching '{}' into: {}",
        file,
        manager.get_data_path().display()
    );

    let pb = download_bar();
    let progress_callback = |progress: DataProgress| match progress {
        DataProgress::DownloadStarted { total_size } => {
            if let Some(size) = total_size {
                pb.set_length(size);
            }
            pb.set_message("Downloading...");
        }
        DataProgress::Downloading { downloaded } => pb.set_position(downloaded),
    };

    match manager
        .fetch_file(remote_url, file, force, progress_callback)
        .await
    {
        Ok(path) => {
            pb.finish_with_message("✓ Download complete.");
            println!("✓ Saved to: {}", path.display());
            Ok(())
        }
        Err(e) => {
            pb.finish_with_message("✗ Download failed.");
            Err(e)
        }
    }
}
