use crate::cli::{ArchiveArgs, ArchiveCommands};
use crate::config::models::AppConfig;
use crate::data::{DataManager, DataProgress};
use crate::error::{CliError, Result};
use crate::utils::output::emit_table;
use crate::utils::progress::download_bar;
use odorkit::core::archive::store::ArchiveStore;
use odorkit::core::archive::validation::{Severity, ValidationReport};
use odorkit::core::models::table::Table;
use tracing::{debug, info};

pub async fn run(args: ArchiveArgs, config: &AppConfig) -> Result<()> {
    let manager = DataManager::new()?;
    info!("Using archive store at {:?}", manager.get_data_path());
    dispatch(args.command, &manager, &config.remote_url).await
}

async fn dispatch(
    command: ArchiveCommands,
    manager: &DataManager,
    remote_url: &str,
) -> Result<()> {
    let store = manager.store();
    match command {
        ArchiveCommands::List => handle_list(&store),
        ArchiveCommands::Show { name } => handle_show(&store, &name),
        ArchiveCommands::Validate { name } => {
            let report = store.validate(&name)?;
            print_report(&report);
            check_report(&report)
        }
        ArchiveCommands::Head { file, rows, index } => {
            let table = load_head_table(manager, remote_url, &file, &index).await?;
            emit_table(&table.head(rows), None)
        }
    }
}

/// Loads an archive table, downloading it from the remote repository first when
/// there is no local copy. An empty `index` keeps the file's conventional index.
async fn load_head_table(
    manager: &DataManager,
    remote_url: &str,
    file: &str,
    index: &[String],
) -> Result<Table> {
    let store = manager.store();
    if store.resolve(file)?.is_file() {
        debug!("Reading local copy of '{}'", file);
    } else {
        info!("'{}' is not available locally, fetching it from {}", file, remote_url);
        fetch_missing(manager, remote_url, file).await?;
    }

    if index.is_empty() {
        Ok(store.load_table(file)?)
    } else {
        let index: Vec<&str> = index.iter().map(String::as_str).collect();
        Ok(store.load_table_with_index(file, &index)?)
    }
}

async fn fetch_missing(manager: &DataManager, remote_url: &str, file: &str) -> Result<()> {
    let pb = download_bar();
    let progress_callback = |progress: DataProgress| match progress {
        DataProgress::DownloadStarted { total_size } => {
            if let Some(size) = total_size {
                pb.set_length(size);
            }
            pb.set_message(format!("Fetching {}...", file));
        }
        DataProgress::Downloading { downloaded } => pb.set_position(downloaded),
    };
    let fetched = manager
        .fetch_file(remote_url, file, false, progress_callback)
        .await;
    match fetched {
        Ok(_) => {
            pb.finish_and_clear();
            Ok(())
        }
        Err(e) => {
            pb.finish_with_message("✗ Download failed.");
            Err(e)
        }
    }
}

fn handle_list(store: &ArchiveStore) -> Result<()> {
    let archives = store.list_archives()?;
    if archives.is_empty() {
        println!("No archives found in {}", store.root().display());
    }
    for archive in archives {
        println!("{}", archive);
    }
    Ok(())
}

fn handle_show(store: &ArchiveStore, name: &str) -> Result<()> {
    let manifest = store.load_manifest(name)?;
    println!("Archive: {}", name);
    if let Some(title) = &manifest.source.title {
        println!("  Title: {}", title);
    }
    if let Some(doi) = &manifest.source.doi {
        println!("  DOI:   {}", doi);
    }
    if let Some(url) = &manifest.source.url {
        println!("  URL:   {}", url);
    }

    let raw: Vec<_> = manifest.raw_files().collect();
    if !raw.is_empty() {
        println!("Source files:");
        for (file, description) in raw {
            println!("  {:<24} {}", file, description);
        }
    }

    let processed = store.show_files(name)?;
    if processed.is_empty() {
        println!("No processed files listed.");
    } else {
        println!("Processed files:");
        for (file, description) in processed {
            println!("  {:<24} {}", file, description);
        }
    }
    Ok(())
}

fn print_report(report: &ValidationReport) {
    for issue in &report.issues {
        let label = match issue.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!("  [{}] {}", label, issue);
    }
}

fn check_report(report: &ValidationReport) -> Result<()> {
    let errors = report.errors().count();
    if errors > 0 {
        return Err(CliError::Data(format!(
            "Archive '{}' failed validation with {} error(s).",
            report.archive, errors
        )));
    }
    println!(
        "✓ Archive '{}' is valid ({} warning(s)).",
        report.archive,
        report.warnings().count()
    );
    Ok(())
}
