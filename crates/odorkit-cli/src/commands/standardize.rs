use crate::cli::StandardizeArgs;
use crate::config::models::AppConfig;
use crate::data::DataManager;
use crate::error::{CliError, Result};
use crate::utils::output::{emit_table, read_input};
use crate::utils::progress::CliProgressHandler;
use odorkit::core::archive::layout::StandardFile;
use odorkit::core::archive::store::ArchiveStore;
use odorkit::core::models::table::Table;
use odorkit::engine::error::EngineError;
use odorkit::engine::progress::ProgressReporter;
use odorkit::engine::pubchem::PubChemClient;
use odorkit::workflows;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub async fn run(args: StandardizeArgs, config: &AppConfig) -> Result<()> {
    info!("Initializing data manager...");
    let store = DataManager::new()?.store();
    let molecules_file = format!("{}/{}", args.archive, StandardFile::Molecules.file_name());
    let target = store.resolve(&molecules_file)?;
    if target.exists() && !args.force {
        return Err(CliError::Data(format!(
            "'{}' already exists. Use --force to overwrite.",
            target.display()
        )));
    }

    let index: Vec<&str> = args.index.iter().map(String::as_str).collect();
    info!("Loading input table from {:?}", &args.input);
    let table = read_input(&args.input, &index)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Standardizing {} row(s) from '{}'...", table.len(), args.column);
    let result = tokio::task::block_in_place(|| -> Result<_> {
        let client = PubChemClient::new(&config.lookup).map_err(EngineError::from)?;
        Ok(workflows::standardize::run(
            &table,
            &args.column,
            &client,
            &config.lookup,
            &reporter,
        )?)
    })?;

    let saved = save_molecules(&store, &args.archive, &result.molecules, &args.input)?;
    println!(
        "✓ {} molecule(s) written to: {}",
        result.molecules.len(),
        saved.display()
    );

    let unresolved = result.unresolved();
    if !unresolved.is_empty() {
        warn!("{} identifier(s) could not be resolved.", unresolved.len());
        println!("Unresolved identifier(s):");
        for entry in unresolved {
            println!("  '{}': {}", entry.identifier, entry.resolution);
        }
    }

    if let Some(path) = &args.annotated {
        emit_table(&result.annotated, Some(path))?;
    }
    Ok(())
}

/// Writes `molecules.csv` into the archive and lists it in the archive's manifest.
fn save_molecules(
    store: &ArchiveStore,
    archive: &str,
    molecules: &Table,
    input: &Path,
) -> Result<PathBuf> {
    let file_name = StandardFile::Molecules.file_name();
    let saved = store.save_table(molecules, &format!("{archive}/{file_name}"))?;
    let source = input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| input.display().to_string());
    store.register_processed(
        archive,
        &file_name,
        &format!("Molecules resolved from {source}"),
    )?;
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn molecules() -> Table {
        let mut table = Table::with_index("CID", &["name", "MolecularWeight"]).unwrap();
        table
            .push_row(
                odorkit::core::models::table::RowKey::from("7410"),
                vec!["acetophenone".to_string(), "120.15".to_string()],
            )
            .unwrap();
        table
    }

    #[test]
    fn saved_molecules_make_a_listed_and_valid_archive() {
        let dir = tempdir().unwrap();
        let store = ArchiveStore::new(dir.path());

        let saved = save_molecules(&store, "my_data", &molecules(), Path::new("/in/odors.csv"))
            .unwrap();

        assert!(saved.is_file());
        assert_eq!(store.list_archives().unwrap(), vec!["my_data"]);
        assert!(store.validate("my_data").unwrap().is_valid());
        let manifest = store.load_manifest("my_data").unwrap();
        assert_eq!(
            manifest.describe("molecules.csv"),
            Some("Molecules resolved from odors.csv")
        );
    }

    #[test]
    fn saving_again_keeps_the_rest_of_the_manifest() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("my_data");
        std::fs::create_dir_all(&archive).unwrap();
        std::fs::write(
            archive.join("manifest.toml"),
            "[source]\ntitle = \"My odorants\"\n",
        )
        .unwrap();
        let store = ArchiveStore::new(dir.path());

        save_molecules(&store, "my_data", &molecules(), Path::new("odors.csv")).unwrap();

        let manifest = store.load_manifest("my_data").unwrap();
        assert_eq!(manifest.source.title.as_deref(), Some("My odorants"));
        assert!(manifest.describe("molecules.csv").is_some());
    }
}
