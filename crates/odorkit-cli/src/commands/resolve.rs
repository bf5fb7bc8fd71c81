use crate::cli::ResolveArgs;
use crate::config::models::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::output::{emit_table, read_input_column};
use crate::utils::progress::CliProgressHandler;
use odorkit::engine::error::EngineError;
use odorkit::engine::progress::ProgressReporter;
use odorkit::engine::pubchem::PubChemClient;
use odorkit::workflows;
use tracing::info;

pub async fn run(args: ResolveArgs, config: &AppConfig) -> Result<()> {
    let identifiers = collect_identifiers(&args)?;
    if identifiers.is_empty() {
        return Err(CliError::Argument("No identifiers to resolve.".to_string()));
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(
        "Invoking the resolve workflow for {} identifier(s)...",
        identifiers.len()
    );
    let report = tokio::task::block_in_place(|| -> Result<_> {
        let client = PubChemClient::new(&config.lookup).map_err(EngineError::from)?;
        Ok(workflows::resolve::run(
            &identifiers,
            args.kind,
            &client,
            &reporter,
        )?)
    })?;

    eprintln!(
        "Resolved {} of {} identifier(s): {} ambiguous, {} without a match.",
        report.resolved_count(),
        report.len(),
        report.ambiguous_count(),
        report.unmatched_count()
    );
    let table = report.to_table().map_err(EngineError::from)?;
    emit_table(&table, args.output.as_deref())
}

fn collect_identifiers(args: &ResolveArgs) -> Result<Vec<String>> {
    let mut identifiers = args.identifiers.clone();
    if let (Some(path), Some(column)) = (&args.input, &args.column) {
        info!("Reading identifiers from column '{}' of {:?}", column, path);
        identifiers.extend(read_input_column(path, column)?);
    }
    Ok(identifiers)
}
