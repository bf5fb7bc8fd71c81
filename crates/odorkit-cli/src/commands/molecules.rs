use crate::cli::MoleculesArgs;
use crate::config::models::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::output::{emit_table, read_input_column};
use crate::utils::progress::CliProgressHandler;
use odorkit::core::models::ids::Cid;
use odorkit::engine::error::EngineError;
use odorkit::engine::progress::ProgressReporter;
use odorkit::engine::pubchem::PubChemClient;
use odorkit::workflows;
use tracing::{info, warn};

pub async fn run(args: MoleculesArgs, config: &AppConfig) -> Result<()> {
    let cids = collect_cids(&args)?;
    if cids.is_empty() {
        return Err(CliError::Argument("No CIDs to fetch.".to_string()));
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the molecules workflow for {} CID(s)...", cids.len());
    let set = tokio::task::block_in_place(|| -> Result<_> {
        let client = PubChemClient::new(&config.lookup).map_err(EngineError::from)?;
        Ok(workflows::molecules::run(
            &cids,
            &client,
            config.lookup.batch_size,
            &reporter,
        )?)
    })?;

    if !set.missing.is_empty() {
        let missing: Vec<String> = set.missing.iter().map(Cid::to_string).collect();
        warn!("No record found for CID(s): {}", missing.join(", "));
        eprintln!(
            "Warning: no record found for {} CID(s): {}",
            missing.len(),
            missing.join(", ")
        );
    }
    emit_table(&set.table, args.output.as_deref())
}

fn collect_cids(args: &MoleculesArgs) -> Result<Vec<Cid>> {
    let mut cids = args.cids.clone();
    if let Some(path) = &args.input {
        for value in read_input_column(path, &args.column)? {
            if value.trim().is_empty() {
                continue;
            }
            let cid = value.parse::<Cid>().map_err(|e| {
                CliError::Argument(format!("{} (in {})", e, path.display()))
            })?;
            cids.push(cid);
        }
    }
    Ok(cids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(input: Option<std::path::PathBuf>) -> MoleculesArgs {
        MoleculesArgs {
            cids: vec![Cid::new(7410).unwrap()],
            input,
            column: "CID".to_string(),
            output: None,
        }
    }

    #[test]
    fn blank_cells_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stimuli.csv");
        fs::write(&path, "Stimulus,CID\n1,1183\n2,\n3,440917\n").unwrap();

        let cids = collect_cids(&args(Some(path))).unwrap();
        let values: Vec<u64> = cids.into_iter().map(Cid::get).collect();
        assert_eq!(values, vec![7410, 1183, 440917]);
    }

    #[test]
    fn non_numeric_cells_are_argument_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stimuli.csv");
        fs::write(&path, "Stimulus,CID\n1,vanillin\n").unwrap();

        assert!(matches!(
            collect_cids(&args(Some(path))),
            Err(CliError::Argument(_))
        ));
    }
}
