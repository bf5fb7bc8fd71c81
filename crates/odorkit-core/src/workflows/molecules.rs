use crate::core::models::ids::Cid;
use crate::core::models::molecule::molecules_table;
use crate::core::models::table::Table;
use crate::engine::batch::fetch_in_batches;
use crate::engine::error::EngineError;
use crate::engine::lookup::CompoundLookup;
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeSet {
    pub table: Table,      // indexed by CID, one row per distinct CID found
    pub missing: Vec<Cid>, // CIDs the service returned no record for
}

/// Fetches descriptive records for `cids` in batches of `batch_size`.
#[instrument(skip_all, name = "molecules_workflow", fields(count = cids.len()))]
pub fn run<L: CompoundLookup + ?Sized>(
    cids: &[Cid],
    lookup: &L,
    batch_size: usize,
    reporter: &ProgressReporter,
) -> Result<MoleculeSet, EngineError> {
    let fetched = reporter.phase("Record Retrieval", || {
        fetch_in_batches(lookup, cids, batch_size, reporter)
    })?;

    if !fetched.missing.is_empty() {
        warn!(
            "No record found for {} CID(s): {:?}",
            fetched.missing.len(),
            fetched.missing
        );
    }
    let table = molecules_table(&fetched.records)?;
    info!(
        "Retrieved {} molecule record(s) in {} batch(es).",
        table.len(),
        fetched.batches
    );
    Ok(MoleculeSet {
        table,
        missing: fetched.missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::molecule::MOLECULE_COLUMNS;
    use crate::core::models::table::RowKey;
    use crate::engine::batch::BATCH_SIZE;
    use crate::engine::lookup::testing::{FakeLookup, cid};
    use std::collections::HashSet;

    #[test]
    fn every_requested_key_appears_exactly_once() {
        let mut lookup = FakeLookup::new();
        for value in 1..=301 {
            lookup = lookup.with_record(value, &format!("m{value}"));
        }
        let mut requested: Vec<Cid> = (1..=301).map(cid).collect();
        requested.extend([cid(5), cid(300)]);

        let set = run(&requested, &lookup, BATCH_SIZE, &ProgressReporter::new()).unwrap();

        assert_eq!(lookup.fetches.borrow().len(), 4);
        assert_eq!(set.table.len(), 301);
        let keys: HashSet<&RowKey> = set.table.keys().collect();
        assert_eq!(keys.len(), 301);
        assert!(set.missing.is_empty());
        assert_eq!(set.table.index_names(), &["CID"]);
        assert_eq!(set.table.columns(), &MOLECULE_COLUMNS);
        assert_eq!(set.table.cell(&cid(301).into(), "name"), Some("m301"));
    }

    #[test]
    fn unknown_cids_are_reported_missing() {
        let lookup = FakeLookup::new().with_record(7410, "Acetophenone");
        let set = run(
            &[cid(7410), cid(99999999)],
            &lookup,
            BATCH_SIZE,
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(set.table.cids(), vec![cid(7410)]);
        assert_eq!(set.missing, vec![cid(99999999)]);
    }
}
