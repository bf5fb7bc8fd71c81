use super::lookup::{CompoundLookup, LookupError};
use super::progress::{Progress, ProgressReporter};
use crate::core::models::ids::Cid;
use crate::core::models::molecule::MoleculeRecord;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Maximum number of CIDs requested at once.
pub const BATCH_SIZE: usize = 100;

/// Splits `cids` into chunks of at most `size`, after dropping repeated CIDs.
///
/// First occurrences keep their relative order, so `N` distinct CIDs always yield
/// `ceil(N / size)` chunks and every CID lands in exactly one of them. A `size` of zero is
/// treated as one.
pub fn partition(cids: &[Cid], size: usize) -> Vec<Vec<Cid>> {
    let size = size.max(1);
    let mut seen = HashSet::with_capacity(cids.len());
    let unique: Vec<Cid> = cids.iter().copied().filter(|c| seen.insert(*c)).collect();
    unique.chunks(size).map(<[Cid]>::to_vec).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchFetch {
    pub records: Vec<MoleculeRecord>, // one per found CID, in request order
    pub missing: Vec<Cid>,            // requested CIDs the service had no record for
    pub batches: usize,
}

/// Fetches records for `cids`, one request per chunk of [`partition`].
///
/// Records returned for CIDs that were never requested are discarded, and a CID the
/// service answers twice keeps its first record.
pub fn fetch_in_batches<L: CompoundLookup + ?Sized>(
    lookup: &L,
    cids: &[Cid],
    size: usize,
    reporter: &ProgressReporter,
) -> Result<BatchFetch, LookupError> {
    let chunks = partition(cids, size);
    info!(
        "Fetching records for {} CID(s) in {} batch(es).",
        chunks.iter().map(Vec::len).sum::<usize>(),
        chunks.len()
    );

    reporter.report(Progress::TaskStart {
        total_steps: chunks.len() as u64,
    });
    let mut found: HashMap<Cid, MoleculeRecord> = HashMap::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let requested: HashSet<Cid> = chunk.iter().copied().collect();
        let records = lookup.fetch_records(chunk)?;
        debug!(
            "Batch {}/{}: {} record(s) for {} CID(s).",
            i + 1,
            chunks.len(),
            records.len(),
            chunk.len()
        );
        for record in records {
            if requested.contains(&record.cid) {
                found.entry(record.cid).or_insert(record);
            }
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    let mut records = Vec::with_capacity(found.len());
    let mut missing = Vec::new();
    for cid in chunks.iter().flatten() {
        match found.remove(cid) {
            Some(record) => records.push(record),
            None => missing.push(*cid),
        }
    }
    Ok(BatchFetch {
        records,
        missing,
        batches: chunks.len(),
    })
}
