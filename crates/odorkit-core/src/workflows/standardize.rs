use crate::core::models::ids::Cid;
use crate::core::models::molecule::CID_COLUMN;
use crate::core::models::table::{Table, TableError};
use crate::engine::config::LookupConfig;
use crate::engine::error::EngineError;
use crate::engine::lookup::CompoundLookup;
use crate::engine::progress::ProgressReporter;
use crate::engine::resolver::{ResolutionEntry, ResolutionReport};
use crate::workflows::{molecules, resolve};
use tracing::{info, instrument};

/// Column added to the annotated table when the input already has a `CID` column.
pub const RESOLVED_CID_COLUMN: &str = "CID_resolved";

#[derive(Debug, Clone)]
pub struct StandardizedTable {
    /// Records for every resolved compound, ready to be saved as `molecules.csv`.
    pub molecules: Table,
    /// The input table with [`annotation_column`] appended (empty where unresolved).
    pub annotated: Table,
    pub resolutions: ResolutionReport,
    pub missing: Vec<Cid>,
}

impl StandardizedTable {
    pub fn unresolved(&self) -> Vec<&ResolutionEntry> {
        self.resolutions.unresolved()
    }
}

/// Resolves the identifiers in `identifier_column` of a user table and fetches the records of
/// every compound that resolved.
///
/// The column may be a data column or the table's index column.
#[instrument(skip_all, name = "standardize_workflow", fields(column = identifier_column))]
pub fn run<L: CompoundLookup + ?Sized>(
    table: &Table,
    identifier_column: &str,
    lookup: &L,
    config: &LookupConfig,
    reporter: &ProgressReporter,
) -> Result<StandardizedTable, EngineError> {
    let identifiers: Vec<String> = table
        .column(identifier_column)
        .ok_or_else(|| EngineError::ColumnNotFound {
            column: identifier_column.to_string(),
            available: table
                .index_names()
                .iter()
                .chain(table.columns())
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        })?
        .into_iter()
        .map(str::to_string)
        .collect();
    let cid_column = annotation_column(table)?;

    let resolutions = resolve::run(&identifiers, None, lookup, reporter)?;
    let set = molecules::run(&resolutions.cids(), lookup, config.batch_size, reporter)?;
    let annotated = annotate(table, &resolutions, cid_column)?;

    info!(
        "Standardized {} row(s): {} molecule(s), {} unresolved identifier(s).",
        table.len(),
        set.table.len(),
        resolutions.len() - resolutions.resolved_count()
    );
    Ok(StandardizedTable {
        molecules: set.table,
        annotated,
        resolutions,
        missing: set.missing,
    })
}

/// Picks the column the resolved CIDs are written to: `CID`, or `CID_resolved` when the
/// input already carries a `CID` column of its own.
pub fn annotation_column(table: &Table) -> Result<&'static str, TableError> {
    let taken = |name: &str| {
        table.column_position(name).is_some() || table.index_names().iter().any(|n| n == name)
    };
    [CID_COLUMN, RESOLVED_CID_COLUMN]
        .into_iter()
        .find(|name| !taken(name))
        .ok_or_else(|| TableError::ColumnConflict {
            column: RESOLVED_CID_COLUMN.to_string(),
        })
}

fn annotate(
    table: &Table,
    resolutions: &ResolutionReport,
    cid_column: &str,
) -> Result<Table, TableError> {
    let mut columns = table.columns().to_vec();
    columns.push(cid_column.to_string());
    let mut out = Table::new(table.index_names().to_vec(), columns)?;
    for ((key, cells), entry) in table.rows().zip(&resolutions.entries) {
        let mut cells = cells.to_vec();
        cells.push(
            entry
                .resolution
                .cid()
                .map(|c| c.to_string())
                .unwrap_or_default(),
        );
        out.push_row(key.clone(), cells)?;
    }
    Ok(out)
}
