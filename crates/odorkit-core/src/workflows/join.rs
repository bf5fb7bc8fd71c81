use crate::core::models::table::{JoinKind, Table};
use crate::engine::error::EngineError;
use tracing::{debug, info, instrument};

/// Folds `tables` left to right into one table sharing their index.
///
/// With [`JoinKind::Inner`] only keys present in every table survive; with
/// [`JoinKind::Left`] the first table's rows are all kept and missing cells are empty.
/// Column names must be distinct across tables.
#[instrument(skip_all, name = "join_workflow", fields(tables = tables.len(), kind = ?kind))]
pub fn run(tables: &[Table], kind: JoinKind) -> Result<Table, EngineError> {
    let Some((first, rest)) = tables.split_first() else {
        return Err(EngineError::NotEnoughInputs {
            workflow: "join",
            min: 1,
        });
    };

    let mut merged = first.clone();
    for (i, table) in rest.iter().enumerate() {
        merged = merged.join(table, kind)?;
        debug!("After table {}: {} row(s).", i + 2, merged.len());
    }
    info!(
        "Joined {} table(s) into {} row(s) and {} column(s).",
        tables.len(),
        merged.len(),
        merged.columns().len()
    );
    Ok(merged)
}
