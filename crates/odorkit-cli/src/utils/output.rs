use crate::error::{CliError, Result};
use odorkit::core::io::table::{self, TableIoError};
use odorkit::core::models::table::Table;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Reads a user-supplied CSV, reporting failures against the file's path.
pub fn read_input(path: &Path, index_columns: &[&str]) -> Result<Table> {
    table::read_table_from_path(path, index_columns).map_err(|e| parse_error(path, e))
}

pub fn read_input_column(path: &Path, column: &str) -> Result<Vec<String>> {
    table::read_column_from_path(path, column).map_err(|e| parse_error(path, e))
}

/// Writes `table` to `path`, or as CSV to stdout when no path is given.
pub fn emit_table(table: &Table, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            table::write_table_to_path(path, table).map_err(|e| parse_error(path, e))?;
            info!("Wrote {} row(s) to {:?}", table.len(), path);
            println!("✓ {} row(s) written to: {}", table.len(), path.display());
            Ok(())
        }
        None => table::write_table(io::stdout().lock(), table)
            .map_err(|e| parse_error(Path::new("<stdout>"), e)),
    }
}

fn parse_error(path: &Path, source: TableIoError) -> CliError {
    CliError::FileParsing {
        path: PathBuf::from(path),
        source: source.into(),
    }
}
