use crate::core::models::table::{RowKey, Table, TableError};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const STREAM_LABEL: &str = "<stream>";

#[derive(Debug, Error)]
pub enum TableIoError {
    #[error("File I/O error for '{path}': {source}")]
    Io { path: String, source: io::Error },

    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },

    #[error("Index column '{column}' not found in '{path}'")]
    MissingIndex { path: String, column: String },

    #[error("Column '{column}' not found in '{path}'")]
    MissingColumn { path: String, column: String },

    #[error("Invalid table in '{path}': {source}")]
    Table { path: String, source: TableError },
}

impl TableIoError {
    fn relabel(self, label: &str) -> Self {
        let path = label.to_string();
        match self {
            TableIoError::Io { source, .. } => TableIoError::Io { path, source },
            TableIoError::Csv { source, .. } => TableIoError::Csv { path, source },
            TableIoError::MissingIndex { column, .. } => TableIoError::MissingIndex { path, column },
            TableIoError::MissingColumn { column, .. } => {
                TableIoError::MissingColumn { path, column }
            }
            TableIoError::Table { source, .. } => TableIoError::Table { path, source },
        }
    }
}

/// Reads a CSV table with a header row.
///
/// `index_columns` names the column(s) forming the row key; an empty slice selects the
/// first column. All remaining columns keep their header order.
///
/// # Errors
///
/// Returns an error if the CSV is malformed, an index column is missing, or two rows share
/// the same index value.
pub fn read_table(reader: impl Read, index_columns: &[&str]) -> Result<Table, TableIoError> {
    let csv_error = |source| TableIoError::Csv {
        path: STREAM_LABEL.to_string(),
        source,
    };
    let table_error = |source| TableIoError::Table {
        path: STREAM_LABEL.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .enumerate()
        .map(|(i, h)| clean_header(i, h))
        .collect();

    let index_positions = resolve_index_positions(&headers, index_columns)?;
    let index_names: Vec<String> = index_positions.iter().map(|&i| headers[i].clone()).collect();
    let data_positions: Vec<usize> = (0..headers.len())
        .filter(|i| !index_positions.contains(i))
        .collect();
    let columns: Vec<String> = data_positions.iter().map(|&i| headers[i].clone()).collect();

    let mut table = Table::new(index_names, columns).map_err(table_error)?;
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let key = RowKey::new(
            index_positions
                .iter()
                .map(|&i| record.get(i).unwrap_or_default().to_string())
                .collect(),
        );
        let cells = data_positions
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_string())
            .collect();
        table.push_row(key, cells).map_err(table_error)?;
    }

    debug!(
        "Read table with {} row(s) and {} column(s).",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

pub fn read_table_from_path(
    path: impl AsRef<Path>,
    index_columns: &[&str],
) -> Result<Table, TableIoError> {
    let path = path.as_ref();
    let label = path.to_string_lossy();
    debug!("Loading table from {:?}", path);
    let file = File::open(path).map_err(|e| TableIoError::Io {
        path: label.to_string(),
        source: e,
    })?;
    read_table(BufReader::new(file), index_columns).map_err(|e| e.relabel(&label))
}

/// Reads only the header row of a CSV file.
pub fn read_headers_from_path(path: impl AsRef<Path>) -> Result<Vec<String>, TableIoError> {
    let path = path.as_ref();
    let csv_error = |source| TableIoError::Csv {
        path: path.to_string_lossy().to_string(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?;
    Ok(headers
        .iter()
        .enumerate()
        .map(|(i, h)| clean_header(i, h))
        .collect())
}

/// Reads every value of one column, in row order and keeping repeats.
///
/// Unlike [`read_table_from_path`] this places no uniqueness requirement on any column,
/// which suits raw identifier lists.
pub fn read_column_from_path(
    path: impl AsRef<Path>,
    column: &str,
) -> Result<Vec<String>, TableIoError> {
    let path = path.as_ref();
    let label = path.to_string_lossy().to_string();
    let csv_error = |source| TableIoError::Csv {
        path: label.clone(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let position = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .enumerate()
        .position(|(i, h)| clean_header(i, h) == column)
        .ok_or_else(|| TableIoError::MissingColumn {
            path: label.clone(),
            column: column.to_string(),
        })?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        values.push(record.get(position).unwrap_or_default().to_string());
    }
    Ok(values)
}

/// Writes a table as CSV: the index column(s) first, then the data columns.
pub fn write_table(writer: impl Write, table: &Table) -> Result<(), TableIoError> {
    let csv_error = |source| TableIoError::Csv {
        path: STREAM_LABEL.to_string(),
        source,
    };

    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(table.index_names().iter().chain(table.columns().iter()))
        .map_err(csv_error)?;
    for (key, cells) in table.rows() {
        writer
            .write_record(key.values().iter().chain(cells.iter()))
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|e| TableIoError::Io {
        path: STREAM_LABEL.to_string(),
        source: e,
    })
}

pub fn write_table_to_path(path: impl AsRef<Path>, table: &Table) -> Result<(), TableIoError> {
    let path = path.as_ref();
    let label = path.to_string_lossy();
    debug!("Writing table with {} row(s) to {:?}", table.len(), path);
    let file = File::create(path).map_err(|e| TableIoError::Io {
        path: label.to_string(),
        source: e,
    })?;
    write_table(BufWriter::new(file), table).map_err(|e| e.relabel(&label))
}

// Spreadsheet exports often prefix the first header with a byte order mark.
fn clean_header(position: usize, header: &str) -> String {
    let header = if position == 0 {
        header.trim_start_matches('\u{feff}')
    } else {
        header
    };
    header.trim().to_string()
}

fn resolve_index_positions(
    headers: &[String],
    index_columns: &[&str],
) -> Result<Vec<usize>, TableIoError> {
    if index_columns.is_empty() {
        return if headers.is_empty() {
            Err(TableIoError::MissingIndex {
                path: STREAM_LABEL.to_string(),
                column: "(first column)".to_string(),
            })
        } else {
            Ok(vec![0])
        };
    }
    index_columns
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| TableIoError::MissingIndex {
                    path: STREAM_LABEL.to_string(),
                    column: name.to_string(),
                })
        })
        .collect()
}
