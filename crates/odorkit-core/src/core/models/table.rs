use super::ids::Cid;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// The index value of one table row.
///
/// Most tables are indexed by a single column (`CID`, `Stimulus`, `Subject`); long-format
/// tables such as behavior files use a composite key with one value per index column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(Vec<String>);

impl RowKey {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn single(value: impl Into<String>) -> Self {
        Self(vec![value.into()])
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Interprets a single-valued key as a compound identifier.
    pub fn as_cid(&self) -> Option<Cid> {
        match self.0.as_slice() {
            [value] => value.parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}

impl From<String> for RowKey {
    fn from(value: String) -> Self {
        Self::single(value)
    }
}

impl From<Cid> for RowKey {
    fn from(cid: Cid) -> Self {
        Self::single(cid.to_string())
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// How rows are matched when two tables are joined on their index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// Keep only keys present in both tables.
    #[default]
    Inner,
    /// Keep every row of the left table; absent right cells are empty.
    Left,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TableError {
    #[error("A table needs at least one index column")]
    EmptyIndex,

    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("Duplicate index value '{key}'")]
    DuplicateIndex { key: RowKey },

    #[error("Row '{key}' has {found} cell(s), expected {expected}")]
    RowWidth {
        key: RowKey,
        expected: usize,
        found: usize,
    },

    #[error("Index key '{key}' has {found} value(s), expected {expected}")]
    KeyArity {
        key: RowKey,
        expected: usize,
        found: usize,
    },

    #[error("Cannot join tables indexed by {left} and {right} column(s)")]
    IndexMismatch { left: usize, right: usize },

    #[error("Column '{column}' exists in both tables; supply suffixes to disambiguate")]
    ColumnConflict { column: String },

    #[error("Cannot concatenate tables with different columns")]
    ColumnMismatch,
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    key: RowKey,
    cells: Vec<String>,
}

/// A tabular dataset indexed by a unique key.
///
/// Cells are kept as text exactly as they appear in the source file, with missing values
/// stored as empty strings. Row order is insertion order and is preserved by every
/// operation that returns a new table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    index_names: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Row>,
    positions: HashMap<RowKey, usize>,
}

impl Table {
    pub fn new(index_names: Vec<String>, columns: Vec<String>) -> Result<Self, TableError> {
        if index_names.is_empty() {
            return Err(TableError::EmptyIndex);
        }
        let mut seen = HashSet::new();
        for name in index_names.iter().chain(columns.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            index_names,
            columns,
            rows: Vec::new(),
            positions: HashMap::new(),
        })
    }

    /// Creates an empty table indexed by a single column.
    pub fn with_index(index_name: &str, columns: &[&str]) -> Result<Self, TableError> {
        Self::new(
            vec![index_name.to_string()],
            columns.iter().map(|c| c.to_string()).collect(),
        )
    }

    pub fn push_row(
        &mut self,
        key: impl Into<RowKey>,
        cells: Vec<String>,
    ) -> Result<(), TableError> {
        let key = key.into();
        if key.arity() != self.index_names.len() {
            return Err(TableError::KeyArity {
                expected: self.index_names.len(),
                found: key.arity(),
                key,
            });
        }
        if cells.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                found: cells.len(),
                key,
            });
        }
        if self.positions.contains_key(&key) {
            return Err(TableError::DuplicateIndex { key });
        }
        self.positions.insert(key.clone(), self.rows.len());
        self.rows.push(Row { key, cells });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index_names(&self) -> &[String] {
        &self.index_names
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn keys(&self) -> impl Iterator<Item = &RowKey> {
        self.rows.iter().map(|row| &row.key)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&RowKey, &[String])> {
        self.rows.iter().map(|row| (&row.key, row.cells.as_slice()))
    }

    pub fn contains_key(&self, key: &RowKey) -> bool {
        self.positions.contains_key(key)
    }

    pub fn get(&self, key: &RowKey) -> Option<&[String]> {
        self.positions
            .get(key)
            .map(|&pos| self.rows[pos].cells.as_slice())
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, key: &RowKey, column: &str) -> Option<&str> {
        let col = self.column_position(column)?;
        self.get(key).map(|cells| cells[col].as_str())
    }

    /// Returns the values of a data column or an index column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        if let Some(col) = self.column_position(name) {
            return Some(self.rows.iter().map(|r| r.cells[col].as_str()).collect());
        }
        let idx = self.index_names.iter().position(|n| n == name)?;
        Some(self.rows.iter().map(|r| r.key.0[idx].as_str()).collect())
    }

    /// The compound identifiers of a CID-indexed table, skipping keys that are not CIDs.
    pub fn cids(&self) -> Vec<Cid> {
        self.keys().filter_map(RowKey::as_cid).collect()
    }

    pub fn head(&self, n: usize) -> Table {
        self.filter_rows(|i, _| i < n)
    }

    /// Returns the rows whose key is in `keys`, in table order. Unknown keys are ignored.
    pub fn select<'a>(&self, keys: impl IntoIterator<Item = &'a RowKey>) -> Table {
        let wanted: HashSet<&RowKey> = keys.into_iter().collect();
        self.filter_rows(|_, row| wanted.contains(&row.key))
    }

    pub fn join(&self, other: &Table, kind: JoinKind) -> Result<Table, TableError> {
        self.join_inner(other, kind, None)
    }

    /// Joins two tables, renaming columns present in both with the given suffixes.
    pub fn join_with_suffixes(
        &self,
        other: &Table,
        kind: JoinKind,
        left_suffix: &str,
        right_suffix: &str,
    ) -> Result<Table, TableError> {
        self.join_inner(other, kind, Some((left_suffix, right_suffix)))
    }

    /// Appends the rows of a table with the same index and columns.
    pub fn concat(&self, other: &Table) -> Result<Table, TableError> {
        if self.columns != other.columns || self.index_names.len() != other.index_names.len() {
            return Err(TableError::ColumnMismatch);
        }
        let mut out = self.clone();
        for row in &other.rows {
            out.push_row(row.key.clone(), row.cells.clone())?;
        }
        Ok(out)
    }

    fn filter_rows(&self, mut keep: impl FnMut(usize, &Row) -> bool) -> Table {
        let mut out = Table {
            index_names: self.index_names.clone(),
            columns: self.columns.clone(),
            rows: Vec::new(),
            positions: HashMap::new(),
        };
        for (i, row) in self.rows.iter().enumerate() {
            if keep(i, row) {
                out.positions.insert(row.key.clone(), out.rows.len());
                out.rows.push(row.clone());
            }
        }
        out
    }

    fn join_inner(
        &self,
        other: &Table,
        kind: JoinKind,
        suffixes: Option<(&str, &str)>,
    ) -> Result<Table, TableError> {
        if self.index_names.len() != other.index_names.len() {
            return Err(TableError::IndexMismatch {
                left: self.index_names.len(),
                right: other.index_names.len(),
            });
        }

        let left_names: HashSet<&str> = self
            .columns
            .iter()
            .chain(self.index_names.iter())
            .map(String::as_str)
            .collect();
        let overlapping: HashSet<&str> = other
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| left_names.contains(c))
            .collect();

        let (left_columns, right_columns) = match (overlapping.is_empty(), suffixes) {
            (true, _) => (self.columns.clone(), other.columns.clone()),
            (false, None) => {
                let mut conflicts: Vec<&str> = overlapping.into_iter().collect();
                conflicts.sort_unstable();
                return Err(TableError::ColumnConflict {
                    column: conflicts[0].to_string(),
                });
            }
            (false, Some((lsuffix, rsuffix))) => {
                let rename = |cols: &[String], suffix: &str| -> Vec<String> {
                    cols.iter()
                        .map(|c| {
                            if overlapping.contains(c.as_str()) {
                                format!("{c}{suffix}")
                            } else {
                                c.clone()
                            }
                        })
                        .collect()
                };
                (
                    rename(&self.columns, lsuffix),
                    rename(&other.columns, rsuffix),
                )
            }
        };

        let mut columns = left_columns;
        columns.extend(right_columns);
        let mut out = Table::new(self.index_names.clone(), columns)?;

        let blank = vec![String::new(); other.columns.len()];
        for row in &self.rows {
            let right_cells = match (other.get(&row.key), kind) {
                (Some(cells), _) => cells,
                (None, JoinKind::Left) => blank.as_slice(),
                (None, JoinKind::Inner) => continue,
            };
            let mut cells = row.cells.clone();
            cells.extend_from_slice(right_cells);
            out.push_row(row.key.clone(), cells)?;
        }
        Ok(out)
    }
}
