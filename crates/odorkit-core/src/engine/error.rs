use super::config::ConfigError;
use super::lookup::LookupError;
use crate::core::models::table::TableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Compound lookup failed: {source}")]
    Lookup {
        #[from]
        source: LookupError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Table operation failed: {source}")]
    Table {
        #[from]
        source: TableError,
    },

    #[error("Column '{column}' not found. Available columns: {available}")]
    ColumnNotFound { column: String, available: String },

    #[error("Workflow '{workflow}' needs at least {min} input table(s)")]
    NotEnoughInputs { workflow: &'static str, min: usize },
}
