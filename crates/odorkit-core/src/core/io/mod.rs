//! Provides input/output for the plain-text files of an archive.
//!
//! Tables are stored as CSV with a header row and an index column; each archive is
//! described by a TOML manifest. Parsing itself is delegated to the `csv` and `toml`
//! crates; this module maps their output onto the typed models in [`crate::core::models`].

pub mod manifest;
pub mod table;
