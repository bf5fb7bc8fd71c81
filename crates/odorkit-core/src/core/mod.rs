//! # Core Module
//!
//! Fundamental building blocks shared by every workflow.
//!
//! - **Data Models** ([`models`]) - Compound identifiers, molecule records and indexed tables
//! - **File I/O** ([`io`]) - CSV tables and archive manifests
//! - **Archive Layout** ([`archive`]) - Standard file conventions and the local archive store
//! - **Utilities** ([`utils`]) - Identifier classification and normalization

pub mod archive;
pub mod io;
pub mod models;
pub mod utils;
