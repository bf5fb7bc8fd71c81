//! # Workflows Module
//!
//! End-to-end procedures built on the core and engine layers. Each workflow is a plain
//! `run` function taking its inputs, a [`CompoundLookup`](crate::engine::lookup::CompoundLookup)
//! where the service is needed, and a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//!
//! - **Identifier Resolution** ([`resolve`]) - Map mixed identifiers to CIDs, surfacing
//!   ambiguity instead of guessing
//! - **Molecule Records** ([`molecules`]) - Fetch descriptive records for CIDs in batches
//! - **Standardization** ([`standardize`]) - Turn a user table with an identifier column
//!   into an archive-ready molecules table
//! - **Table Merge** ([`join`]) - Combine tables that share an index, across datasets

pub mod join;
pub mod molecules;
pub mod resolve;
pub mod standardize;
