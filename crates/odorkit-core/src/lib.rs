//! # odorkit Core Library
//!
//! Tools for curating olfaction research datasets into a standardized archive layout,
//! resolving heterogeneous molecule identifiers to PubChem compound IDs (CIDs), and
//! joining CID-indexed tables across datasets.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Cid`, `MoleculeRecord`, `Table`),
//!   CSV and manifest I/O, identifier classification and the on-disk archive layout.
//!
//! - **[`engine`]: The Lookup Core.** The [`engine::lookup::CompoundLookup`] seam to the
//!   external chemical database, its PubChem implementation, batching, identifier
//!   resolution, configuration and progress reporting.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures built from the two layers
//!   above: resolving identifiers, fetching molecule records, standardizing a user table
//!   and merging feature tables.

pub mod core;
pub mod engine;
pub mod workflows;
