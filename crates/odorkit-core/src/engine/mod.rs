//! # Engine Module
//!
//! The lookup machinery that turns heterogeneous molecule identifiers into PubChem CIDs
//! and CIDs into descriptive records.
//!
//! ## Architecture
//!
//! - **Service Seam** ([`lookup`]) - The [`lookup::CompoundLookup`] trait every chemical
//!   database client implements, plus the lookup namespaces
//! - **PubChem Client** ([`pubchem`]) - Rate-limited PUG-REST implementation of the seam
//! - **Batching** ([`batch`]) - Splits large CID sets into request-sized chunks
//! - **Resolution** ([`resolver`]) - Identifier classification, lookup and ambiguity handling
//! - **Configuration** ([`config`]) - Service endpoint, batch size, rate and timeout settings
//! - **Progress Monitoring** ([`progress`]) - Progress events for interactive front ends
//! - **Error Handling** ([`error`]) - Errors surfaced by the workflows
//!
//! Ambiguity is never an error here: an identifier with no or several candidates is
//! returned as [`resolver::Resolution::Unresolved`] so the caller decides what to do.

pub mod batch;
pub mod config;
pub mod error;
pub mod lookup;
pub mod progress;
pub mod pubchem;
pub mod resolver;
