//! On-disk archive conventions.
//!
//! An archive is a directory named after its dataset holding a `manifest.toml`, a processing
//! script and a fixed set of CSV files ([`layout::StandardFile`]). The [`store::ArchiveStore`]
//! reads and writes archives under a storage root and [`validation`] checks them against
//! the layout.

pub mod layout;
pub mod store;
pub mod validation;
