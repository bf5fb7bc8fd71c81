//! Data models for compounds and the tables that describe them.
//!
//! Every stored value in an archive is ultimately keyed by a [`ids::Cid`] or by an
//! identifier derived from it (a stimulus or subject ID), so the [`table::Table`]
//! type treats its index as the primary handle for lookups and joins.

pub mod ids;
pub mod molecule;
pub mod table;
