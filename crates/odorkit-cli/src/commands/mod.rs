pub mod archive;
pub mod data;
pub mod join;
pub mod molecules;
pub mod resolve;
pub mod standardize;
