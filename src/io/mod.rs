//! CSV import of input series and export of result tables.

pub mod export;
pub mod import;
