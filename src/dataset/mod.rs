//! Tabular input handling.
//!
//! Loads the wide hiring-rate CSV (one date column, one column per
//! country) into an in-memory [`Dataset`] and cleans percentage cells.

pub mod loader;

pub use loader::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or cleaning the input table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("The file {0} was not found")]
    NotFound(PathBuf),

    #[error("Date column '{0}' is missing from the header")]
    MissingDateColumn(String),

    #[error("Row {row}: cannot parse date '{value}' with format '{format}'")]
    BadDate {
        row: usize,
        value: String,
        format: String,
    },

    #[error("No value columns besides '{0}'")]
    NoSeries(String),

    #[error("The file {0} contains no data rows")]
    Empty(PathBuf),
}
