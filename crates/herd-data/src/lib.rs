//! Herd Data - breeding (acasalamento) spreadsheet loading
//!
//! This crate provides:
//! - CSV loading with UTF-8 / Latin-1 decoding and delimiter detection
//! - An in-memory [`Dataset`] with column projection
//! - Friendly column labels for the exported breeding-plan headers
//!
//! # Example
//!
//! ```ignore
//! use herd_data::{CsvOptions, Dataset, Relabeler};
//!
//! let mut dataset = Dataset::from_path("acasalamento.csv", &CsvOptions::default())?;
//! dataset.relabel_headers(&Relabeler::Heuristic)?;
//! let wanted = ["ID animal".to_string(), "NAAB Opção 1".to_string()];
//! let columns = dataset.resolve_columns(&wanted)?;
//! let table = dataset.project(&columns)?;
//! ```

mod dataset;
mod encoding;
mod relabel;

pub use dataset::{CsvOptions, Dataset};
pub use encoding::{decode, detect_delimiter, TextEncoding};
pub use relabel::{relabel_headers, Relabeler};

use thiserror::Error;

/// Errors that can occur while loading or reshaping a dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid text encoding: {0}")]
    Encoding(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV file has no header row")]
    Empty,

    #[error("Line {line} has {found} fields, expected at most {expected}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Expected {expected} column labels, got {found}")]
    LabelCount { expected: usize, found: usize },
}

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;
