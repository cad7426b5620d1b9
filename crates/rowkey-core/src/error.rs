//! Error types for ID generation and lookup.

use std::path::PathBuf;
use thiserror::Error;

use crate::processor::ProcessorState;
use crate::schema::Role;

/// Errors that can abort a run.
///
/// Every variant is fatal. Duplicate IDs are not errors; they are reported
/// through [`crate::ProcessingResult`].
#[derive(Debug, Error)]
pub enum IdError {
    // === File System Errors ===
    /// Input path does not exist or cannot be opened.
    #[error("input file not found or unreadable: {path}")]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output path points at the input file.
    #[error("output path is the input file: {path}")]
    OutputIsInput { path: PathBuf },

    /// Failed to create or flush a file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read from or seek within an input stream.
    #[error("I/O error while reading input: {0}")]
    Stream(#[source] std::io::Error),

    // === Schema Errors ===
    /// Required semantic columns were not found in the header.
    #[error(
        "required columns not found ({}); available columns: [{}]",
        role_list(.missing),
        header_list(.headers)
    )]
    Schema {
        missing: Vec<Role>,
        headers: Vec<String>,
    },

    /// Augmented file has no `USER_ID` column.
    #[error("no USER_ID column found; available columns: [{}]", header_list(.headers))]
    MissingIdColumn { headers: Vec<String> },

    // === Row Errors ===
    /// A data row has no value for a required column.
    #[error("row {row}: missing value for column '{column}'")]
    RowFieldMissing { row: usize, column: String },

    /// A data row has more fields than the header declares.
    #[error("row {row}: found {found} fields but the header declares {expected}")]
    RowFieldOverflow {
        row: usize,
        expected: usize,
        found: usize,
    },

    // === CSV Errors ===
    /// Failed to parse a record from the input.
    #[error("failed to read CSV record: {0}")]
    Read(#[source] csv::Error),

    /// Failed to write a record to the output.
    #[error("failed to write CSV record: {0}")]
    Write(#[source] csv::Error),

    /// A row processor was driven twice.
    #[error("row processor cannot start from state {state:?}")]
    InvalidState { state: ProcessorState },
}

impl IdError {
    /// Returns the headers detected before a schema failure, if any.
    pub fn detected_headers(&self) -> Option<&[String]> {
        match self {
            Self::Schema { headers, .. } | Self::MissingIdColumn { headers } => {
                Some(headers.as_slice())
            }
            _ => None,
        }
    }
}

fn header_list(headers: &[String]) -> String {
    headers
        .iter()
        .map(|h| format!("\"{h}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn role_list(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|role| role.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for ID generation operations.
pub type Result<T> = std::result::Result<T, IdError>;
