//! Deterministic customer IDs for delimited exports.
//!
//! This crate reads a customer CSV with loosely named headers, derives a
//! fixed-length `USER_ID` for every row from its record number and client
//! code, and writes an augmented copy of the file.
//!
//! # Features
//!
//! - **Schema Detection**: Sniff the delimiter (`,` `;` tab) and map headers
//!   such as `" scheda numero "` to semantic roles
//! - **ID Derivation**: SHA-256 based, 24 uppercase hex characters, three
//!   derivation methods
//! - **Duplicate Reporting**: Rows that collide are reported, never dropped
//! - **User Lookup**: Index an augmented file by `USER_ID`
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use rowkey_core::{Method, run};
//!
//! let result = run(Path::new("clients.csv"), Path::new("clients_with_ids.csv"), Method::Combined)?;
//! println!("{} rows, {} duplicates", result.total_rows(), result.duplicates().len());
//! ```

mod derive;
mod error;
mod lookup;
mod processor;
mod result;
pub mod schema;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::{info, info_span};

// === Error Types ===
pub use error::{IdError, Result};

// === ID Derivation ===
pub use derive::{DERIVED_ID_LEN, DerivedId, Method, derive};

// === Row Processing ===
pub use processor::{
    DEFAULT_PROGRESS_INTERVAL, ProcessorState, ProgressObserver, RowProcessor, USER_ID_COLUMN,
};
pub use result::{DuplicateOccurrence, ProcessingResult};

// === Schema ===
pub use schema::{ResolvedSchema, Role, SchemaResolver};

// === Lookup ===
pub use lookup::{UserIndex, UserRecord, lookup_user};

/// Options for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub method: Method,
    /// Bytes inspected for dialect sniffing.
    pub sample_size: usize,
    /// Rows between progress notifications (0 disables them).
    pub progress_interval: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            method: Method::default(),
            sample_size: schema::DEFAULT_SAMPLE_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl RunOptions {
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    #[must_use]
    pub fn with_progress_interval(mut self, rows: usize) -> Self {
        self.progress_interval = rows;
        self
    }
}

/// Generates IDs for `input_path` and writes the augmented file to
/// `output_path`.
pub fn run(input_path: &Path, output_path: &Path, method: Method) -> Result<ProcessingResult> {
    run_with(
        input_path,
        output_path,
        &RunOptions::default().with_method(method),
        None,
    )
}

/// Like [`run`], with explicit options and an optional progress observer.
///
/// The output file is only created once the schema has been resolved, so a
/// schema failure leaves no output behind. Errors after that point leave a
/// possibly truncated output file.
pub fn run_with(
    input_path: &Path,
    output_path: &Path,
    options: &RunOptions,
    observer: Option<&mut dyn ProgressObserver>,
) -> Result<ProcessingResult> {
    let span = info_span!(
        "generate",
        input = %input_path.display(),
        output = %output_path.display(),
        method = %options.method
    );
    let _guard = span.enter();

    let mut input = File::open(input_path).map_err(|source| IdError::InputNotFound {
        path: input_path.to_path_buf(),
        source,
    })?;
    ensure_distinct_paths(input_path, output_path)?;

    let schema = SchemaResolver::new()
        .with_sample_size(options.sample_size)
        .resolve(&mut input)?;

    let output = File::create(output_path).map_err(|source| IdError::Io {
        path: output_path.to_path_buf(),
        source,
    })?;

    let mut processor = RowProcessor::new(&schema, options.method)
        .with_progress_interval(options.progress_interval);
    if let Some(observer) = observer {
        processor = processor.with_observer(observer);
    }
    let result = processor.process(BufReader::new(input), BufWriter::new(output))?;

    info!(
        rows = result.total_rows(),
        distinct = result.distinct_count(),
        duplicates = result.duplicates().len(),
        "generated IDs"
    );
    Ok(result)
}

fn ensure_distinct_paths(input_path: &Path, output_path: &Path) -> Result<()> {
    let Ok(output) = output_path.canonicalize() else {
        // Output does not exist yet, so it cannot be the input.
        return Ok(());
    };
    let input = input_path.canonicalize().map_err(|source| IdError::InputNotFound {
        path: input_path.to_path_buf(),
        source,
    })?;
    if input == output {
        return Err(IdError::OutputIsInput {
            path: output_path.to_path_buf(),
        });
    }
    Ok(())
}
