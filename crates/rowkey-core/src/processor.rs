//! Row streaming: derive an ID per row, track duplicates, write the
//! augmented rows.

use std::io::{Read, Write};

use csv::StringRecord;
use tracing::{debug, warn};

use crate::derive::{Method, derive};
use crate::error::{IdError, Result};
use crate::result::{DuplicateOccurrence, ProcessingResult};
use crate::schema::ResolvedSchema;

/// Name of the appended ID column.
pub const USER_ID_COLUMN: &str = "USER_ID";

/// Default number of rows between progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Receives row-count milestones while a run is streaming.
pub trait ProgressObserver {
    fn on_progress(&mut self, rows_processed: usize);
}

impl<F: FnMut(usize)> ProgressObserver for F {
    fn on_progress(&mut self, rows_processed: usize) {
        self(rows_processed);
    }
}

/// Lifecycle of a [`RowProcessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Init,
    Streaming,
    Finalized,
    /// A fatal error stopped the run. Output written so far is left as is.
    Errored,
}

/// Streams rows from an input to an output, appending `USER_ID`.
pub struct RowProcessor<'a> {
    schema: &'a ResolvedSchema,
    method: Method,
    progress_interval: usize,
    observer: Option<&'a mut dyn ProgressObserver>,
    state: ProcessorState,
}

impl<'a> RowProcessor<'a> {
    pub fn new(schema: &'a ResolvedSchema, method: Method) -> Self {
        Self {
            schema,
            method,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            observer: None,
            state: ProcessorState::Init,
        }
    }

    /// Set the progress interval in rows (0 disables notifications).
    #[must_use]
    pub fn with_progress_interval(mut self, rows: usize) -> Self {
        self.progress_interval = rows;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: &'a mut dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    /// Reads every data row of `input` (header included at the top) and
    /// writes the augmented file to `output`.
    ///
    /// Any error is fatal: the processor moves to [`ProcessorState::Errored`]
    /// and whatever was already written stays in `output`.
    pub fn process<R: Read, W: Write>(
        &mut self,
        input: R,
        output: W,
    ) -> Result<ProcessingResult> {
        if self.state != ProcessorState::Init {
            return Err(IdError::InvalidState { state: self.state });
        }
        self.state = ProcessorState::Streaming;

        match self.stream(input, output) {
            Ok(result) => {
                self.state = ProcessorState::Finalized;
                Ok(result)
            }
            Err(err) => {
                self.state = ProcessorState::Errored;
                Err(err)
            }
        }
    }

    fn stream<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<ProcessingResult> {
        let schema = self.schema;
        let dialect = schema.dialect();
        let headers = schema.headers();
        let mut reader = dialect.reader_builder().from_reader(input);
        let mut writer = dialect.writer_builder().from_writer(output);

        writer
            .write_record(
                headers
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(USER_ID_COLUMN)),
            )
            .map_err(IdError::Write)?;

        let mut result = ProcessingResult::new(self.method);
        let mut record = StringRecord::new();
        let mut out = StringRecord::with_capacity(256, headers.len() + 1);

        while reader.read_record(&mut record).map_err(IdError::Read)? {
            if is_blank(&record) {
                continue;
            }
            let row = result.total_rows() + 1;
            if record.len() > headers.len() {
                return Err(IdError::RowFieldOverflow {
                    row,
                    expected: headers.len(),
                    found: record.len(),
                });
            }

            let record_number =
                required_field(schema, &record, schema.record_number_column(), row)?;
            let client_code = required_field(schema, &record, schema.client_code_column(), row)?;
            let id = derive(record_number, client_code, self.method);

            if !result.record(&id) {
                warn!(row, user_id = %id, "duplicate ID");
                result.push_duplicate(DuplicateOccurrence {
                    row,
                    id: id.clone(),
                    record_number: record_number.to_string(),
                    client_code: client_code.to_string(),
                });
            }

            out.clear();
            for idx in 0..headers.len() {
                out.push_field(record.get(idx).unwrap_or(""));
            }
            out.push_field(id.as_str());
            writer.write_record(&out).map_err(IdError::Write)?;

            self.notify(row);
        }

        writer
            .flush()
            .map_err(|err| IdError::Write(csv::Error::from(err)))?;
        debug!(
            rows = result.total_rows(),
            distinct = result.distinct_count(),
            duplicates = result.duplicates().len(),
            "finished streaming rows"
        );
        Ok(result)
    }

    fn notify(&mut self, rows: usize) {
        if self.progress_interval == 0 || rows % self.progress_interval != 0 {
            return;
        }
        debug!(rows, "progress");
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_progress(rows);
        }
    }
}

/// A whitespace-only line parses as a single blank field.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record[0].trim().is_empty()
}

fn required_field<'r>(
    schema: &ResolvedSchema,
    record: &'r StringRecord,
    idx: usize,
    row: usize,
) -> Result<&'r str> {
    record.get(idx).ok_or_else(|| IdError::RowFieldMissing {
        row,
        column: schema.headers()[idx].clone(),
    })
}
