//! Per-run processing results.

use std::collections::HashSet;

use serde::{Serialize, Serializer};

use crate::derive::{DerivedId, Method};

/// A row whose ID had already been produced by an earlier row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateOccurrence {
    /// 1-based data row position (the header is not counted).
    pub row: usize,
    pub id: DerivedId,
    pub record_number: String,
    pub client_code: String,
}

/// Outcome of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingResult {
    method: Method,
    total_rows: usize,
    #[serde(rename = "distinct_id_count", serialize_with = "serialize_len")]
    distinct_ids: HashSet<DerivedId>,
    duplicates: Vec<DuplicateOccurrence>,
}

impl ProcessingResult {
    pub(crate) fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Records a derived ID. Returns true when the ID is new.
    pub(crate) fn record(&mut self, id: &DerivedId) -> bool {
        self.total_rows += 1;
        if self.distinct_ids.contains(id) {
            return false;
        }
        self.distinct_ids.insert(id.clone());
        true
    }

    pub(crate) fn push_duplicate(&mut self, duplicate: DuplicateOccurrence) {
        self.duplicates.push(duplicate);
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn distinct_count(&self) -> usize {
        self.distinct_ids.len()
    }

    pub fn distinct_ids(&self) -> &HashSet<DerivedId> {
        &self.distinct_ids
    }

    pub fn contains(&self, id: &DerivedId) -> bool {
        self.distinct_ids.contains(id)
    }

    /// Duplicate occurrences in row order.
    pub fn duplicates(&self) -> &[DuplicateOccurrence] {
        &self.duplicates
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

fn serialize_len<S: Serializer>(ids: &HashSet<DerivedId>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(ids.len() as u64)
}
