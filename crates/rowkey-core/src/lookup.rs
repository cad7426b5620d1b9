//! User lookup over an augmented file.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{IdError, Result};
use crate::processor::USER_ID_COLUMN;
use crate::schema::SchemaResolver;

/// Customer fields attached to a `USER_ID`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub user_id: String,
    pub record_number: String,
    pub client_code: String,
    pub email: Option<String>,
}

/// In-memory index of an augmented file, keyed by normalized `USER_ID`.
#[derive(Debug, Clone, Default)]
pub struct UserIndex {
    users: HashMap<String, UserRecord>,
}

impl UserIndex {
    /// Loads every row of an augmented file.
    ///
    /// The first row carrying a given ID wins. Rows with an empty ID are
    /// skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let mut file = File::open(path).map_err(|source| IdError::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let schema = SchemaResolver::new().resolve(&mut file)?;
        let Some(id_column) = schema.find_header(USER_ID_COLUMN) else {
            return Err(IdError::MissingIdColumn {
                headers: schema.headers().to_vec(),
            });
        };

        let mut reader = schema
            .dialect()
            .reader_builder()
            .from_reader(BufReader::new(file));
        let mut record = StringRecord::new();
        let mut users = HashMap::new();
        let mut rows = 0usize;

        while reader.read_record(&mut record).map_err(IdError::Read)? {
            rows += 1;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
            let user_id = field(id_column);
            if user_id.is_empty() {
                continue;
            }
            let user = UserRecord {
                record_number: field(schema.record_number_column()),
                client_code: field(schema.client_code_column()),
                email: schema.email_column().map(field),
                user_id: user_id.clone(),
            };
            users.entry(normalize_id(&user_id)).or_insert(user);
        }

        info!(path = %path.display(), rows, users = users.len(), "loaded user index");
        Ok(Self { users })
    }

    /// Finds a user by ID (trimmed, case-insensitive).
    pub fn get(&self, user_id: &str) -> Option<&UserRecord> {
        let found = self.users.get(&normalize_id(user_id));
        debug!(found = found.is_some(), "user lookup");
        found
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Loads `path` and looks up a single user.
pub fn lookup_user(path: &Path, user_id: &str) -> Result<Option<UserRecord>> {
    let index = UserIndex::load(path)?;
    Ok(index.get(user_id).cloned())
}

fn normalize_id(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}
