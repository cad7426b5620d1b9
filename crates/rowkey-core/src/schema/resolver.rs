//! Schema resolution: dialect, header row and semantic role mapping.

use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom};

use csv::StringRecord;
use tracing::debug;

use crate::error::{IdError, Result};

use super::dialect::{DEFAULT_CANDIDATES, DEFAULT_SAMPLE_SIZE, Dialect, Sample, detect};
use super::role::{Role, classify_header};

/// Immutable description of an input file's layout.
///
/// Construction guarantees that the record number and client code roles are
/// both mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    dialect: Dialect,
    headers: Vec<String>,
    roles: BTreeMap<Role, usize>,
    record_number: usize,
    client_code: usize,
}

impl ResolvedSchema {
    /// Maps headers to roles. Headers are trimmed (and a leading UTF-8 BOM
    /// removed); the first header matching a role claims it.
    pub fn from_headers<I, S>(dialect: Dialect, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .enumerate()
            .map(|(idx, header)| {
                let header = header.as_ref();
                let header = if idx == 0 {
                    header.trim_start_matches('\u{feff}')
                } else {
                    header
                };
                header.trim().to_string()
            })
            .collect();

        let mut roles = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(role) = classify_header(header) {
                roles.entry(role).or_insert(idx);
            }
        }

        let (Some(&record_number), Some(&client_code)) =
            (roles.get(&Role::RecordNumber), roles.get(&Role::ClientCode))
        else {
            let missing = Role::ALL
                .into_iter()
                .filter(|role| role.is_required() && !roles.contains_key(role))
                .collect();
            return Err(IdError::Schema { missing, headers });
        };

        Ok(Self {
            dialect,
            headers,
            roles,
            record_number,
            client_code,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Trimmed header names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Column index mapped to `role`, if any.
    pub fn column(&self, role: Role) -> Option<usize> {
        self.roles.get(&role).copied()
    }

    /// Header name mapped to `role`, if any.
    pub fn header_for(&self, role: Role) -> Option<&str> {
        self.column(role)
            .and_then(|idx| self.headers.get(idx))
            .map(String::as_str)
    }

    pub fn record_number_column(&self) -> usize {
        self.record_number
    }

    pub fn client_code_column(&self) -> usize {
        self.client_code
    }

    pub fn email_column(&self) -> Option<usize> {
        self.column(Role::Email)
    }

    /// Index of a header by case-insensitive name.
    pub fn find_header(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
    }
}

/// Inspects the start of an input and produces a [`ResolvedSchema`].
#[derive(Debug, Clone)]
pub struct SchemaResolver {
    sample_size: usize,
    candidates: Vec<u8>,
}

impl Default for SchemaResolver {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            candidates: DEFAULT_CANDIDATES.to_vec(),
        }
    }
}

impl SchemaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of bytes inspected for dialect sniffing.
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    /// Set the candidate delimiters, in priority order.
    #[must_use]
    pub fn with_candidates(mut self, candidates: impl Into<Vec<u8>>) -> Self {
        self.candidates = candidates.into();
        self
    }

    /// Resolves the schema of `input`.
    ///
    /// The stream is rewound to its starting position before returning, so
    /// the caller can read rows from the beginning.
    pub fn resolve<R: Read + Seek>(&self, input: &mut R) -> Result<ResolvedSchema> {
        let start = input.stream_position().map_err(IdError::Stream)?;

        let sample = Sample::read(&mut *input, self.sample_size).map_err(IdError::Stream)?;
        let dialect = detect(&sample, &self.candidates);
        input
            .seek(SeekFrom::Start(start))
            .map_err(IdError::Stream)?;

        let headers = read_header_row(&mut *input, dialect)?;
        input
            .seek(SeekFrom::Start(start))
            .map_err(IdError::Stream)?;

        let schema = ResolvedSchema::from_headers(dialect, &headers)?;
        debug!(
            delimiter = %dialect.delimiter_name(),
            columns = schema.headers().len(),
            record_number = schema.header_for(Role::RecordNumber),
            client_code = schema.header_for(Role::ClientCode),
            email = schema.header_for(Role::Email),
            "resolved schema"
        );
        Ok(schema)
    }

    /// Resolves the schema of in-memory text.
    pub fn resolve_str(&self, text: &str) -> Result<ResolvedSchema> {
        self.resolve(&mut std::io::Cursor::new(text.as_bytes()))
    }
}

fn read_header_row<R: Read>(input: R, dialect: Dialect) -> Result<Vec<String>> {
    let mut reader = dialect.reader_builder().has_headers(false).from_reader(input);
    let mut record = StringRecord::new();
    if !reader.read_record(&mut record).map_err(IdError::Read)? {
        return Ok(Vec::new());
    }
    Ok(record.iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_resolve_semicolon_schema() {
        let schema = SchemaResolver::new()
            .resolve_str("SCHEDA NUMERO;CODICE CLIENTE;EMAIL\n100;ABC123;a@b.com\n")
            .unwrap();

        assert_eq!(schema.dialect().delimiter, b';');
        assert_eq!(
            schema.headers(),
            &["SCHEDA NUMERO", "CODICE CLIENTE", "EMAIL"]
        );
        assert_eq!(schema.record_number_column(), 0);
        assert_eq!(schema.client_code_column(), 1);
        assert_eq!(schema.email_column(), Some(2));
    }

    #[test]
    fn test_headers_are_trimmed() {
        let schema = SchemaResolver::new()
            .resolve_str(" scheda numero , Codice_Cliente ,NOTE\n1,2,3\n")
            .unwrap();

        assert_eq!(schema.headers(), &["scheda numero", "Codice_Cliente", "NOTE"]);
        assert_eq!(schema.header_for(Role::RecordNumber), Some("scheda numero"));
        assert_eq!(schema.header_for(Role::ClientCode), Some("Codice_Cliente"));
    }

    #[test]
    fn test_email_is_optional() {
        let schema = SchemaResolver::new()
            .resolve_str("SCHEDA_NUMERO,CODICE_CLIENTE\n1,A\n")
            .unwrap();
        assert_eq!(schema.email_column(), None);
        assert_eq!(schema.header_for(Role::Email), None);
    }

    #[test]
    fn test_first_matching_header_wins() {
        let schema = SchemaResolver::new()
            .resolve_str("SCHEDA NUMERO,CODICE CLIENTE,SCHEDA NUMERO OLD,MAIL,EMAIL 2\n1,2,3,4,5\n")
            .unwrap();
        assert_eq!(schema.record_number_column(), 0);
        assert_eq!(schema.email_column(), Some(3));
    }

    #[test]
    fn test_missing_roles_list_headers() {
        let err = SchemaResolver::new()
            .resolve_str("FOO,BAR,BAZ\n1,2,3\n")
            .unwrap_err();
        match err {
            IdError::Schema { missing, headers } => {
                assert_eq!(missing, vec![Role::RecordNumber, Role::ClientCode]);
                assert_eq!(headers, vec!["FOO", "BAR", "BAZ"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_client_code_only() {
        let err = SchemaResolver::new()
            .resolve_str("SCHEDA NUMERO,EMAIL\n1,a@b.c\n")
            .unwrap_err();
        assert!(matches!(
            err,
            IdError::Schema { ref missing, .. } if missing == &vec![Role::ClientCode]
        ));
    }

    #[test]
    fn test_empty_input_is_schema_error() {
        let err = SchemaResolver::new().resolve_str("").unwrap_err();
        assert!(matches!(err, IdError::Schema { ref headers, .. } if headers.is_empty()));
    }

    #[test]
    fn test_bom_is_stripped() {
        let schema = SchemaResolver::new()
            .resolve_str("\u{feff}SCHEDA NUMERO,CODICE CLIENTE\n1,2\n")
            .unwrap();
        assert_eq!(schema.headers()[0], "SCHEDA NUMERO");
    }

    #[test]
    fn test_long_header_beyond_sample() {
        // The header row is parsed from the stream, not from the sample.
        let padding = "X".repeat(200);
        let text = format!("{padding},SCHEDA NUMERO,CODICE CLIENTE\na,1,2\n");
        let schema = SchemaResolver::new()
            .with_sample_size(64)
            .resolve_str(&text)
            .unwrap();
        assert_eq!(schema.record_number_column(), 1);
        assert_eq!(schema.client_code_column(), 2);
    }

    #[test]
    fn test_stream_is_rewound() {
        let mut cursor = Cursor::new(b"SCHEDA NUMERO,CODICE CLIENTE\n1,2\n".to_vec());
        SchemaResolver::new().resolve(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_custom_candidates() {
        let schema = SchemaResolver::new()
            .with_candidates(vec![b'|'])
            .resolve_str("SCHEDA NUMERO|CODICE CLIENTE\n1|2\n")
            .unwrap();
        assert_eq!(schema.dialect().delimiter, b'|');
    }

    #[test]
    fn test_find_header_case_insensitive() {
        let schema = SchemaResolver::new()
            .resolve_str("SCHEDA NUMERO,CODICE CLIENTE,user_id\n1,2,3\n")
            .unwrap();
        assert_eq!(schema.find_header("USER_ID"), Some(2));
        assert_eq!(schema.find_header("MISSING"), None);
    }
}
