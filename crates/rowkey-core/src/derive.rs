//! Deterministic ID derivation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of a derived ID in hex characters.
pub const DERIVED_ID_LEN: usize = 24;

/// Which fields feed the ID computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Record number alone.
    RecordNumberOnly,
    /// Client code alone.
    ClientCodeOnly,
    /// `record_number + "_" + client_code`.
    #[default]
    Combined,
}

impl Method {
    pub const ALL: [Method; 3] = [
        Method::RecordNumberOnly,
        Method::ClientCodeOnly,
        Method::Combined,
    ];

    /// Short name accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::RecordNumberOnly => "scheda",
            Method::ClientCodeOnly => "cliente",
            Method::Combined => "combined",
        }
    }

    /// Builds the hash input from the (trimmed) field values.
    pub fn source(self, record_number: &str, client_code: &str) -> String {
        match self {
            Method::RecordNumberOnly => record_number.trim().to_string(),
            Method::ClientCodeOnly => client_code.trim().to_string(),
            Method::Combined => format!("{}_{}", record_number.trim(), client_code.trim()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheda" | "record-number" | "record_number" => Ok(Method::RecordNumberOnly),
            "cliente" | "client-code" | "client_code" => Ok(Method::ClientCodeOnly),
            "combined" => Ok(Method::Combined),
            other => Err(format!(
                "unknown ID method '{other}' (expected scheda, cliente or combined)"
            )),
        }
    }
}

/// A 24-character uppercase hex identifier.
///
/// Equal inputs under the same method always yield equal IDs, which is what
/// duplicate detection relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DerivedId(String);

impl DerivedId {
    fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode_upper(&digest[..DERIVED_ID_LEN / 2]))
    }

    /// Parses an ID, accepting surrounding whitespace and lowercase hex.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.len() != DERIVED_ID_LEN || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(value.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DerivedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DerivedId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for DerivedId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DerivedId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("DerivedId must be {DERIVED_ID_LEN} hex characters"))
        })
    }
}

/// Derives the ID for one row.
///
/// SHA-256 of the method's source string, first 12 bytes, uppercase hex.
pub fn derive(record_number: &str, client_code: &str, method: Method) -> DerivedId {
    let source = method.source(record_number, client_code);
    let digest = Sha256::digest(source.as_bytes());
    DerivedId::from_digest(&digest)
}
