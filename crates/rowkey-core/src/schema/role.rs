//! Semantic column roles and the header rules that assign them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The meaning a column carries regardless of its literal header text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Customer record number ("SCHEDA NUMERO").
    RecordNumber,
    /// Customer client code ("CODICE CLIENTE").
    ClientCode,
    /// Contact e-mail address.
    Email,
}

impl Role {
    /// All roles, in rule evaluation order.
    pub const ALL: [Role; 3] = [Role::RecordNumber, Role::ClientCode, Role::Email];

    /// Canonical header text for the role.
    pub fn label(self) -> &'static str {
        match self {
            Role::RecordNumber => "SCHEDA NUMERO",
            Role::ClientCode => "CODICE CLIENTE",
            Role::Email => "EMAIL",
        }
    }

    /// Returns true if a schema cannot be resolved without this role.
    pub fn is_required(self) -> bool {
        !matches!(self, Role::Email)
    }

    /// Tests an already normalized (trimmed, uppercased) header.
    fn matches(self, normalized: &str) -> bool {
        match self {
            Role::RecordNumber => normalized.contains("SCHEDA") && normalized.contains("NUMERO"),
            Role::ClientCode => normalized.contains("CODICE") && normalized.contains("CLIENTE"),
            Role::Email => normalized.contains("MAIL"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalizes a header value for matching.
pub fn normalize_header(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Classifies a header into the first role whose rule matches.
///
/// A header maps to at most one role: `"SCHEDA NUMERO EMAIL"` is a record
/// number column, never an e-mail column.
pub fn classify_header(header: &str) -> Option<Role> {
    let normalized = normalize_header(header);
    Role::ALL.into_iter().find(|role| role.matches(&normalized))
}
