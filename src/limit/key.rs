//! Limit key generation and handling.

use serde::{Deserialize, Serialize};

/// The kind of subject an attempt is counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// Client IP address
    Ip,
    /// Normalized email address
    Email,
    /// Opaque token (confirmation or unsubscribe)
    Token,
}

impl SubjectKind {
    /// The lowercase name used in keys and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Ip => "ip",
            SubjectKind::Email => "email",
            SubjectKind::Token => "token",
        }
    }
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A subject of an inbound request, as supplied by the calling handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// What this value identifies
    pub kind: SubjectKind,
    /// The raw value (IP address, email address, token)
    pub value: String,
}

impl Subject {
    /// Create a new subject.
    pub fn new(kind: SubjectKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// The value as used in keys.
    ///
    /// Whitespace is trimmed; email addresses are additionally lowercased so
    /// that casing variants share one counter.
    pub fn normalized_value(&self) -> String {
        let trimmed = self.value.trim();
        match self.kind {
            SubjectKind::Email => trimmed.to_ascii_lowercase(),
            _ => trimmed.to_string(),
        }
    }
}

/// A key that uniquely identifies one counter in the record store.
///
/// The key is composed of the scope, the subject kind, and the normalized
/// subject value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LimitKey {
    /// The scope this key belongs to (e.g. `subscribe`)
    pub scope: String,
    /// The subject kind
    pub kind: SubjectKind,
    /// The normalized subject value
    pub value: String,
}

impl LimitKey {
    /// Create a new limit key from a scope and subject.
    pub fn new(scope: &str, subject: &Subject) -> Self {
        Self {
            scope: scope.to_string(),
            kind: subject.kind,
            value: subject.normalized_value(),
        }
    }
}

impl std::fmt::Display for LimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.scope, self.kind, self.value)
    }
}
