use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    MalformedField,
    DuplicateField,
    UnrecognizedField,
    PairingFallback,
    CustomFieldIgnored,
    JunitUnmatched,
    ParametrizedMismatch,
}

impl WarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedField => "malformed-field",
            Self::DuplicateField => "duplicate-field",
            Self::UnrecognizedField => "unrecognized-field",
            Self::PairingFallback => "pairing-fallback",
            Self::CustomFieldIgnored => "custom-field-ignored",
            Self::JunitUnmatched => "junit-unmatched",
            Self::ParametrizedMismatch => "parametrized-mismatch",
        }
    }
}

/// Non-fatal condition reported next to successful output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Qualified name of the scope or item the warning is about.
    pub scope: String,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            scope: scope.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.scope, self.message)
    }
}
