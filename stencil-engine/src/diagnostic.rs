//! The inert diagnostic item that replaces a failed batch's output.

use serde::Serialize;

use crate::error::Error;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic attributed to one derivation over one batch.
///
/// On any failure the batch's entire output becomes exactly one of these;
/// no generated units accompany it. Presentation is the invoking tool's job.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The derivation whose generation request failed.
    pub derivation: String,
    pub message: String,
    /// Source location (`line:column`) when the failure carries one.
    pub location: Option<String>,
}

impl Diagnostic {
    pub fn error(derivation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            derivation: derivation.into(),
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn from_error(derivation: &str, err: &Error) -> Self {
        let diag = Self::error(derivation, err.to_string());
        match err.location() {
            Some(loc) => diag.at(loc),
            None => diag,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.derivation, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " (at {loc})")?;
        }
        Ok(())
    }
}
