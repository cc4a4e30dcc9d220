//! Build diagnostics
//!
//! Recoverable problems found while registering declarations. They never
//! abort a build; the session collects them and logs each as it is raised.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Identity of the declaration the diagnostic is about
    pub identity: String,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            identity: identity.into(),
            message: message.into(),
        }
    }

    pub fn error(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            identity: identity.into(),
            message: message.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Emit through `tracing` at the matching level
    pub(crate) fn log(&self) {
        match self.severity {
            Severity::Error => {
                tracing::error!(identity = %self.identity, "{}", self.message);
            }
            Severity::Warning => {
                tracing::warn!(identity = %self.identity, "{}", self.message);
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.identity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::warning("pkg/m:forecast", "tool has no doc comment");
        assert_eq!(
            diagnostic.to_string(),
            "warning: pkg/m:forecast: tool has no doc comment"
        );
        assert!(!diagnostic.is_error());
        assert!(Diagnostic::error("x", "y").is_error());
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
    }
}
