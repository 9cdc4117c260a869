use std::fmt;

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// User-facing message attached to an operation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        if self.detail.is_empty() {
            write!(f, "{level}: {}", self.summary)
        } else {
            write!(f, "{level}: {}\n  {}", self.summary, self.detail)
        }
    }
}

/// Ordered diagnostics collected while an operation runs.
///
/// Warnings are also emitted as `tracing` events when recorded, so they
/// survive an operation that later fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        let diagnostic = Diagnostic {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        };
        warn!(
            event = "diagnostic.warning",
            summary = %diagnostic.summary,
            detail = %diagnostic.detail
        );
        self.0.push(diagnostic);
    }

    pub fn error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.0.push(Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends `other` after the diagnostics already recorded.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut diags = Diagnostics::new();
        diags.warning("role mismatch", "");
        assert!(!diags.has_errors());
        diags.error("boom", "detail");
        assert!(diags.has_errors());
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn display_includes_detail_on_second_line() {
        let d = Diagnostic {
            severity: Severity::Warning,
            summary: "s".into(),
            detail: "d".into(),
        };
        assert_eq!(d.to_string(), "warning: s\n  d");
    }
}
