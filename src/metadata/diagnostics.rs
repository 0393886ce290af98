//! Best-effort problem reporting.
//!
//! Not every irregularity encountered while mapping or rewriting is fatal:
//! an exported-type forwarder pointing at an assembly outside the loaded set,
//! or a base-type reference that cannot be resolved, degrades the analysis but
//! does not invalidate it. Such conditions are recorded here and the run
//! continues; callers inspect the collected diagnostics afterwards.
//!
//! Fatal conditions go through [`crate::Error`] instead.

use std::fmt;

/// How serious a recorded condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
pub enum DiagnosticSeverity {
    /// Informational note
    #[strum(serialize = "INFO")]
    Info,
    /// Degraded analysis, results may be incomplete
    #[strum(serialize = "WARN")]
    Warning,
    /// A problem that would have been fatal in strict mode
    #[strum(serialize = "ERROR")]
    Error,
}

/// Which stage of processing recorded the condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DiagnosticCategory {
    /// Reference and forwarder resolution
    #[strum(serialize = "resolution")]
    Resolution,
    /// Element mapping
    #[strum(serialize = "mapping")]
    Mapping,
    /// Shim model construction
    #[strum(serialize = "shim-model")]
    ShimModel,
    /// IL and signature rewriting
    #[strum(serialize = "rewrite")]
    Rewrite,
}

/// A single recorded condition.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity of the condition
    pub severity: DiagnosticSeverity,
    /// Processing stage that recorded it
    pub category: DiagnosticCategory,
    /// Human-readable description
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)
    }
}

/// An append-only collector of diagnostics for one processing run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Records an informational note.
    pub fn info(&mut self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(DiagnosticSeverity::Info, category, message);
    }

    /// Records a warning.
    pub fn warn(&mut self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(DiagnosticSeverity::Warning, category, message);
    }

    /// Records an error-severity condition.
    pub fn error(&mut self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(DiagnosticSeverity::Error, category, message);
    }

    fn push(
        &mut self,
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) {
        self.entries.push(Diagnostic {
            severity,
            category,
            message: message.into(),
        });
    }

    /// Iterates over all recorded diagnostics in order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether anything at [`DiagnosticSeverity::Warning`] or above was recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity >= DiagnosticSeverity::Warning)
    }
}
