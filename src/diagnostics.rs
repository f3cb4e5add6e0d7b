//! Structured diagnostics collector.
//!
//! The layout pipeline never aborts on a degraded input; it records a
//! typed [`Diagnostic`] and keeps going. Callers pass a [`Diagnostics`]
//! collector down the pipeline and inspect it afterwards. Tests use it
//! to assert on warning behavior without capturing any output stream.

use serde::{Deserialize, Serialize};

/// Category of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Empty or malformed dataset/labels; the result is an empty structure.
    InvalidInput,
    /// Unrecognized strategy name; the sign-based strategy is used instead.
    UnknownStrategy,
    /// A point or sector was skipped or clamped (NaN position, missing
    /// feature, index out of range).
    ComputationAnomaly,
    /// Parent/child span mismatch or orphaned sector found by the
    /// validation pass.
    StructuralInconsistency,
}

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Category of the condition.
    pub kind: DiagnosticKind,
    /// Human-readable description.
    pub message: String,
    /// Ring index the condition occurred in, when known.
    pub ring: Option<usize>,
    /// Primary point id involved, when known.
    pub point: Option<u64>,
}

/// Accumulates diagnostics over one render pass.
///
/// # Examples
///
/// ```
/// use anillo::diagnostics::{DiagnosticKind, Diagnostics};
///
/// let mut diags = Diagnostics::new();
/// diags.record(DiagnosticKind::InvalidInput, "empty dataset");
/// assert_eq!(diags.len(), 1);
/// assert_eq!(diags.count_of(DiagnosticKind::InvalidInput), 1);
/// ```
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic with no ring or point context.
    pub fn record(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.records.push(Diagnostic {
            kind,
            message: message.into(),
            ring: None,
            point: None,
        });
    }

    /// Records a diagnostic attributed to a ring.
    pub fn record_for_ring(
        &mut self,
        kind: DiagnosticKind,
        ring: usize,
        message: impl Into<String>,
    ) {
        self.records.push(Diagnostic {
            kind,
            message: message.into(),
            ring: Some(ring),
            point: None,
        });
    }

    /// Records a diagnostic attributed to a point within a ring.
    pub fn record_for_point(
        &mut self,
        kind: DiagnosticKind,
        ring: Option<usize>,
        point: Option<u64>,
        message: impl Into<String>,
    ) {
        self.records.push(Diagnostic {
            kind,
            message: message.into(),
            ring,
            point,
        });
    }

    /// Appends already-built diagnostics (used by the validation pass).
    pub fn extend(&mut self, records: impl IntoIterator<Item = Diagnostic>) {
        self.records.extend(records);
    }

    /// Returns the recorded diagnostics in order.
    #[must_use]
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of diagnostics of a given kind.
    #[must_use]
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.records.iter().filter(|d| d.kind == kind).count()
    }

    /// Drains the collector, returning the accumulated records.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.records)
    }
}
