//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use anillo::prelude::*;
//! ```

pub use crate::data::{Classification, ClassifiedPoint, Dataset, LabelMap, RawPoint, Subspace};
pub use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use crate::pipeline::{compute_layout, SunburstLayout};
pub use crate::position::{LayoutConfig, PointPosition, ViewMode};
pub use crate::ring::Ring;
pub use crate::transform::{MaxFeatures, TransformOptions, TransformStrategy};
pub use crate::tree::DecisionTree;
