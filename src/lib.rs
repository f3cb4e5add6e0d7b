//! Anillo: hierarchical sunburst layout engine in pure Rust.
//!
//! Anillo turns multi-dimensional point datasets into the geometry of
//! nested circular ("sunburst") diagrams: each dimension group becomes
//! a ring, rings divide into sectors through a configurable binary
//! classification of coordinates, and points get concrete coordinates
//! with connection lines trackable across rings. The same ring/sector
//! geometry can display a Gini decision tree as a radial hierarchy.
//!
//! Rendering, I/O, and UI state are deliberately out of scope; the
//! crate computes pure layout data for an external renderer.
//!
//! # Quick Start
//!
//! ```
//! use anillo::prelude::*;
//!
//! let subspace = Subspace::new(
//!     "AB",
//!     vec!["A".to_string(), "B".to_string()],
//!     vec![
//!         RawPoint::single(1, vec![1.0, 1.0]),
//!         RawPoint::single(2, vec![-1.0, 1.0]),
//!         RawPoint::single(3, vec![1.0, -1.0]),
//!         RawPoint::single(4, vec![-1.0, -1.0]),
//!     ],
//! ).unwrap();
//! let dataset = Dataset::new(vec![subspace]).unwrap();
//!
//! let mut diagnostics = Diagnostics::new();
//! let layout = compute_layout(
//!     &dataset,
//!     TransformStrategy::PositiveNegative,
//!     ViewMode::Normal,
//!     &TransformOptions::default(),
//!     None,
//!     &LayoutConfig::default(),
//!     &mut diagnostics,
//! );
//!
//! // One point per quadrant sector.
//! assert_eq!(layout.sector_counts[0], vec![1, 1, 1, 1]);
//! assert_eq!(layout.total_positions(), 4);
//! ```
//!
//! # Modules
//!
//! - [`data`]: Points, subspaces, labels, and classified-point records
//! - [`transform`]: The six coordinate classification strategies
//! - [`sector`]: Bit-vector sector indexing and per-sector counting
//! - [`angle`]: Proportional angular spans with span conservation
//! - [`ring`]: Ring structure construction (subspaces or tree levels)
//! - [`position`]: Point placement within rings
//! - [`tree`]: Radial decision tree induction (Gini, arena nodes)
//! - [`color`]: Deterministic ring/sector colors
//! - [`pipeline`]: One-call orchestration into a [`pipeline::SunburstLayout`]
//! - [`validate`]: Optional structural consistency checks
//! - [`diagnostics`]: Structured warning collection
//! - [`error`]: Constructor-level error type

pub mod angle;
pub mod color;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod position;
pub mod prelude;
pub mod ring;
pub mod sector;
pub mod transform;
pub mod tree;
pub mod validate;

pub use error::{AnilloError, Result};
pub use pipeline::{compute_layout, SunburstLayout};
