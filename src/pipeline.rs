//! Full layout orchestration.
//!
//! One call takes a dataset from raw points to a renderer-ready
//! [`SunburstLayout`]: rings, per-sector counts, angular spans, point
//! positions, and (in tree mode) the fitted tree with its edges.
//! Everything is recomputed per call; there is no incremental update.

use crate::angle::proportional_sector_angles;
use crate::data::{Dataset, LabelMap};
use crate::position::{point_positions, LayoutConfig, PointPosition, ViewMode};
use crate::ring::{build_rings, Ring};
use crate::sector::sector_counts;
use crate::transform::{TransformOptions, TransformStrategy};
use crate::tree::DecisionTree;
use crate::diagnostics::Diagnostics;
use serde::{Deserialize, Serialize};

/// Tree artifacts for edge drawing in tree mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeLayout {
    /// The fitted tree (nodes carry wedges and per-class counts).
    pub tree: DecisionTree,
    /// Parent-to-child node id pairs.
    pub connections: Vec<(usize, usize)>,
}

/// Everything the external renderer consumes for one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunburstLayout {
    /// Ordered rings, innermost first.
    pub rings: Vec<Ring>,
    /// Point counts per sector per ring.
    pub sector_counts: Vec<Vec<usize>>,
    /// Angular spans per sector per ring; `Some` in proportional view
    /// and in tree mode (node wedges), `None` otherwise.
    pub sector_angles: Option<Vec<Vec<f64>>>,
    /// Placed points, one list per ring.
    pub positions: Vec<Vec<PointPosition>>,
    /// Present only in tree mode.
    pub tree: Option<TreeLayout>,
}

impl SunburstLayout {
    /// The empty layout produced for degenerate input.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rings: Vec::new(),
            sector_counts: Vec::new(),
            sector_angles: None,
            positions: Vec::new(),
            tree: None,
        }
    }

    /// Total number of placed points across rings.
    #[must_use]
    pub fn total_positions(&self) -> usize {
        self.positions.iter().map(Vec::len).sum()
    }
}

/// Computes the complete layout for a dataset.
///
/// An empty or degenerate dataset yields [`SunburstLayout::empty`]
/// with a diagnostic; this function never panics on input shape.
pub fn compute_layout(
    dataset: &Dataset,
    strategy: TransformStrategy,
    view_mode: ViewMode,
    options: &TransformOptions,
    labels: Option<&LabelMap>,
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
) -> SunburstLayout {
    let (rings, tree) = build_rings(dataset, strategy, options, labels, diagnostics);
    if rings.is_empty() {
        return SunburstLayout::empty();
    }

    let counts: Vec<Vec<usize>> = match &tree {
        // The tree already partitioned the data; read counts off its levels.
        Some(tree) => tree.sector_counts(),
        None => rings
            .iter()
            .map(|ring| sector_counts(ring, diagnostics))
            .collect(),
    };

    let sector_angles = match (&tree, view_mode) {
        (Some(tree), _) => Some(tree.level_spans()),
        (None, ViewMode::Proportional) => Some(proportional_sector_angles(
            &counts,
            config.show_empty_sectors,
        )),
        (None, ViewMode::Normal) => None,
    };

    let ring_count = rings.len();
    let positions = rings
        .iter()
        .map(|ring| {
            let inner = ring.ring_index as f64 / ring_count as f64 * config.max_radius;
            let outer = (ring.ring_index + 1) as f64 / ring_count as f64 * config.max_radius;
            let spans = sector_angles
                .as_ref()
                .and_then(|angles| angles.get(ring.ring_index))
                .map(Vec::as_slice);
            point_positions(ring, inner, outer, spans, view_mode, config, diagnostics)
        })
        .collect();

    let tree = tree.map(|tree| {
        let connections = tree.connections();
        TreeLayout { tree, connections }
    });

    SunburstLayout {
        rings,
        sector_counts: counts,
        sector_angles,
        positions,
        tree,
    }
}
