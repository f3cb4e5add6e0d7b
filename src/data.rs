//! Typed data model for point datasets.
//!
//! A [`Subspace`] carries an explicit, ordered dimension list shared by
//! every pass over its points (classification, counting, placement).
//! Classification never mutates a [`RawPoint`]; it produces a
//! [`ClassifiedPoint`] embedding the original verbatim.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{AnilloError, Result};
use serde::{Deserialize, Serialize};

/// Class name assigned to points matching no label bucket.
pub const UNLABELED: &str = "unlabeled";

/// An immutable input point: one or more identifiers plus coordinate
/// values aligned with the owning subspace's dimension list.
///
/// Points shared across subspaces carry several ids; the first is the
/// primary id used for diagnostics and connection drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    /// Point identifiers (at least one for meaningful output).
    pub ids: Vec<u64>,
    /// Coordinate values, one per subspace dimension, in order.
    pub values: Vec<f64>,
}

impl RawPoint {
    /// Creates a point from identifiers and values.
    #[must_use]
    pub fn new(ids: Vec<u64>, values: Vec<f64>) -> Self {
        Self { ids, values }
    }

    /// Creates a point with a single identifier.
    #[must_use]
    pub fn single(id: u64, values: Vec<f64>) -> Self {
        Self {
            ids: vec![id],
            values,
        }
    }

    /// Primary identifier, if any.
    #[must_use]
    pub fn primary_id(&self) -> Option<u64> {
        self.ids.first().copied()
    }
}

/// One dimension group: a key, an ordered dimension list, and points.
///
/// The dimension order is the single source of truth for bit-vector
/// construction; all passes consume it identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subspace {
    key: String,
    dimensions: Vec<String>,
    points: Vec<RawPoint>,
}

impl Subspace {
    /// Creates a subspace, validating that every point carries exactly
    /// one value per dimension.
    ///
    /// # Errors
    ///
    /// Returns [`AnilloError::DimensionMismatch`] if any point's value
    /// count differs from the dimension count.
    pub fn new(
        key: impl Into<String>,
        dimensions: Vec<String>,
        points: Vec<RawPoint>,
    ) -> Result<Self> {
        let key = key.into();
        for point in &points {
            if point.values.len() != dimensions.len() {
                return Err(AnilloError::DimensionMismatch {
                    expected: format!("{} values per point in '{key}'", dimensions.len()),
                    actual: format!("{}", point.values.len()),
                });
            }
        }
        Ok(Self {
            key,
            dimensions,
            points,
        })
    }

    /// Subspace key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Ordered dimension names.
    #[must_use]
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Points in this subspace.
    #[must_use]
    pub fn points(&self) -> &[RawPoint] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the subspace holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// An ordered collection of subspaces keyed uniquely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    subspaces: Vec<Subspace>,
}

impl Dataset {
    /// Creates a dataset, rejecting duplicate subspace keys.
    ///
    /// # Errors
    ///
    /// Returns [`AnilloError::DuplicateKey`] when two subspaces share a
    /// key.
    pub fn new(subspaces: Vec<Subspace>) -> Result<Self> {
        let mut keys: Vec<&str> = subspaces.iter().map(|s| s.key()).collect();
        keys.sort_unstable();
        for pair in keys.windows(2) {
            if pair[0] == pair[1] {
                return Err(AnilloError::DuplicateKey {
                    key: pair[0].to_string(),
                });
            }
        }
        Ok(Self { subspaces })
    }

    /// The empty dataset.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The subspaces in insertion order.
    #[must_use]
    pub fn subspaces(&self) -> &[Subspace] {
        &self.subspaces
    }

    /// True when there are no subspaces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subspaces.is_empty()
    }

    /// Total point count across subspaces.
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.subspaces.iter().map(Subspace::len).sum()
    }

    /// Merges all subspaces into one flat subspace for tree induction.
    ///
    /// Subspaces whose dimension list matches the first subspace's are
    /// concatenated; mismatched subspaces are skipped with a
    /// diagnostic. Returns `None` for an empty dataset.
    pub fn flattened(&self, diagnostics: &mut Diagnostics) -> Option<Subspace> {
        let first = self.subspaces.first()?;
        let dimensions = first.dimensions().to_vec();
        let mut points = Vec::new();
        for subspace in &self.subspaces {
            if subspace.dimensions() == dimensions.as_slice() {
                points.extend(subspace.points().iter().cloned());
            } else {
                diagnostics.record(
                    DiagnosticKind::ComputationAnomaly,
                    format!(
                        "subspace '{}' skipped in flattening: dimension list differs from '{}'",
                        subspace.key(),
                        first.key()
                    ),
                );
            }
        }
        // Arity was validated per subspace, so this cannot fail.
        Subspace::new("all", dimensions, points).ok()
    }
}

/// Label classes mapped to point ids, in insertion order.
///
/// Insertion order matters: a point listed under several classes counts
/// toward the first, and majority ties break toward the earlier class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelMap {
    labels: Vec<(String, Vec<u64>)>,
}

impl LabelMap {
    /// Creates an empty label map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class with its point ids.
    #[must_use]
    pub fn with_class(mut self, name: impl Into<String>, ids: Vec<u64>) -> Self {
        self.labels.push((name.into(), ids));
        self
    }

    /// Class names in insertion order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|(name, _)| name.as_str())
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no classes are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// First class containing any of the given ids, or [`UNLABELED`].
    #[must_use]
    pub fn class_of(&self, ids: &[u64]) -> &str {
        for (name, members) in &self.labels {
            if ids.iter().any(|id| members.contains(id)) {
                return name;
            }
        }
        UNLABELED
    }
}

/// An entry recorded while routing a point through the decision tree,
/// one per visited depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAssignment {
    /// Arena id of the visited node.
    pub node_id: usize,
    /// Depth of the visited node (0 = root).
    pub depth: usize,
    /// Node's position within its depth level.
    pub sector_index: usize,
    /// Split feature at this node, `None` for leaves.
    pub feature: Option<String>,
    /// Split threshold at this node, `None` for leaves.
    pub threshold: Option<f64>,
    /// Whether the visited node is a leaf.
    pub is_leaf: bool,
    /// Start of the node's angular wedge, radians.
    pub start_angle: f64,
    /// End of the node's angular wedge, radians.
    pub end_angle: f64,
}

impl NodeAssignment {
    /// Angular span of the assigned wedge.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}

/// The classification signal attached to a point by a transform
/// strategy. Tagged so downstream passes dispatch without string
/// comparison or shape sniffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Classification {
    /// One 0/1 flag per dimension, in dimension order.
    Binary(Vec<u8>),
    /// Continuous angle in radians (radial strategy).
    Angular(f64),
    /// Root-to-leaf routing through the decision tree.
    Tree {
        /// One assignment per visited depth.
        assignments: Vec<NodeAssignment>,
        /// Majority class of the terminal node.
        predicted_class: String,
    },
}

/// A raw point plus the classification a strategy produced for it.
///
/// The embedded raw point is preserved verbatim; enrichment never
/// mutates input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedPoint {
    /// The original point, unmodified.
    pub raw: RawPoint,
    /// Strategy output for this point.
    pub classification: Classification,
}

impl ClassifiedPoint {
    /// Binary flags, if this point was classified by a binary strategy.
    #[must_use]
    pub fn binary_flags(&self) -> Option<&[u8]> {
        match &self.classification {
            Classification::Binary(flags) => Some(flags),
            _ => None,
        }
    }

    /// Angle in radians, if classified by the radial strategy.
    #[must_use]
    pub fn angle(&self) -> Option<f64> {
        match &self.classification {
            Classification::Angular(angle) => Some(*angle),
            _ => None,
        }
    }

    /// Tree assignment at the given depth, if any.
    #[must_use]
    pub fn assignment_at(&self, depth: usize) -> Option<&NodeAssignment> {
        match &self.classification {
            Classification::Tree { assignments, .. } => {
                assignments.iter().find(|a| a.depth == depth)
            }
            _ => None,
        }
    }
}
