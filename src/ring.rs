//! Ring structure construction.
//!
//! A ring is one subspace (non-tree strategies) or one tree depth
//! level (decision-tree strategy). Each ring caches the classified
//! points produced by a single transform pass; the counting and
//! placement passes both read that cache, so sector assignment cannot
//! desynchronize between them.

use crate::data::{ClassifiedPoint, Dataset, LabelMap, Subspace};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::transform::{classify, TransformOptions, TransformStrategy};
use crate::tree::DecisionTree;
use serde::{Deserialize, Serialize};

/// One ring of the diagram, innermost first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    /// Subspace key, or `TreeDepth{n}` in tree mode.
    pub key: String,
    /// Classified points placed in this ring.
    pub points: Vec<ClassifiedPoint>,
    /// Dimensionality of the subspace, or depth level (1-based).
    pub dimensions: usize,
    /// 0-based ring index, increasing outward.
    pub ring_index: usize,
    /// Sector count: `2^dimensions` normally, node count for a tree
    /// level, 1 for radial mode.
    pub sectors: usize,
    /// Strategy the ring was classified with.
    pub strategy: TransformStrategy,
}

/// Builds the ordered ring list for a dataset.
///
/// Non-tree strategies produce one ring per subspace, sorted by
/// ascending dimensionality (ties by key) so inner rings are coarser.
/// The decision-tree strategy fits one tree over the flattened dataset
/// and produces one ring per depth level; the fitted tree is returned
/// alongside for edge drawing.
///
/// An empty dataset yields an empty ring list and a diagnostic, never
/// a panic.
pub fn build_rings(
    dataset: &Dataset,
    strategy: TransformStrategy,
    options: &TransformOptions,
    labels: Option<&LabelMap>,
    diagnostics: &mut Diagnostics,
) -> (Vec<Ring>, Option<DecisionTree>) {
    if dataset.is_empty() {
        diagnostics.record(DiagnosticKind::InvalidInput, "empty dataset, no rings built");
        return (Vec::new(), None);
    }

    if strategy == TransformStrategy::DecisionTree {
        return build_tree_rings(dataset, options, labels, diagnostics);
    }

    let mut ordered: Vec<&Subspace> = dataset.subspaces().iter().collect();
    ordered.sort_by(|a, b| {
        a.dimensions()
            .len()
            .cmp(&b.dimensions().len())
            .then_with(|| a.key().cmp(b.key()))
    });

    let rings = ordered
        .into_iter()
        .enumerate()
        .map(|(ring_index, subspace)| Ring {
            key: subspace.key().to_string(),
            points: classify(subspace, strategy, options, labels, diagnostics),
            dimensions: subspace.dimensions().len(),
            ring_index,
            sectors: if strategy == TransformStrategy::Radial {
                1
            } else {
                1usize << subspace.dimensions().len()
            },
            strategy,
        })
        .collect();

    (rings, None)
}

fn build_tree_rings(
    dataset: &Dataset,
    options: &TransformOptions,
    labels: Option<&LabelMap>,
    diagnostics: &mut Diagnostics,
) -> (Vec<Ring>, Option<DecisionTree>) {
    let Some(flat) = dataset.flattened(diagnostics) else {
        diagnostics.record(
            DiagnosticKind::InvalidInput,
            "dataset could not be flattened for tree induction",
        );
        return (Vec::new(), None);
    };
    let Some(tree) = DecisionTree::fit(&flat, labels, options, diagnostics) else {
        return (Vec::new(), None);
    };

    let classified: Vec<ClassifiedPoint> = flat
        .points()
        .iter()
        .map(|point| tree.classify_point(point))
        .collect();

    let rings = tree
        .levels()
        .iter()
        .enumerate()
        .map(|(depth, level)| {
            // Points grouped node by node so sector order matches the
            // level's node order.
            let mut ring_points = Vec::new();
            for &node_id in level {
                for point in &classified {
                    if point.assignment_at(depth).map(|a| a.node_id) == Some(node_id) {
                        ring_points.push(point.clone());
                    }
                }
            }
            Ring {
                key: format!("TreeDepth{}", depth + 1),
                points: ring_points,
                dimensions: depth + 1,
                ring_index: depth,
                sectors: level.len(),
                strategy: TransformStrategy::DecisionTree,
            }
        })
        .collect();

    (rings, Some(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawPoint;

    fn nested_dataset() -> Dataset {
        let a = Subspace::new(
            "A",
            vec!["A".to_string()],
            vec![
                RawPoint::single(1, vec![1.0]),
                RawPoint::single(2, vec![-1.0]),
            ],
        )
        .expect("valid subspace");
        let ab = Subspace::new(
            "AB",
            vec!["A".to_string(), "B".to_string()],
            vec![
                RawPoint::single(1, vec![1.0, 1.0]),
                RawPoint::single(2, vec![-1.0, 1.0]),
            ],
        )
        .expect("valid subspace");
        // Insertion order deliberately reversed; the builder sorts.
        Dataset::new(vec![ab, a]).expect("dataset")
    }

    #[test]
    fn test_rings_sorted_by_dimensionality() {
        let mut diags = Diagnostics::new();
        let (rings, tree) = build_rings(
            &nested_dataset(),
            TransformStrategy::PositiveNegative,
            &TransformOptions::default(),
            None,
            &mut diags,
        );
        assert!(tree.is_none());
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].key, "A");
        assert_eq!(rings[0].ring_index, 0);
        assert_eq!(rings[0].sectors, 2);
        assert_eq!(rings[1].key, "AB");
        assert_eq!(rings[1].sectors, 4);
    }

    #[test]
    fn test_radial_rings_have_single_sector() {
        let mut diags = Diagnostics::new();
        let (rings, _) = build_rings(
            &nested_dataset(),
            TransformStrategy::Radial,
            &TransformOptions::default(),
            None,
            &mut diags,
        );
        assert!(rings.iter().all(|r| r.sectors == 1));
    }

    #[test]
    fn test_empty_dataset_yields_no_rings() {
        let mut diags = Diagnostics::new();
        let (rings, tree) = build_rings(
            &Dataset::empty(),
            TransformStrategy::PositiveNegative,
            &TransformOptions::default(),
            None,
            &mut diags,
        );
        assert!(rings.is_empty());
        assert!(tree.is_none());
        assert_eq!(diags.count_of(DiagnosticKind::InvalidInput), 1);
    }

    #[test]
    fn test_tree_rings_one_per_depth() {
        let subspace = Subspace::new(
            "all",
            vec!["x".to_string()],
            vec![
                RawPoint::single(1, vec![0.0]),
                RawPoint::single(2, vec![10.0]),
            ],
        )
        .expect("valid subspace");
        let dataset = Dataset::new(vec![subspace]).expect("dataset");
        let labels = LabelMap::new()
            .with_class("low", vec![1])
            .with_class("high", vec![2]);
        let options = TransformOptions::default()
            .with_min_samples_leaf(1)
            .with_min_samples_split(2);
        let mut diags = Diagnostics::new();
        let (rings, tree) = build_rings(
            &dataset,
            TransformStrategy::DecisionTree,
            &options,
            Some(&labels),
            &mut diags,
        );
        let tree = tree.expect("tree present");
        assert_eq!(rings.len(), tree.depth());
        assert_eq!(rings[0].key, "TreeDepth1");
        assert_eq!(rings[0].sectors, 1);
        assert_eq!(rings[0].points.len(), 2);
        assert_eq!(rings[1].sectors, 2);
        // Every point routed to depth 1 appears in the outer ring.
        assert_eq!(rings[1].points.len(), 2);
    }

    #[test]
    fn test_ring_caches_classified_points() {
        let mut diags = Diagnostics::new();
        let (rings, _) = build_rings(
            &nested_dataset(),
            TransformStrategy::PositiveNegative,
            &TransformOptions::default(),
            None,
            &mut diags,
        );
        for ring in &rings {
            for point in &ring.points {
                assert!(point.binary_flags().is_some());
            }
        }
    }
}
