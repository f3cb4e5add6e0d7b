//! Optional structural validation of a computed layout.
//!
//! Checks the invariants the geometry is supposed to uphold and
//! reports violations as diagnostics. Nothing here is enforced at
//! render time; the pass exists for tests and for callers that want a
//! consistency report alongside the layout.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::pipeline::SunburstLayout;
use crate::transform::TransformStrategy;
use std::f64::consts::TAU;

/// Tolerance for adjacent-ring span-sum conservation, radians.
pub const SPAN_TOLERANCE: f64 = 0.1;

/// Validates a layout, returning one diagnostic per violation.
#[must_use]
pub fn validate_layout(layout: &SunburstLayout) -> Vec<Diagnostic> {
    let mut findings = Vec::new();

    for (ring_index, ring) in layout.rings.iter().enumerate() {
        if let Some(counts) = layout.sector_counts.get(ring_index) {
            let total: usize = counts.iter().sum();
            if total != ring.points.len() {
                findings.push(structural(
                    Some(ring_index),
                    format!(
                        "ring '{}' counts {} points but holds {}",
                        ring.key,
                        total,
                        ring.points.len()
                    ),
                ));
            }
        }
    }

    let is_tree = layout
        .rings
        .first()
        .is_some_and(|ring| ring.strategy == TransformStrategy::DecisionTree);

    if let Some(angles) = &layout.sector_angles {
        // Leaves can terminate above the deepest level in tree mode, so
        // adjacent levels legitimately diverge there.
        if !is_tree {
            for ring_index in 0..angles.len().saturating_sub(1) {
                let inner: f64 = angles[ring_index].iter().sum();
                let outer: f64 = angles[ring_index + 1].iter().sum();
                if (inner - outer).abs() > SPAN_TOLERANCE {
                    findings.push(structural(
                        Some(ring_index),
                        format!(
                            "span sum {inner:.4} diverges from next ring's {outer:.4}"
                        ),
                    ));
                }
            }
        }

        for (ring_index, ring_angles) in angles.iter().enumerate() {
            let Some(counts) = layout.sector_counts.get(ring_index) else {
                continue;
            };
            for (sector, (&count, &span)) in
                counts.iter().zip(ring_angles.iter()).enumerate()
            {
                if count > 0 && span == 0.0 {
                    findings.push(structural(
                        Some(ring_index),
                        format!("sector {sector} holds {count} points but has zero span"),
                    ));
                }
            }
        }
    }

    if let Some(tree_layout) = &layout.tree {
        let tree = &tree_layout.tree;
        let root = tree.root();
        if root.start_angle != 0.0 || (root.end_angle - TAU).abs() > 1e-9 {
            findings.push(structural(
                None,
                format!(
                    "root wedge is [{:.4}, {:.4}], expected the full circle",
                    root.start_angle, root.end_angle
                ),
            ));
        }
        for node in tree.nodes() {
            if let (Some(left), Some(right)) = (node.left, node.right) {
                let child_samples = tree.node(left).samples + tree.node(right).samples;
                if child_samples != node.samples {
                    findings.push(structural(
                        Some(node.depth),
                        format!(
                            "node {} holds {} samples but its children hold {}",
                            node.node_id, node.samples, child_samples
                        ),
                    ));
                }
            }
            let count_sum: usize = node.class_counts.iter().map(|(_, count)| count).sum();
            if count_sum != node.samples {
                findings.push(structural(
                    Some(node.depth),
                    format!(
                        "node {} class counts sum to {} for {} samples",
                        node.node_id, count_sum, node.samples
                    ),
                ));
            }
            let children: Vec<usize> = [node.left, node.right].into_iter().flatten().collect();
            if !children.is_empty() {
                let child_span: f64 = children.iter().map(|&id| tree.node(id).span()).sum();
                if (child_span - node.span()).abs() > 1e-6 {
                    findings.push(structural(
                        Some(node.depth),
                        format!(
                            "node {} span {:.6} diverges from children's {:.6}",
                            node.node_id,
                            node.span(),
                            child_span
                        ),
                    ));
                }
            }
        }
    }

    findings
}

fn structural(ring: Option<usize>, message: String) -> Diagnostic {
    Diagnostic {
        kind: DiagnosticKind::StructuralInconsistency,
        message,
        ring,
        point: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, LabelMap, RawPoint, Subspace};
    use crate::diagnostics::Diagnostics;
    use crate::pipeline::compute_layout;
    use crate::position::{LayoutConfig, ViewMode};
    use crate::transform::TransformOptions;

    fn nested_dataset() -> Dataset {
        let a = Subspace::new(
            "A",
            vec!["A".to_string()],
            vec![
                RawPoint::single(1, vec![1.0]),
                RawPoint::single(2, vec![-2.0]),
                RawPoint::single(3, vec![3.0]),
            ],
        )
        .expect("valid subspace");
        let ab = Subspace::new(
            "AB",
            vec!["A".to_string(), "B".to_string()],
            vec![
                RawPoint::single(1, vec![1.0, 0.5]),
                RawPoint::single(2, vec![-2.0, -1.0]),
                RawPoint::single(3, vec![3.0, 2.0]),
            ],
        )
        .expect("valid subspace");
        Dataset::new(vec![a, ab]).expect("dataset")
    }

    #[test]
    fn test_clean_layout_passes() {
        let mut diags = Diagnostics::new();
        let layout = compute_layout(
            &nested_dataset(),
            TransformStrategy::PositiveNegative,
            ViewMode::Proportional,
            &TransformOptions::default(),
            None,
            &LayoutConfig::default(),
            &mut diags,
        );
        let findings = validate_layout(&layout);
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }

    #[test]
    fn test_corrupted_counts_detected() {
        let mut diags = Diagnostics::new();
        let mut layout = compute_layout(
            &nested_dataset(),
            TransformStrategy::PositiveNegative,
            ViewMode::Normal,
            &TransformOptions::default(),
            None,
            &LayoutConfig::default(),
            &mut diags,
        );
        layout.sector_counts[0][0] += 5;
        let findings = validate_layout(&layout);
        assert!(!findings.is_empty());
        assert!(findings[0].message.contains("counts"));
    }

    #[test]
    fn test_corrupted_spans_detected() {
        let mut diags = Diagnostics::new();
        let mut layout = compute_layout(
            &nested_dataset(),
            TransformStrategy::PositiveNegative,
            ViewMode::Proportional,
            &TransformOptions::default(),
            None,
            &LayoutConfig::default(),
            &mut diags,
        );
        if let Some(angles) = layout.sector_angles.as_mut() {
            angles[0][0] += 1.0;
        }
        let findings = validate_layout(&layout);
        assert!(findings
            .iter()
            .any(|f| f.kind == DiagnosticKind::StructuralInconsistency));
    }

    #[test]
    fn test_tree_layout_invariants_hold() {
        let subspace = Subspace::new(
            "all",
            vec!["x".to_string()],
            (0..12)
                .map(|i| RawPoint::single(i, vec![i as f64]))
                .collect(),
        )
        .expect("valid subspace");
        let dataset = Dataset::new(vec![subspace]).expect("dataset");
        let labels = LabelMap::new()
            .with_class("small", (0..6).collect())
            .with_class("large", (6..12).collect());
        let options = TransformOptions::default()
            .with_min_samples_leaf(1)
            .with_min_samples_split(2);
        let mut diags = Diagnostics::new();
        let layout = compute_layout(
            &dataset,
            TransformStrategy::DecisionTree,
            ViewMode::Normal,
            &options,
            Some(&labels),
            &LayoutConfig::default(),
            &mut diags,
        );
        let findings = validate_layout(&layout);
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }
}
