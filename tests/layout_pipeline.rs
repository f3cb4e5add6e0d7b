//! End-to-end layout scenarios over the full pipeline.

use anillo::data::{Dataset, LabelMap, RawPoint, Subspace};
use anillo::diagnostics::{DiagnosticKind, Diagnostics};
use anillo::pipeline::compute_layout;
use anillo::position::{LayoutConfig, ViewMode};
use anillo::ring::build_rings;
use anillo::transform::{TransformOptions, TransformStrategy};
use anillo::validate::validate_layout;
use std::f64::consts::TAU;

fn subspace(key: &str, dims: &[&str], points: Vec<(u64, Vec<f64>)>) -> Subspace {
    Subspace::new(
        key,
        dims.iter().map(|d| (*d).to_string()).collect(),
        points
            .into_iter()
            .map(|(id, values)| RawPoint::single(id, values))
            .collect(),
    )
    .expect("valid subspace")
}

fn quadrant_dataset() -> Dataset {
    Dataset::new(vec![subspace(
        "AB",
        &["A", "B"],
        vec![
            (1, vec![1.0, 1.0]),
            (2, vec![-1.0, 1.0]),
            (3, vec![1.0, -1.0]),
            (4, vec![-1.0, -1.0]),
        ],
    )])
    .expect("dataset")
}

#[test]
fn quadrant_points_land_in_distinct_sectors() {
    let mut diags = Diagnostics::new();
    let layout = compute_layout(
        &quadrant_dataset(),
        TransformStrategy::PositiveNegative,
        ViewMode::Normal,
        &TransformOptions::default(),
        None,
        &LayoutConfig::default(),
        &mut diags,
    );

    // Bit vectors 11, 01, 10, 00 map to sectors 3, 1, 2, 0.
    assert_eq!(layout.sector_counts[0], vec![1, 1, 1, 1]);
    let sectors_by_id: Vec<(u64, usize)> = layout.positions[0]
        .iter()
        .map(|p| (p.ids[0], p.sector_index))
        .collect();
    for (id, sector) in sectors_by_id {
        let expected = match id {
            1 => 3,
            2 => 1,
            3 => 2,
            4 => 0,
            _ => unreachable!(),
        };
        assert_eq!(sector, expected, "point {id}");
    }
}

#[test]
fn empty_dataset_produces_empty_rings_without_panic() {
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
fn two_point_tree_splits_once() {
    let dataset = Dataset::new(vec![subspace(
        "all",
        &["x"],
        vec![(1, vec![0.0]), (2, vec![10.0])],
    )])
    .expect("dataset");
    let labels = LabelMap::new()
        .with_class("low", vec![1])
        .with_class("high", vec![2]);
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

    let tree = &layout.tree.as_ref().expect("tree artifacts").tree;
    assert_eq!(tree.nodes().len(), 3);
    let root = tree.root();
    assert!(root.gini > 0.0);
    assert_eq!(root.samples, 2);
    let left = tree.node(root.left.expect("left"));
    let right = tree.node(root.right.expect("right"));
    assert_eq!(left.samples + right.samples, root.samples);
    assert_eq!(left.gini, 0.0);
    assert_eq!(right.gini, 0.0);
    assert_eq!(root.start_angle, 0.0);
    assert!((root.end_angle - TAU).abs() < 1e-9);

    assert!(validate_layout(&layout).is_empty());
}

#[test]
fn hidden_empty_sectors_get_zero_span() {
    // Four sectors, only two occupied.
    let dataset = Dataset::new(vec![subspace(
        "AB",
        &["A", "B"],
        vec![
            (1, vec![1.0, 1.0]),
            (2, vec![1.0, 1.0]),
            (3, vec![-1.0, -1.0]),
            (4, vec![-1.0, -1.0]),
        ],
    )])
    .expect("dataset");
    let mut diags = Diagnostics::new();
    let config = LayoutConfig::default().with_show_empty_sectors(false);
    let layout = compute_layout(
        &dataset,
        TransformStrategy::PositiveNegative,
        ViewMode::Proportional,
        &TransformOptions::default(),
        None,
        &config,
        &mut diags,
    );
    let angles = &layout.sector_angles.expect("angles")[0];
    let nonzero: Vec<&f64> = angles.iter().filter(|&&a| a > 0.0).collect();
    assert_eq!(nonzero.len(), 2);
    assert!((angles.iter().sum::<f64>() - TAU).abs() < 1e-9);
}

#[test]
fn constant_dimension_z_score_is_well_defined() {
    let dataset = Dataset::new(vec![subspace(
        "AB",
        &["A", "B"],
        vec![
            (1, vec![5.0, 1.0]),
            (2, vec![5.0, -1.0]),
            (3, vec![5.0, 2.0]),
        ],
    )])
    .expect("dataset");
    let mut diags = Diagnostics::new();
    let layout = compute_layout(
        &dataset,
        TransformStrategy::ZScore,
        ViewMode::Normal,
        &TransformOptions::default(),
        None,
        &LayoutConfig::default(),
        &mut diags,
    );
    // All three points classify consistently on the constant dimension.
    assert_eq!(layout.sector_counts[0].iter().sum::<usize>(), 3);
    for position in &layout.positions[0] {
        assert!(position.x.is_finite() && position.y.is_finite());
    }
}

#[test]
fn every_point_counted_exactly_once_per_ring() {
    let dataset = Dataset::new(vec![
        subspace(
            "A",
            &["A"],
            vec![(1, vec![0.3]), (2, vec![-0.7]), (3, vec![2.2])],
        ),
        subspace(
            "AB",
            &["A", "B"],
            vec![
                (1, vec![0.3, 1.1]),
                (2, vec![-0.7, -0.2]),
                (3, vec![2.2, 0.0]),
            ],
        ),
    ])
    .expect("dataset");
    for strategy in [
        TransformStrategy::PositiveNegative,
        TransformStrategy::ZScore,
        TransformStrategy::Percentile,
        TransformStrategy::CustomThreshold,
        TransformStrategy::Radial,
    ] {
        let mut diags = Diagnostics::new();
        let layout = compute_layout(
            &dataset,
            strategy,
            ViewMode::Normal,
            &TransformOptions::default(),
            None,
            &LayoutConfig::default(),
            &mut diags,
        );
        for (ring, counts) in layout.rings.iter().zip(&layout.sector_counts) {
            assert_eq!(
                counts.iter().sum::<usize>(),
                ring.points.len(),
                "strategy {:?}, ring {}",
                strategy,
                ring.key
            );
        }
    }
}

#[test]
fn span_conservation_across_rings() {
    let dataset = Dataset::new(vec![
        subspace(
            "A",
            &["A"],
            vec![(1, vec![1.0]), (2, vec![-1.0]), (3, vec![0.5]), (4, vec![-2.0])],
        ),
        subspace(
            "AB",
            &["A", "B"],
            vec![
                (1, vec![1.0, 3.0]),
                (2, vec![-1.0, -3.0]),
                (3, vec![0.5, 0.5]),
                (4, vec![-2.0, 1.0]),
            ],
        ),
    ])
    .expect("dataset");
    let mut diags = Diagnostics::new();
    let layout = compute_layout(
        &dataset,
        TransformStrategy::PositiveNegative,
        ViewMode::Proportional,
        &TransformOptions::default(),
        None,
        &LayoutConfig::default(),
        &mut diags,
    );
    let angles = layout.sector_angles.as_ref().expect("angles");
    for ring in 0..angles.len() - 1 {
        let inner: f64 = angles[ring].iter().sum();
        let outer: f64 = angles[ring + 1].iter().sum();
        assert!((inner - outer).abs() < 0.1, "ring {ring}: {inner} vs {outer}");
    }
    assert!(validate_layout(&layout).is_empty());
}

#[test]
fn pipeline_is_idempotent_for_every_strategy() {
    let dataset = quadrant_dataset();
    let labels = LabelMap::new()
        .with_class("pos", vec![1])
        .with_class("neg", vec![4]);
    let options = TransformOptions::default()
        .with_min_samples_leaf(1)
        .with_min_samples_split(2);
    let config = LayoutConfig::default();
    for strategy in [
        TransformStrategy::PositiveNegative,
        TransformStrategy::ZScore,
        TransformStrategy::Percentile,
        TransformStrategy::CustomThreshold,
        TransformStrategy::Radial,
        TransformStrategy::DecisionTree,
    ] {
        let mut diags = Diagnostics::new();
        let first = compute_layout(
            &dataset,
            strategy,
            ViewMode::Proportional,
            &options,
            Some(&labels),
            &config,
            &mut diags,
        );
        let second = compute_layout(
            &dataset,
            strategy,
            ViewMode::Proportional,
            &options,
            Some(&labels),
            &config,
            &mut diags,
        );
        assert_eq!(first.sector_counts, second.sector_counts, "{strategy:?}");
        assert_eq!(first.sector_angles, second.sector_angles, "{strategy:?}");
        assert_eq!(first.positions, second.positions, "{strategy:?}");
    }
}

#[test]
fn connections_track_shared_point_ids_across_rings() {
    let dataset = Dataset::new(vec![
        subspace("A", &["A"], vec![(1, vec![1.0]), (2, vec![-1.0])]),
        subspace(
            "AB",
            &["A", "B"],
            vec![(1, vec![1.0, 2.0]), (2, vec![-1.0, -2.0])],
        ),
    ])
    .expect("dataset");
    let mut diags = Diagnostics::new();
    let layout = compute_layout(
        &dataset,
        TransformStrategy::PositiveNegative,
        ViewMode::Normal,
        &TransformOptions::default(),
        None,
        &LayoutConfig::default(),
        &mut diags,
    );
    // Point 1 appears once per ring with the same id, so the renderer
    // can draw its inter-ring connection.
    let occurrences: usize = layout
        .positions
        .iter()
        .flatten()
        .filter(|p| p.ids.contains(&1))
        .count();
    assert_eq!(occurrences, 2);
}

#[test]
fn json_dataset_deserializes_and_lays_out() {
    let json = r#"{
        "subspaces": [{
            "key": "XY",
            "dimensions": ["X", "Y"],
            "points": [
                { "ids": [1], "values": [0.5, -0.5] },
                { "ids": [2], "values": [-0.5, 0.5] }
            ]
        }]
    }"#;
    let dataset: Dataset = serde_json::from_str(json).expect("deserialize dataset");
    let mut diags = Diagnostics::new();
    let layout = compute_layout(
        &dataset,
        TransformStrategy::PositiveNegative,
        ViewMode::Normal,
        &TransformOptions::default(),
        None,
        &LayoutConfig::default(),
        &mut diags,
    );
    assert_eq!(layout.total_positions(), 2);
}

#[test]
fn unknown_strategy_name_degrades_to_sign_classification() {
    let mut diags = Diagnostics::new();
    let strategy = TransformStrategy::from_name("voronoi", &mut diags);
    assert_eq!(strategy, TransformStrategy::PositiveNegative);
    assert_eq!(diags.count_of(DiagnosticKind::UnknownStrategy), 1);

    let layout = compute_layout(
        &quadrant_dataset(),
        strategy,
        ViewMode::Normal,
        &TransformOptions::default(),
        None,
        &LayoutConfig::default(),
        &mut diags,
    );
    assert_eq!(layout.sector_counts[0], vec![1, 1, 1, 1]);
}
