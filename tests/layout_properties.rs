//! Property-based tests using proptest.
//!
//! These tests verify the counting and angular-span invariants of the
//! layout engine under generated datasets.

use anillo::angle::proportional_sector_angles;
use anillo::data::{Dataset, RawPoint, Subspace};
use anillo::diagnostics::Diagnostics;
use anillo::pipeline::compute_layout;
use anillo::position::{LayoutConfig, ViewMode};
use anillo::sector::{bit_vector, sector_index};
use anillo::transform::{TransformOptions, TransformStrategy};
use anillo::data::{Classification, ClassifiedPoint};
use proptest::prelude::*;
use std::f64::consts::TAU;

// Strategy for generating a two-dimensional subspace of bounded size.
fn points_strategy(max_points: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    proptest::collection::vec(
        proptest::collection::vec(-100.0f64..100.0, 2),
        1..=max_points,
    )
}

fn dataset_from(values: Vec<Vec<f64>>) -> Dataset {
    let points = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| RawPoint::single(i as u64 + 1, v))
        .collect();
    let subspace = Subspace::new(
        "AB",
        vec!["A".to_string(), "B".to_string()],
        points,
    )
    .expect("valid subspace");
    Dataset::new(vec![subspace]).expect("dataset")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn counts_conserve_points(values in points_strategy(40)) {
        let n = values.len();
        let dataset = dataset_from(values);
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
        prop_assert_eq!(layout.sector_counts[0].iter().sum::<usize>(), n);
        prop_assert_eq!(layout.total_positions(), n);
    }

    #[test]
    fn outermost_spans_sum_to_full_circle(
        counts in proptest::collection::vec(0usize..20, 2..=16),
        show_empty in any::<bool>(),
    ) {
        prop_assume!(counts.iter().sum::<usize>() > 0);
        let angles = proportional_sector_angles(&[counts], show_empty);
        let total: f64 = angles[0].iter().sum();
        prop_assert!((total - TAU).abs() < 1e-6, "total span {total}");
    }

    #[test]
    fn spans_are_never_negative(
        counts in proptest::collection::vec(0usize..20, 1..=16),
        show_empty in any::<bool>(),
    ) {
        let angles = proportional_sector_angles(&[counts], show_empty);
        for &span in &angles[0] {
            prop_assert!(span >= 0.0);
        }
    }

    #[test]
    fn sector_index_deterministic(flags in proptest::collection::vec(0u8..=1, 0..6)) {
        let sectors = 1usize << flags.len().max(1);
        let point = ClassifiedPoint {
            raw: RawPoint::single(1, vec![0.0; flags.len()]),
            classification: Classification::Binary(flags.clone()),
        };
        let mut diags = Diagnostics::new();
        let first = sector_index(&point, 0, sectors, &mut diags);
        let second = sector_index(&point, 0, sectors, &mut diags);
        prop_assert_eq!(first, second);
        prop_assert!(first < sectors);
        // The index is exactly the bit string read as base 2.
        if !flags.is_empty() {
            let expected = usize::from_str_radix(&bit_vector(&flags), 2).expect("binary");
            prop_assert_eq!(first, expected.min(sectors - 1));
        }
    }

    #[test]
    fn positions_are_always_finite(values in points_strategy(30)) {
        let dataset = dataset_from(values);
        for strategy in [
            TransformStrategy::PositiveNegative,
            TransformStrategy::ZScore,
            TransformStrategy::Percentile,
            TransformStrategy::Radial,
        ] {
            let mut diags = Diagnostics::new();
            let layout = compute_layout(
                &dataset,
                strategy,
                ViewMode::Proportional,
                &TransformOptions::default(),
                None,
                &LayoutConfig::default(),
                &mut diags,
            );
            for position in layout.positions.iter().flatten() {
                prop_assert!(position.x.is_finite());
                prop_assert!(position.y.is_finite());
            }
        }
    }
}
