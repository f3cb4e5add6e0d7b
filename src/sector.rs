//! Bit-vector sector indexing and per-sector counting.
//!
//! A binary-classified point maps to a sector by reading its
//! per-dimension flags as a base-2 integer, first dimension most
//! significant. The same classified points feed both the counting and
//! placement passes, so the mapping is identical in both.

use crate::data::{Classification, ClassifiedPoint};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::ring::Ring;

/// Renders binary flags as a bit string, e.g. `[1, 0, 1]` to `"101"`.
#[must_use]
pub fn bit_vector(flags: &[u8]) -> String {
    flags.iter().map(|&flag| char::from(b'0' + flag)).collect()
}

/// Sector index of a classified point within a ring.
///
/// Binary: fold the flags as base-2 and clamp to `sectors - 1` (guards
/// dimension-count mismatches). A point with no usable dimensions
/// lands in sector 0 with a warning. Angular: always sector 0. Tree:
/// the node's pre-assigned index within its depth level.
pub fn sector_index(
    point: &ClassifiedPoint,
    ring_index: usize,
    sectors: usize,
    diagnostics: &mut Diagnostics,
) -> usize {
    match &point.classification {
        Classification::Binary(flags) => {
            if flags.is_empty() {
                diagnostics.record_for_point(
                    DiagnosticKind::ComputationAnomaly,
                    Some(ring_index),
                    point.raw.primary_id(),
                    "no usable dimensions, assigning sector 0",
                );
                return 0;
            }
            let value = flags
                .iter()
                .fold(0usize, |acc, &flag| acc * 2 + flag as usize);
            value.min(sectors.saturating_sub(1))
        }
        Classification::Angular(_) => 0,
        Classification::Tree { .. } => match point.assignment_at(ring_index) {
            Some(assignment) => assignment.sector_index,
            None => {
                diagnostics.record_for_point(
                    DiagnosticKind::ComputationAnomaly,
                    Some(ring_index),
                    point.raw.primary_id(),
                    "no node assignment at this depth, assigning sector 0",
                );
                0
            }
        },
    }
}

/// Counts points per sector for one ring.
///
/// Every point lands in exactly one bucket; an out-of-range index is
/// skipped with a diagnostic rather than aborting the ring.
pub fn sector_counts(ring: &Ring, diagnostics: &mut Diagnostics) -> Vec<usize> {
    let mut counts = vec![0usize; ring.sectors];
    if ring.sectors == 0 {
        return counts;
    }
    for point in &ring.points {
        let index = sector_index(point, ring.ring_index, ring.sectors, diagnostics);
        if index < counts.len() {
            counts[index] += 1;
        } else {
            diagnostics.record_for_point(
                DiagnosticKind::ComputationAnomaly,
                Some(ring.ring_index),
                point.raw.primary_id(),
                format!("invalid sector index {index} for {} sectors", ring.sectors),
            );
        }
    }
    counts
}
