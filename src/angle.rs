//! Proportional angular span calculation.
//!
//! Spans are computed from the outermost ring inward. The outermost
//! ring divides the circle among its sectors proportionally to their
//! counts (reserving a minimum visible span for empties when they are
//! shown); each inner sector then inherits the summed spans of the
//! outer sub-sectors it covers, which keeps parent and child rings in
//! agreement.

use std::f64::consts::TAU;

/// Fraction of a sector's uniform share reserved for an empty sector
/// that must stay visible.
const MIN_ANGLE_FRACTION: f64 = 0.05;

/// Computes per-sector angular spans (radians) for every ring.
///
/// `sector_counts[ring][sector]` is the aggregated point count. With
/// `show_empty_sectors`, empty sectors keep a minimum span of
/// `0.05 * (2π / sectors)`; otherwise they get zero and are excluded
/// from rendering.
#[must_use]
pub fn proportional_sector_angles(
    sector_counts: &[Vec<usize>],
    show_empty_sectors: bool,
) -> Vec<Vec<f64>> {
    let ring_count = sector_counts.len();
    let mut angles: Vec<Vec<f64>> = vec![Vec::new(); ring_count];
    let mut active: Vec<Vec<bool>> = vec![Vec::new(); ring_count];

    for ring in (0..ring_count).rev() {
        let counts = &sector_counts[ring];
        let sectors = counts.len();

        if sectors == 1 {
            angles[ring] = vec![TAU];
            active[ring] = vec![true];
            continue;
        }

        if ring == ring_count - 1 {
            let (ring_angles, ring_active) = outermost_angles(counts, show_empty_sectors);
            angles[ring] = ring_angles;
            active[ring] = ring_active;
        } else {
            let (ring_angles, ring_active) = inner_angles(
                counts,
                &angles[ring + 1],
                &active[ring + 1],
                show_empty_sectors,
            );
            angles[ring] = ring_angles;
            active[ring] = ring_active;
        }
    }

    angles
}

fn outermost_angles(counts: &[usize], show_empty_sectors: bool) -> (Vec<f64>, Vec<bool>) {
    let sectors = counts.len();
    let total = counts.iter().sum::<usize>().max(1) as f64;

    if show_empty_sectors {
        let min_angle = MIN_ANGLE_FRACTION * TAU / sectors as f64;
        let empty = counts.iter().filter(|&&count| count == 0).count();
        let remaining = TAU - min_angle * empty as f64;
        let angles = counts
            .iter()
            .map(|&count| {
                if count == 0 {
                    min_angle
                } else {
                    count as f64 / total * remaining
                }
            })
            .collect();
        (angles, vec![true; sectors])
    } else {
        let angles = counts
            .iter()
            .map(|&count| {
                if count == 0 {
                    0.0
                } else {
                    count as f64 / total * TAU
                }
            })
            .collect();
        let active = counts.iter().map(|&count| count > 0).collect();
        (angles, active)
    }
}

fn inner_angles(
    counts: &[usize],
    outer_angles: &[f64],
    outer_active: &[bool],
    show_empty_sectors: bool,
) -> (Vec<f64>, Vec<bool>) {
    let inner = counts.len();
    let outer = outer_angles.len();

    if outer == 0 || !outer_active.iter().any(|&a| a) {
        let uniform = TAU / inner as f64;
        return (vec![uniform; inner], vec![true; inner]);
    }

    let ratio = outer as f64 / inner as f64;
    let mut angles = vec![0.0; inner];
    let mut active = vec![false; inner];

    for i in 0..inner {
        let mut sum = 0.0;
        let mut has_active_child = false;
        let mut j = 0usize;
        while (j as f64) < ratio {
            let position = i as f64 * ratio + j as f64;
            if position >= outer as f64 {
                break;
            }
            let outer_idx = position.floor() as usize;
            let outer_angle = outer_angles.get(outer_idx).copied().unwrap_or(0.0);
            sum += outer_angle;
            if outer_active.get(outer_idx).copied().unwrap_or(false) && outer_angle > 0.0 {
                has_active_child = true;
            }
            j += 1;
        }

        if show_empty_sectors || has_active_child || counts[i] > 0 {
            angles[i] = if sum > 0.0 { sum } else { TAU / inner as f64 };
            active[i] = has_active_child || counts[i] > 0;
        }
    }

    (angles, active)
}
