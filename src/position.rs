//! Point placement within rings.
//!
//! Maps classified points to concrete (x, y) coordinates given the
//! ring radii and the angular layout. All randomness (tree-mode
//! jitter) is seeded from the layout configuration so repeated runs
//! produce identical coordinates. Output coordinates are always
//! finite; a NaN result drops the point with a diagnostic.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::ring::Ring;
use crate::sector::sector_index;
use crate::transform::TransformStrategy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, TAU};

/// How sector widths are chosen for binary strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    /// Equal angular width per (visible) sector.
    Normal,
    /// Widths proportional to sector counts, from the angle calculator.
    Proportional,
}

/// Geometry configuration shared by every ring and strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Global rotation applied to every angle, so 0 aligns with a
    /// fixed reference direction across rings and the sector renderer.
    pub rotation_offset: f64,
    /// Fraction of the ring band used when spreading a sector's points
    /// radially.
    pub cluster_factor: f64,
    /// Outer radius of the outermost ring.
    pub max_radius: f64,
    /// Whether empty sectors are rendered (and keep their angular slot).
    pub show_empty_sectors: bool,
    /// Seed for placement jitter.
    pub random_state: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rotation_offset: FRAC_PI_2,
            cluster_factor: 0.9,
            max_radius: 380.0,
            show_empty_sectors: true,
            random_state: 42,
        }
    }
}

impl LayoutConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the global rotation offset.
    #[must_use]
    pub fn with_rotation_offset(mut self, rotation_offset: f64) -> Self {
        self.rotation_offset = rotation_offset;
        self
    }

    /// Sets the outermost ring radius.
    #[must_use]
    pub fn with_max_radius(mut self, max_radius: f64) -> Self {
        self.max_radius = max_radius;
        self
    }

    /// Sets whether empty sectors are rendered.
    #[must_use]
    pub fn with_show_empty_sectors(mut self, show: bool) -> Self {
        self.show_empty_sectors = show;
        self
    }

    /// Sets the jitter seed.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }
}

/// A placed point, consumed by the renderer for dots and connection
/// lines. Ephemeral; rebuilt on every render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPosition {
    /// Index into the ring's point list.
    pub point_index: usize,
    /// Identifiers of the placed point.
    pub ids: Vec<u64>,
    /// Horizontal coordinate, origin at the diagram center.
    pub x: f64,
    /// Vertical coordinate, origin at the diagram center.
    pub y: f64,
    /// Sector (or tree-node slot) the point belongs to.
    pub sector_index: usize,
    /// Ring the point was placed in.
    pub ring_index: usize,
    /// Final plotted angle, radians.
    pub angle: f64,
}

/// Computes positions for one ring.
///
/// `angle_spans` carries the proportional spans for this ring when the
/// view mode needs them; pass `None` in normal view.
pub fn point_positions(
    ring: &Ring,
    inner_radius: f64,
    outer_radius: f64,
    angle_spans: Option<&[f64]>,
    view_mode: ViewMode,
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<PointPosition> {
    if ring.points.is_empty() {
        return Vec::new();
    }
    match ring.strategy {
        TransformStrategy::Radial => {
            radial_positions(ring, inner_radius, outer_radius, config, diagnostics)
        }
        TransformStrategy::DecisionTree => {
            tree_positions(ring, inner_radius, outer_radius, config, diagnostics)
        }
        _ => sector_positions(
            ring,
            inner_radius,
            outer_radius,
            angle_spans,
            view_mode,
            config,
            diagnostics,
        ),
    }
}

fn sector_positions(
    ring: &Ring,
    inner_radius: f64,
    outer_radius: f64,
    angle_spans: Option<&[f64]>,
    view_mode: ViewMode,
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<PointPosition> {
    let sectors = ring.sectors.max(1);
    let mut by_sector: Vec<Vec<usize>> = vec![Vec::new(); sectors];
    for (point_index, point) in ring.points.iter().enumerate() {
        let sector = sector_index(point, ring.ring_index, sectors, diagnostics);
        by_sector[sector.min(sectors - 1)].push(point_index);
    }

    let mut positions = Vec::with_capacity(ring.points.len());

    match view_mode {
        ViewMode::Proportional if angle_spans.is_some() => {
            let spans = angle_spans.unwrap_or(&[]);
            let mut start_angles = Vec::with_capacity(spans.len());
            let mut acc = config.rotation_offset;
            for &span in spans {
                start_angles.push(acc);
                acc += span;
            }
            for (sector, group) in by_sector.iter().enumerate() {
                if group.is_empty() {
                    continue;
                }
                let span = spans.get(sector).copied().unwrap_or(0.0);
                if !config.show_empty_sectors && span == 0.0 {
                    continue;
                }
                if span < 0.01 {
                    diagnostics.record_for_ring(
                        DiagnosticKind::ComputationAnomaly,
                        ring.ring_index,
                        format!(
                            "sector {sector} span below render threshold, {} points skipped",
                            group.len()
                        ),
                    );
                    continue;
                }
                let center = start_angles[sector] + span / 2.0;
                spread_group(
                    ring,
                    group,
                    sector,
                    center,
                    inner_radius,
                    outer_radius,
                    config,
                    &mut positions,
                    diagnostics,
                );
            }
        }
        _ => {
            let visible: Vec<usize> = if config.show_empty_sectors {
                (0..sectors).collect()
            } else {
                (0..sectors).filter(|&s| !by_sector[s].is_empty()).collect()
            };
            if visible.is_empty() {
                return positions;
            }
            let angle_per = TAU / visible.len() as f64;
            for (display_index, &sector) in visible.iter().enumerate() {
                let group = &by_sector[sector];
                if group.is_empty() {
                    continue;
                }
                let center =
                    config.rotation_offset + angle_per * display_index as f64 + angle_per / 2.0;
                spread_group(
                    ring,
                    group,
                    sector,
                    center,
                    inner_radius,
                    outer_radius,
                    config,
                    &mut positions,
                    diagnostics,
                );
            }
        }
    }

    positions
}

/// Fans a sector's points out radially along the sector's center
/// angle, from the inner radius toward the outer.
#[allow(clippy::too_many_arguments)]
fn spread_group(
    ring: &Ring,
    group: &[usize],
    sector: usize,
    center: f64,
    inner_radius: f64,
    outer_radius: f64,
    config: &LayoutConfig,
    positions: &mut Vec<PointPosition>,
    diagnostics: &mut Diagnostics,
) {
    let count = group.len().max(1) as f64;
    for (slot, &point_index) in group.iter().enumerate() {
        let radius = inner_radius
            + config.cluster_factor * (outer_radius - inner_radius) * slot as f64 / count;
        push_position(
            ring,
            point_index,
            radius * center.cos(),
            radius * center.sin(),
            sector,
            center,
            positions,
            diagnostics,
        );
    }
}

fn radial_positions(
    ring: &Ring,
    inner_radius: f64,
    outer_radius: f64,
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<PointPosition> {
    // The innermost ring keeps a minimum band so points near the
    // center stay visible.
    let effective_inner = if ring.ring_index == 0 {
        inner_radius.max(10.0)
    } else {
        inner_radius
    };
    let effective_outer = if ring.ring_index == 0 {
        outer_radius.max(30.0)
    } else {
        outer_radius
    };
    let central_radius = (effective_inner + effective_outer) / 2.0;

    // Points with coinciding angles are offset radially so they stay
    // distinguishable; keys are quantized to group near-identical
    // angles deterministically.
    let mut groups: BTreeMap<i64, Vec<(usize, f64)>> = BTreeMap::new();
    for (point_index, point) in ring.points.iter().enumerate() {
        let angle = point.angle().unwrap_or(0.0) + config.rotation_offset;
        let key = (angle * 1e8).round() as i64;
        groups.entry(key).or_default().push((point_index, angle));
    }

    let mut positions = Vec::with_capacity(ring.points.len());
    for group in groups.values() {
        let coinciding = group.len();
        for (slot, &(point_index, angle)) in group.iter().enumerate() {
            let mut radius = central_radius;
            if coinciding > 1 {
                let step = 3.0_f64.min((effective_outer - effective_inner) * 0.05);
                radius += (slot as f64 - (coinciding as f64 - 1.0) / 2.0) * step;
            }
            radius = radius.clamp(
                effective_inner,
                (effective_outer - 1.0).max(effective_inner),
            );
            push_position(
                ring,
                point_index,
                radius * angle.cos(),
                radius * angle.sin(),
                0,
                angle,
                &mut positions,
                diagnostics,
            );
        }
    }
    positions
}

fn tree_positions(
    ring: &Ring,
    inner_radius: f64,
    outer_radius: f64,
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<PointPosition> {
    let mut rng = StdRng::seed_from_u64(
        config
            .random_state
            .wrapping_add(ring.ring_index as u64),
    );
    let mut positions = Vec::with_capacity(ring.points.len());

    // The root level is a single center disc: one point sits dead
    // center, several spread over a small jittered circle.
    if ring.ring_index == 0 {
        let count = ring.points.len();
        if count == 1 {
            push_position(ring, 0, 0.0, 0.0, 0, 0.0, &mut positions, diagnostics);
            return positions;
        }
        for point_index in 0..count {
            let angle = config.rotation_offset + TAU * point_index as f64 / count as f64;
            let radius = outer_radius * 0.3 + rng.gen_range(-1.0..1.0) * outer_radius * 0.1;
            push_position(
                ring,
                point_index,
                radius * angle.cos(),
                radius * angle.sin(),
                0,
                angle,
                &mut positions,
                diagnostics,
            );
        }
        return positions;
    }

    let mut by_node: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (point_index, point) in ring.points.iter().enumerate() {
        match point.assignment_at(ring.ring_index) {
            Some(assignment) => by_node
                .entry(assignment.node_id)
                .or_default()
                .push(point_index),
            None => diagnostics.record_for_point(
                DiagnosticKind::ComputationAnomaly,
                Some(ring.ring_index),
                point.raw.primary_id(),
                "point has no node assignment at this depth",
            ),
        }
    }

    let band = outer_radius - inner_radius;
    let radius_low = inner_radius + band * 0.15;
    let radius_high = outer_radius - band * 0.15;

    for group in by_node.values() {
        let Some(assignment) = ring.points[group[0]].assignment_at(ring.ring_index) else {
            continue;
        };
        let span = assignment.span();
        if span <= 1e-4 {
            diagnostics.record_for_ring(
                DiagnosticKind::ComputationAnomaly,
                ring.ring_index,
                format!(
                    "node {} has no displayable span, {} points skipped",
                    assignment.node_id,
                    group.len()
                ),
            );
            continue;
        }
        let center = assignment.start_angle + span / 2.0 + config.rotation_offset;
        let sector = assignment.sector_index;

        // Square-root layering: a node holding n points uses
        // ceil(sqrt(n)) concentric layers inside the padded band.
        let count = group.len();
        let layers = (count as f64).sqrt().ceil().max(1.0) as usize;
        let spread = span * 0.7;
        for (slot, &point_index) in group.iter().enumerate() {
            let layer = slot % layers;
            let radius = radius_low
                + (radius_high - radius_low) * (layer as f64 + 0.5) / layers as f64;
            let jitter = (rng.gen::<f64>() - 0.5) * spread;
            let angle = center + jitter;
            push_position(
                ring,
                point_index,
                radius * angle.cos(),
                radius * angle.sin(),
                sector,
                angle,
                &mut positions,
                diagnostics,
            );
        }
    }

    positions
}

/// Appends a position after checking both coordinates are finite.
#[allow(clippy::too_many_arguments)]
fn push_position(
    ring: &Ring,
    point_index: usize,
    x: f64,
    y: f64,
    sector_index: usize,
    angle: f64,
    positions: &mut Vec<PointPosition>,
    diagnostics: &mut Diagnostics,
) {
    if !x.is_finite() || !y.is_finite() {
        diagnostics.record_for_point(
            DiagnosticKind::ComputationAnomaly,
            Some(ring.ring_index),
            ring.points[point_index].raw.primary_id(),
            "non-finite position dropped",
        );
        return;
    }
    positions.push(PointPosition {
        point_index,
        ids: ring.points[point_index].raw.ids.clone(),
        x,
        y,
        sector_index,
        ring_index: ring.ring_index,
        angle,
    });
}
