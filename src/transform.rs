//! Coordinate transform strategies.
//!
//! Each strategy turns a subspace's raw points into
//! [`ClassifiedPoint`]s carrying either per-dimension binary flags, a
//! continuous angle, or decision-tree routing. Classification happens
//! exactly once per ring per render pass; the counting and placement
//! passes both consume the same output.

use crate::data::{Classification, ClassifiedPoint, LabelMap, Subspace};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::tree::DecisionTree;
use serde::{Deserialize, Serialize};

/// The six interchangeable classification strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformStrategy {
    /// Flag = 1 where the coordinate is non-negative.
    PositiveNegative,
    /// Flag = 1 where the coordinate's z-score meets the threshold.
    ZScore,
    /// Flag = 1 where the coordinate meets its per-dimension quantile.
    Percentile,
    /// Flag = 1 where the coordinate meets an absolute threshold.
    CustomThreshold,
    /// Continuous angle from the last dimension; one sector per ring.
    Radial,
    /// Routing through a fitted decision tree.
    DecisionTree,
}

impl TransformStrategy {
    /// Resolves a strategy from its wire name.
    ///
    /// Unknown names fall back to [`TransformStrategy::PositiveNegative`]
    /// with an [`DiagnosticKind::UnknownStrategy`] warning; this is
    /// never fatal.
    pub fn from_name(name: &str, diagnostics: &mut Diagnostics) -> Self {
        match name {
            "positive_negative" => Self::PositiveNegative,
            "z_score" => Self::ZScore,
            "percentile" => Self::Percentile,
            "custom_threshold" => Self::CustomThreshold,
            "radial" => Self::Radial,
            "decision_tree" => Self::DecisionTree,
            other => {
                diagnostics.record(
                    DiagnosticKind::UnknownStrategy,
                    format!("unknown transformation strategy '{other}', using positive_negative"),
                );
                Self::PositiveNegative
            }
        }
    }

    /// Wire name of the strategy.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PositiveNegative => "positive_negative",
            Self::ZScore => "z_score",
            Self::Percentile => "percentile",
            Self::CustomThreshold => "custom_threshold",
            Self::Radial => "radial",
            Self::DecisionTree => "decision_tree",
        }
    }

    /// True for strategies producing per-dimension binary flags.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Self::PositiveNegative | Self::ZScore | Self::Percentile | Self::CustomThreshold
        )
    }
}

/// Feature subsampling policy for the decision tree split search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Consider `floor(sqrt(n_features))` features per node.
    Sqrt,
    /// Consider `floor(log2(n_features))` features per node.
    Log2,
    /// Consider at most this many features per node.
    Count(usize),
}

/// Strategy options with documented defaults.
///
/// Builder methods clamp out-of-range values instead of erroring,
/// mirroring how tree hyperparameters behave elsewhere in the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Threshold for the z-score and custom-threshold strategies.
    pub threshold: f64,
    /// Percentile (0..=100) for the percentile strategy.
    pub percentile: f64,
    /// Maximum decision tree depth.
    pub max_depth: usize,
    /// Minimum samples required at a leaf.
    pub min_samples_leaf: usize,
    /// Minimum samples required to consider splitting a node.
    pub min_samples_split: usize,
    /// Optional feature subsampling for the split search.
    pub max_features: Option<MaxFeatures>,
    /// Seed for feature subsampling and placement jitter.
    pub random_state: u64,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            percentile: 50.0,
            max_depth: 5,
            min_samples_leaf: 5,
            min_samples_split: 10,
            max_features: None,
            random_state: 42,
        }
    }
}

impl TransformOptions {
    /// Creates options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the absolute/z-score threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the percentile, clamped to 0..=100.
    #[must_use]
    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.percentile = percentile.clamp(0.0, 100.0);
        self
    }

    /// Sets the maximum tree depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the minimum samples per leaf (at least 1).
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Sets the minimum samples to split a node (at least 2).
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Sets the feature subsampling policy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }
}

/// Classifies a subspace's points with the given strategy.
///
/// Pure with respect to input: raw points are embedded verbatim in the
/// output. An empty subspace yields an empty vector.
pub fn classify(
    subspace: &Subspace,
    strategy: TransformStrategy,
    options: &TransformOptions,
    labels: Option<&LabelMap>,
    diagnostics: &mut Diagnostics,
) -> Vec<ClassifiedPoint> {
    if subspace.is_empty() {
        return Vec::new();
    }
    match strategy {
        TransformStrategy::PositiveNegative => binary_by(subspace, |value, _dim| value >= 0.0),
        TransformStrategy::CustomThreshold => {
            let threshold = options.threshold;
            binary_by(subspace, move |value, _dim| value >= threshold)
        }
        TransformStrategy::ZScore => {
            let stats: Vec<(f64, f64)> = (0..subspace.dimensions().len())
                .map(|dim| {
                    let values: Vec<f64> =
                        subspace.points().iter().map(|p| p.values[dim]).collect();
                    let mean = mean(&values);
                    let std = sample_std(&values, mean);
                    // A constant dimension gets unit spread so the
                    // comparison stays defined.
                    (mean, if std > 0.0 { std } else { 1.0 })
                })
                .collect();
            let threshold = options.threshold;
            binary_by(subspace, move |value, dim| {
                let (mean, std) = stats[dim];
                (value - mean) / std >= threshold
            })
        }
        TransformStrategy::Percentile => {
            let q = options.percentile.clamp(0.0, 100.0) / 100.0;
            let thresholds: Vec<f64> = (0..subspace.dimensions().len())
                .map(|dim| {
                    let mut values: Vec<f64> =
                        subspace.points().iter().map(|p| p.values[dim]).collect();
                    values.sort_by(f64::total_cmp);
                    quantile_sorted(&values, q)
                })
                .collect();
            binary_by(subspace, move |value, dim| value >= thresholds[dim])
        }
        TransformStrategy::Radial => radial(subspace, diagnostics),
        TransformStrategy::DecisionTree => {
            match DecisionTree::fit(subspace, labels, options, diagnostics) {
                Some(tree) => subspace
                    .points()
                    .iter()
                    .map(|point| tree.classify_point(point))
                    .collect(),
                None => Vec::new(),
            }
        }
    }
}

fn binary_by<F>(subspace: &Subspace, flag: F) -> Vec<ClassifiedPoint>
where
    F: Fn(f64, usize) -> bool,
{
    subspace
        .points()
        .iter()
        .map(|point| {
            let flags = point
                .values
                .iter()
                .enumerate()
                .map(|(dim, &value)| u8::from(flag(value, dim)))
                .collect();
            ClassifiedPoint {
                raw: point.clone(),
                classification: Classification::Binary(flags),
            }
        })
        .collect()
}

fn radial(subspace: &Subspace, diagnostics: &mut Diagnostics) -> Vec<ClassifiedPoint> {
    let Some(feature_idx) = subspace.dimensions().len().checked_sub(1) else {
        diagnostics.record(
            DiagnosticKind::ComputationAnomaly,
            format!(
                "no numerical feature available for radial transform in '{}'",
                subspace.key()
            ),
        );
        return subspace
            .points()
            .iter()
            .map(|point| ClassifiedPoint {
                raw: point.clone(),
                classification: Classification::Angular(0.0),
            })
            .collect();
    };
    let values: Vec<f64> = subspace
        .points()
        .iter()
        .map(|p| p.values[feature_idx])
        .collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max > min { max - min } else { 1.0 };

    subspace
        .points()
        .iter()
        .map(|point| {
            let normalized = (point.values[feature_idx] - min) / range;
            ClassifiedPoint {
                raw: point.clone(),
                classification: Classification::Angular(normalized * std::f64::consts::TAU),
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (n - 1 denominator); 0 for fewer than two
/// values.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Quantile by linear interpolation (R-7 method) over sorted values.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
