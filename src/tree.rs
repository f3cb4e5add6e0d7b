//! Radial decision tree induction.
//!
//! CART-style greedy binary partitioning with Gini impurity, built into
//! an arena (`Vec<TreeNode>` with index links, no back-references).
//! After construction the tree is levelized breadth-first and each node
//! receives a contiguous angular wedge, assigned top-down from the
//! root's full circle. The whole tree is rebuilt on every parameter
//! change; nodes are immutable once `fit` returns.

use crate::data::{
    Classification, ClassifiedPoint, LabelMap, NodeAssignment, RawPoint, Subspace, UNLABELED,
};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::transform::{MaxFeatures, TransformOptions};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::f64::consts::TAU;

/// A node in the tree arena.
///
/// `node_id` equals the node's arena index and follows pre-order build
/// sequence, so a parent's id is always smaller than its children's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Arena index, assigned in build order.
    pub node_id: usize,
    /// Depth below the root (root = 0).
    pub depth: usize,
    /// Split feature name, `None` for leaves.
    pub feature: Option<String>,
    /// Split threshold, `None` for leaves.
    pub threshold: Option<f64>,
    /// Left child index (`value <= threshold`).
    pub left: Option<usize>,
    /// Right child index (`value > threshold`).
    pub right: Option<usize>,
    /// Whether this node terminates routing.
    pub is_leaf: bool,
    /// Gini impurity of the node's samples.
    pub gini: f64,
    /// Per-class sample counts, label order then unlabeled; each sample
    /// counts exactly once.
    pub class_counts: Vec<(String, usize)>,
    /// Most frequent class (ties break toward the earlier class).
    pub majority_class: String,
    /// Number of samples reaching this node.
    pub samples: usize,
    /// Position of this node within its depth level.
    pub sector_index: usize,
    /// Start of the node's angular wedge, radians.
    pub start_angle: f64,
    /// End of the node's angular wedge, radians.
    pub end_angle: f64,
    /// Indices into the fitted subspace's point list.
    pub point_indices: Vec<usize>,
}

impl TreeNode {
    /// Angular span owned by this node.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}

struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

/// A fitted decision tree with derived level index and angular wedges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    levels: Vec<Vec<usize>>,
    dimensions: Vec<String>,
}

impl DecisionTree {
    /// Fits a tree to a subspace's points.
    ///
    /// Returns `None` for an empty subspace (recorded as an
    /// [`DiagnosticKind::InvalidInput`] diagnostic). A subspace with no
    /// dimensions yields a single leaf root.
    pub fn fit(
        subspace: &Subspace,
        labels: Option<&LabelMap>,
        options: &TransformOptions,
        diagnostics: &mut Diagnostics,
    ) -> Option<Self> {
        if subspace.is_empty() {
            diagnostics.record(
                DiagnosticKind::InvalidInput,
                format!("cannot fit a tree to empty subspace '{}'", subspace.key()),
            );
            return None;
        }

        let mut class_order: Vec<String> = labels
            .map(|l| l.class_names().map(String::from).collect())
            .unwrap_or_default();
        class_order.push(UNLABELED.to_string());

        let point_classes: Vec<usize> = subspace
            .points()
            .iter()
            .map(|point| {
                labels
                    .map(|l| {
                        let class = l.class_of(&point.ids);
                        class_order
                            .iter()
                            .position(|c| c == class)
                            .unwrap_or(class_order.len() - 1)
                    })
                    .unwrap_or(class_order.len() - 1)
            })
            .collect();

        let mut tree = Self {
            nodes: Vec::new(),
            levels: Vec::new(),
            dimensions: subspace.dimensions().to_vec(),
        };
        let mut rng = StdRng::seed_from_u64(options.random_state);
        let indices: Vec<usize> = (0..subspace.len()).collect();
        tree.build_node(
            subspace,
            &point_classes,
            &class_order,
            indices,
            0,
            options,
            &mut rng,
        );
        tree.levelize();
        tree.assign_angles();
        Some(tree)
    }

    fn build_node(
        &mut self,
        subspace: &Subspace,
        point_classes: &[usize],
        class_order: &[String],
        indices: Vec<usize>,
        depth: usize,
        options: &TransformOptions,
        rng: &mut StdRng,
    ) -> usize {
        let node_id = self.nodes.len();
        let counts = class_counts(class_order, point_classes, &indices);
        let gini = gini_from_counts(&counts, indices.len());
        let majority = majority_class(&counts);
        let samples = indices.len();

        self.nodes.push(TreeNode {
            node_id,
            depth,
            feature: None,
            threshold: None,
            left: None,
            right: None,
            is_leaf: true,
            gini,
            class_counts: counts,
            majority_class: majority,
            samples,
            sector_index: 0,
            start_angle: 0.0,
            end_angle: 0.0,
            point_indices: indices.clone(),
        });

        let distinct = self.nodes[node_id]
            .class_counts
            .iter()
            .filter(|(_, count)| *count > 0)
            .count();
        if depth >= options.max_depth
            || samples < options.min_samples_split
            || gini == 0.0
            || distinct <= 1
        {
            return node_id;
        }

        let Some(split) =
            self.find_best_split(subspace, point_classes, class_order, &indices, options, rng)
        else {
            return node_id;
        };

        self.nodes[node_id].feature = Some(self.dimensions[split.feature_idx].clone());
        self.nodes[node_id].threshold = Some(split.threshold);
        self.nodes[node_id].is_leaf = false;

        let left = self.build_node(
            subspace,
            point_classes,
            class_order,
            split.left,
            depth + 1,
            options,
            rng,
        );
        self.nodes[node_id].left = Some(left);
        let right = self.build_node(
            subspace,
            point_classes,
            class_order,
            split.right,
            depth + 1,
            options,
            rng,
        );
        self.nodes[node_id].right = Some(right);

        node_id
    }

    /// Exhaustive split search: every (sub)sampled feature, every
    /// midpoint between consecutive distinct sorted values. Partitions
    /// leaving fewer than `min_samples_leaf` on a side are skipped;
    /// only a strictly positive Gini gain produces a split.
    fn find_best_split(
        &self,
        subspace: &Subspace,
        point_classes: &[usize],
        class_order: &[String],
        indices: &[usize],
        options: &TransformOptions,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let n_features = self.dimensions.len();
        if n_features == 0 || indices.len() < 2 {
            return None;
        }
        let feature_ids = select_features(n_features, options.max_features, rng);
        let parent_counts = class_counts(class_order, point_classes, indices);
        let parent_gini = gini_from_counts(&parent_counts, indices.len());

        let mut best: Option<SplitCandidate> = None;
        for &feature_idx in &feature_ids {
            let mut values: Vec<f64> = indices
                .iter()
                .map(|&i| subspace.points()[i].values[feature_idx])
                .collect();
            values.sort_by(f64::total_cmp);
            values.dedup();
            if values.len() < 2 {
                continue;
            }
            for pair in values.windows(2) {
                let threshold = (pair[0] + pair[1]) / 2.0;
                let mut left = Vec::new();
                let mut right = Vec::new();
                for &i in indices {
                    if subspace.points()[i].values[feature_idx] <= threshold {
                        left.push(i);
                    } else {
                        right.push(i);
                    }
                }
                if left.len() < options.min_samples_leaf
                    || right.len() < options.min_samples_leaf
                    || left.is_empty()
                    || right.is_empty()
                {
                    continue;
                }
                let gain = parent_gini
                    - weighted_gini(class_order, point_classes, &left, &right);
                let better = best.as_ref().map_or(gain > 0.0, |b| gain > b.gain);
                if better {
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                        left,
                        right,
                    });
                }
            }
        }
        best
    }

    /// Groups node ids by depth, breadth-first, and records each node's
    /// position within its level.
    fn levelize(&mut self) {
        self.levels.clear();
        if self.nodes.is_empty() {
            return;
        }
        let mut queue = VecDeque::from([0usize]);
        while let Some(id) = queue.pop_front() {
            let depth = self.nodes[id].depth;
            if self.levels.len() <= depth {
                self.levels.push(Vec::new());
            }
            self.nodes[id].sector_index = self.levels[depth].len();
            self.levels[depth].push(id);
            if let Some(left) = self.nodes[id].left {
                queue.push_back(left);
            }
            if let Some(right) = self.nodes[id].right {
                queue.push_back(right);
            }
        }
    }

    /// Root owns the full circle; each internal node divides its own
    /// wedge equally among its existing children. Nodes are never
    /// re-divided after receiving their span.
    fn assign_angles(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.nodes[0].start_angle = 0.0;
        self.nodes[0].end_angle = TAU;
        // Pre-order ids guarantee parents are processed before children.
        for id in 0..self.nodes.len() {
            let (start, end, left, right) = {
                let node = &self.nodes[id];
                (node.start_angle, node.end_angle, node.left, node.right)
            };
            let children: Vec<usize> = [left, right].into_iter().flatten().collect();
            if children.is_empty() {
                continue;
            }
            let width = (end - start) / children.len() as f64;
            for (slot, child) in children.into_iter().enumerate() {
                self.nodes[child].start_angle = start + width * slot as f64;
                self.nodes[child].end_angle = start + width * (slot + 1) as f64;
            }
        }
    }

    /// Walks a point from the root, recording an assignment at every
    /// visited node including the terminal one. Routing stops early at
    /// a node whose split feature is missing or NaN for the point.
    #[must_use]
    pub fn route(&self, point: &RawPoint) -> Vec<NodeAssignment> {
        let mut assignments = Vec::new();
        if self.nodes.is_empty() {
            return assignments;
        }
        let mut current = 0usize;
        loop {
            let node = &self.nodes[current];
            assignments.push(NodeAssignment {
                node_id: node.node_id,
                depth: node.depth,
                sector_index: node.sector_index,
                feature: node.feature.clone(),
                threshold: node.threshold,
                is_leaf: node.is_leaf,
                start_angle: node.start_angle,
                end_angle: node.end_angle,
            });
            if node.is_leaf {
                break;
            }
            let (Some(feature), Some(threshold)) = (&node.feature, node.threshold) else {
                break;
            };
            let Some(feature_idx) = self.dimensions.iter().position(|d| d == feature) else {
                break;
            };
            let Some(&value) = point.values.get(feature_idx) else {
                break;
            };
            if value.is_nan() {
                break;
            }
            let next = if value <= threshold {
                node.left
            } else {
                node.right
            };
            match next {
                Some(child) => current = child,
                None => break,
            }
        }
        assignments
    }

    /// Routes a point and wraps the result as a [`ClassifiedPoint`].
    #[must_use]
    pub fn classify_point(&self, point: &RawPoint) -> ClassifiedPoint {
        let assignments = self.route(point);
        let predicted_class = assignments
            .last()
            .map(|a| self.nodes[a.node_id].majority_class.clone())
            .unwrap_or_else(|| UNLABELED.to_string());
        ClassifiedPoint {
            raw: point.clone(),
            classification: Classification::Tree {
                assignments,
                predicted_class,
            },
        }
    }

    /// Majority class of the terminal node a point routes to.
    #[must_use]
    pub fn predict(&self, point: &RawPoint) -> String {
        self.route(point)
            .last()
            .map(|a| self.nodes[a.node_id].majority_class.clone())
            .unwrap_or_else(|| UNLABELED.to_string())
    }

    /// All nodes in arena (pre-order) order.
    #[must_use]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Node by arena id.
    #[must_use]
    pub fn node(&self, id: usize) -> &TreeNode {
        &self.nodes[id]
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// Node ids grouped by depth, breadth-first within each level.
    #[must_use]
    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    /// Number of depth levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Feature names the tree was fitted over.
    #[must_use]
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Parent-to-child edges for edge drawing.
    #[must_use]
    pub fn connections(&self) -> Vec<(usize, usize)> {
        self.nodes
            .iter()
            .flat_map(|node| {
                [
                    node.left.map(|child| (node.node_id, child)),
                    node.right.map(|child| (node.node_id, child)),
                ]
            })
            .flatten()
            .collect()
    }

    /// Per-level sample counts; the tree already partitioned the data,
    /// so no re-derivation from points is needed.
    #[must_use]
    pub fn sector_counts(&self) -> Vec<Vec<usize>> {
        self.levels
            .iter()
            .map(|level| level.iter().map(|&id| self.nodes[id].samples).collect())
            .collect()
    }

    /// Per-level angular spans, from each node's assigned wedge.
    #[must_use]
    pub fn level_spans(&self) -> Vec<Vec<f64>> {
        self.levels
            .iter()
            .map(|level| level.iter().map(|&id| self.nodes[id].span()).collect())
            .collect()
    }

    /// Normalized per-feature importance: each split contributes its
    /// Gini gain weighted by the node's sample count.
    #[must_use]
    pub fn feature_importance(&self) -> Vec<(String, f64)> {
        let mut importance = vec![0.0_f64; self.dimensions.len()];
        for node in &self.nodes {
            if node.is_leaf {
                continue;
            }
            let (Some(left), Some(right), Some(feature)) = (node.left, node.right, &node.feature)
            else {
                continue;
            };
            let n_left = self.nodes[left].samples as f64;
            let n_right = self.nodes[right].samples as f64;
            let total = n_left + n_right;
            if total == 0.0 {
                continue;
            }
            let weighted =
                (n_left * self.nodes[left].gini + n_right * self.nodes[right].gini) / total;
            let gain = node.gini - weighted;
            if let Some(idx) = self.dimensions.iter().position(|d| d == feature) {
                importance[idx] += gain * node.samples as f64;
            }
        }
        let sum: f64 = importance.iter().sum();
        if sum > 0.0 {
            for value in &mut importance {
                *value /= sum;
            }
        }
        self.dimensions.iter().cloned().zip(importance).collect()
    }
}

fn class_counts(
    class_order: &[String],
    point_classes: &[usize],
    indices: &[usize],
) -> Vec<(String, usize)> {
    let mut counts = vec![0usize; class_order.len()];
    for &i in indices {
        counts[point_classes[i]] += 1;
    }
    class_order.iter().cloned().zip(counts).collect()
}

/// Gini impurity `1 - sum(p_c^2)` from per-class counts.
fn gini_from_counts(counts: &[(String, usize)], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let mut gini = 1.0;
    for (_, count) in counts {
        let p = *count as f64 / n as f64;
        gini -= p * p;
    }
    gini
}

fn weighted_gini(
    class_order: &[String],
    point_classes: &[usize],
    left: &[usize],
    right: &[usize],
) -> f64 {
    let n_left = left.len() as f64;
    let n_right = right.len() as f64;
    let total = n_left + n_right;
    if total == 0.0 {
        return 0.0;
    }
    let gini_left = gini_from_counts(&class_counts(class_order, point_classes, left), left.len());
    let gini_right =
        gini_from_counts(&class_counts(class_order, point_classes, right), right.len());
    (n_left / total) * gini_left + (n_right / total) * gini_right
}

fn majority_class(counts: &[(String, usize)]) -> String {
    let mut best_name = UNLABELED;
    let mut best_count = 0usize;
    for (name, count) in counts {
        if *count > best_count {
            best_count = *count;
            best_name = name;
        }
    }
    best_name.to_string()
}

fn select_features(
    n_features: usize,
    policy: Option<MaxFeatures>,
    rng: &mut StdRng,
) -> Vec<usize> {
    let mut features: Vec<usize> = (0..n_features).collect();
    let Some(policy) = policy else {
        return features;
    };
    let keep = match policy {
        MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
        MaxFeatures::Log2 => (n_features as f64).log2().floor() as usize,
        MaxFeatures::Count(count) => count.min(n_features),
    };
    features.shuffle(rng);
    features.truncate(keep);
    features
}
