//! CART classification tree.
//!
//! Gini impurity, binary `x[f] <= threshold` splits at midpoints between
//! distinct values, per-node random feature subsampling. Candidate splits with
//! equal impurity are ordered by `(feature, threshold)` so that a fixed seed
//! always yields the same tree.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::MaxFeatures;
use crate::error::InferenceError;
use crate::models::classifier_trait::ClassifierModel;

const IMPURITY_EPS: f64 = 1e-12;

/// Stopping rules and subsampling for a single tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Leaf {
        /// Class probabilities of the training samples that reached this leaf.
        distribution: Vec<f32>,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
struct SplitTieBreaker {
    feature: usize,
    threshold: f32,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    /// Sample-weighted Gini impurity of the two children (lower is better).
    child_impurity: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn beats(&self, other: &SplitCandidate) -> bool {
        if self.child_impurity < other.child_impurity - IMPURITY_EPS {
            return true;
        }
        (self.child_impurity - other.child_impurity).abs() <= IMPURITY_EPS
            && self.tie_breaker < other.tie_breaker
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    params: TreeParams,
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
}

impl DecisionTreeClassifier {
    pub fn new(params: TreeParams) -> Self {
        DecisionTreeClassifier {
            params,
            nodes: Vec::new(),
            n_features: 0,
            n_classes: 0,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Depth of the deepest leaf (a lone root leaf has depth 0).
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Fit on the rows listed in `samples`. Repeated indices count once per
    /// occurrence, which is how the forest passes bootstrap draws in.
    pub fn fit_samples(&mut self, x: &Array2<f32>, y: &[usize], samples: &[usize], n_classes: usize) {
        assert_eq!(x.nrows(), y.len(), "feature rows and labels differ in length");

        self.n_features = x.ncols();
        self.n_classes = n_classes;
        self.nodes.clear();

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let builder = TreeBuilder {
            x,
            y,
            n_classes,
            params: &self.params,
            max_features: self.params.max_features.resolve(x.ncols()),
        };
        let mut nodes = Vec::new();
        builder.build_node(samples.to_vec(), 0, &mut nodes, &mut rng);
        self.nodes = nodes;
    }

    /// Class distribution of the leaf `row` falls into.
    ///
    /// Children always sit after their parent, so a walk that fails to move
    /// forward is reported instead of followed.
    pub fn leaf_distribution(&self, row: ArrayView1<'_, f32>) -> Result<&[f32], InferenceError> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { distribution }) => return Ok(distribution),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).ok_or(InferenceError::CorruptTree { node: idx })?;
                    let next = if *value <= *threshold { *left } else { *right };
                    if next <= idx {
                        return Err(InferenceError::CorruptTree { node: idx });
                    }
                    idx = next;
                }
                None => return Err(InferenceError::CorruptTree { node: idx }),
            }
        }
    }

    /// Check a deserialized tree against the forest it belongs to.
    ///
    /// Every child index must point forward and stay inside the arena, every
    /// split feature must exist and every leaf must cover all classes.
    pub(crate) fn check_structure(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        if self.n_features != n_features || self.n_classes != n_classes {
            return Err(format!(
                "tree was fit on {} features / {} classes, forest expects {} / {}",
                self.n_features, self.n_classes, n_features, n_classes
            ));
        }

        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(format!(
                            "leaf {} holds {} probabilities for {} classes",
                            idx,
                            distribution.len(),
                            n_classes
                        ));
                    }
                }
                Node::Split {
                    feature, left, right, ..
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {} splits on feature {} of {}", idx, feature, n_features));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= len {
                            return Err(format!("node {} points at child {} ({} nodes)", idx, child, len));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn check_input(&self, x: &Array2<f32>) -> Result<(), InferenceError> {
        if !self.is_fitted() {
            return Err(InferenceError::NotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(InferenceError::WidthMismatch {
                expected: self.n_features,
                found: x.ncols(),
            });
        }
        Ok(())
    }
}

impl ClassifierModel for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) {
        let samples: Vec<usize> = (0..x.nrows()).collect();
        self.fit_samples(x, y, &samples, n_classes);
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, InferenceError> {
        self.check_input(x)?;
        let mut out = Array2::<f32>::zeros((x.nrows(), self.n_classes));
        for (row, mut target) in x.rows().into_iter().zip(out.rows_mut()) {
            for (t, &p) in target.iter_mut().zip(self.leaf_distribution(row)?) {
                *t = p;
            }
        }
        Ok(out)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}

struct TreeBuilder<'a> {
    x: &'a Array2<f32>,
    y: &'a [usize],
    n_classes: usize,
    params: &'a TreeParams,
    max_features: usize,
}

impl<'a> TreeBuilder<'a> {
    fn build_node(
        &self,
        samples: Vec<usize>,
        depth: usize,
        nodes: &mut Vec<Node>,
        rng: &mut StdRng,
    ) -> usize {
        let current = nodes.len();
        let counts = self.class_counts(&samples);
        let n = samples.len();

        let depth_reached = self.params.max_depth.map_or(false, |d| depth >= d);
        if depth_reached
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
            || gini(&counts, n) <= IMPURITY_EPS
        {
            nodes.push(self.leaf(&counts, n));
            return current;
        }

        let Some(split) = self.find_best_split(&samples, rng) else {
            nodes.push(self.leaf(&counts, n));
            return current;
        };

        let SplitTieBreaker { feature, threshold } = split.tie_breaker;
        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&s| self.x[[s, feature]] <= threshold);

        // Placeholder; children indices are patched in once they exist.
        nodes.push(Node::Split {
            feature,
            threshold,
            left: 0,
            right: 0,
        });

        let left_idx = self.build_node(left_samples, depth + 1, nodes, rng);
        let right_idx = self.build_node(right_samples, depth + 1, nodes, rng);

        if let Node::Split { left, right, .. } = &mut nodes[current] {
            *left = left_idx;
            *right = right_idx;
        }
        current
    }

    /// Examine features in a random order. At least `max_features` are
    /// looked at; the scan keeps going past that only while no valid split
    /// has turned up.
    fn find_best_split(&self, samples: &[usize], rng: &mut StdRng) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_on(samples, feature) {
                best = match best {
                    Some(current) if !candidate.beats(&current) => Some(current),
                    _ => Some(candidate),
                };
            }
        }
        best
    }

    fn best_split_on(&self, samples: &[usize], feature: usize) -> Option<SplitCandidate> {
        let mut pairs: Vec<(f32, usize)> = samples
            .iter()
            .map(|&s| (self.x[[s, feature]], self.y[s]))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = pairs.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut left = vec![0usize; self.n_classes];
        let mut right = vec![0usize; self.n_classes];
        for &(_, class) in &pairs {
            right[class] += 1;
        }

        let mut best: Option<SplitCandidate> = None;
        for i in 0..n.saturating_sub(1) {
            let class = pairs[i].1;
            left[class] += 1;
            right[class] -= 1;

            let n_left = i + 1;
            let n_right = n - n_left;
            if pairs[i].0 == pairs[i + 1].0 || n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let child_impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / n as f64;
            let threshold = pairs[i].0 + (pairs[i + 1].0 - pairs[i].0) / 2.0;
            let candidate = SplitCandidate {
                child_impurity,
                tie_breaker: SplitTieBreaker { feature, threshold },
            };

            best = match best {
                Some(current) if !candidate.beats(&current) => Some(current),
                _ => Some(candidate),
            };
        }
        best
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &s in samples {
            counts[self.y[s]] += 1;
        }
        counts
    }

    fn leaf(&self, counts: &[usize], n: usize) -> Node {
        let total = n.max(1) as f32;
        Node::Leaf {
            distribution: counts.iter().map(|&c| c as f32 / total).collect(),
        }
    }
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}
