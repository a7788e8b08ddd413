use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::InferenceError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::decision_tree::{DecisionTreeClassifier, TreeParams};

/// Bagged ensemble of CART trees with soft voting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: ModelConfig,
    seed: u64,
    trees: Vec<DecisionTreeClassifier>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForestClassifier {
    pub fn new(params: ModelConfig, seed: u64) -> Self {
        RandomForestClassifier {
            params,
            seed,
            trees: Vec::new(),
            n_features: 0,
            n_classes: 0,
        }
    }

    pub fn trees(&self) -> &[DecisionTreeClassifier] {
        &self.trees
    }

    pub fn params(&self) -> &ModelConfig {
        &self.params
    }

    /// Structural check of every tree against the forest's own width and
    /// class count. An empty forest passes and fails later as not fitted.
    pub(crate) fn check_structure(&self) -> Result<(), String> {
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.check_structure(self.n_features, self.n_classes)
                .map_err(|detail| format!("tree {}: {}", idx, detail))?;
        }
        Ok(())
    }
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize) {
        assert_eq!(x.nrows(), y.len(), "feature rows and labels differ in length");

        let n_rows = x.nrows();
        self.n_features = x.ncols();
        self.n_classes = n_classes;

        // Per-tree seeds are drawn up front so parallel fitting cannot
        // reorder the random stream.
        let mut seeder = StdRng::seed_from_u64(self.seed);
        let tree_seeds: Vec<u64> = (0..self.params.n_estimators).map(|_| seeder.gen()).collect();

        let params = &self.params;
        log::debug!(
            "Fitting {} trees on {} rows x {} features ({} classes)",
            params.n_estimators,
            n_rows,
            self.n_features,
            n_classes
        );

        self.trees = tree_seeds
            .par_iter()
            .enumerate()
            .map(|(idx, &tree_seed)| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let samples: Vec<usize> = if params.bootstrap {
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
                } else {
                    (0..n_rows).collect()
                };

                let mut tree = DecisionTreeClassifier::new(TreeParams {
                    max_depth: params.max_depth,
                    min_samples_split: params.min_samples_split,
                    min_samples_leaf: params.min_samples_leaf,
                    max_features: params.max_features,
                    seed: rng.gen(),
                });
                tree.fit_samples(x, y, &samples, n_classes);
                log::trace!("Tree {}/{} depth {}", idx + 1, params.n_estimators, tree.depth());
                tree
            })
            .collect();
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, InferenceError> {
        if self.trees.is_empty() {
            return Err(InferenceError::NotFitted);
        }
        for tree in &self.trees {
            tree.check_input(x)?;
        }

        let mut out = Array2::<f32>::zeros((x.nrows(), self.n_classes));
        for (row, mut target) in x.rows().into_iter().zip(out.rows_mut()) {
            for tree in &self.trees {
                for (t, &p) in target.iter_mut().zip(tree.leaf_distribution(row)?) {
                    *t += p;
                }
            }
        }
        out /= self.trees.len() as f32;
        Ok(out)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}
