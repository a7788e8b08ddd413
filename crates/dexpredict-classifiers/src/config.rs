use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Number of candidate features examined at each tree split.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least one.
    Sqrt,
    /// Every feature is a split candidate.
    All,
    /// A fixed count, clamped to `1..=n_features`.
    Fixed(usize),
}

impl MaxFeatures {
    /// Resolve to a concrete candidate count for a matrix with `n_features` columns.
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => *k,
        };
        n.clamp(1, n_features.max(1))
    }
}

impl Default for MaxFeatures {
    fn default() -> Self {
        MaxFeatures::Sqrt
    }
}

impl FromStr for MaxFeatures {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqrt" => Ok(MaxFeatures::Sqrt),
            "all" => Ok(MaxFeatures::All),
            other => other
                .parse::<usize>()
                .map(MaxFeatures::Fixed)
                .map_err(|_| format!("Unknown max_features: {}. Use 'sqrt', 'all' or a count", s)),
        }
    }
}

/// Hyper-parameters of the random forest.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
        }
    }
}

/// Everything a training run needs: where the data lives, where the bundle
/// goes, and how to split and fit.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
    pub train_data: PathBuf,
    pub output_dir: PathBuf,
    pub test_size: f64,
    pub seed: u64,
    pub model: ModelConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_data: PathBuf::from("pokemon.csv"),
            output_dir: PathBuf::from("artifacts"),
            test_size: 0.2,
            seed: 42,
            model: ModelConfig::default(),
        }
    }
}
