//! dexpredict-classifiers: predict a Pokémon species from its abilities.
//!
//! The crate covers both halves of the pipeline. Training reads a labelled
//! ability table, fits a one-hot encoder, a label map and a random forest, and
//! persists all three as a versioned artifact bundle. Inference loads that
//! bundle once and answers single-row queries.
//!
//! Everything is deterministic for a fixed seed, including the parallel forest
//! fit.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod labels;
pub mod models;
pub mod predictor;
pub mod preprocessing;
pub mod stats;
pub mod trainer;

pub use config::{MaxFeatures, ModelConfig, TrainConfig};
pub use error::{ArtifactError, DataError, Error, InferenceError, Result};
pub use predictor::{Predictor, SharedPredictor};
pub use trainer::{TrainOutcome, Trainer};
