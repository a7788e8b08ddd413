//! Single-row inference over a loaded artifact bundle.
//!
//! [`Predictor`] is immutable once built and safe to share between threads.
//! [`SharedPredictor`] adds the lazy, load-once behaviour a long-running
//! front end needs: the bundle is read from disk on the first request and
//! every later request reuses it.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::{Array2, Axis};
use once_cell::sync::OnceCell;

use crate::error::{ArtifactError, InferenceError};
use crate::io::{load_bundle, ArtifactBundle};
use crate::models::ClassifierModel;
use crate::preprocessing::normalize_field;

#[derive(Debug, Clone)]
pub struct Predictor {
    bundle: ArtifactBundle,
}

impl Predictor {
    /// Load and cross-check the three artifacts in `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, ArtifactError> {
        let bundle = load_bundle(dir)?;
        Ok(Predictor { bundle })
    }

    /// Wrap an in-memory bundle, e.g. straight out of a training run.
    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self, ArtifactError> {
        bundle.validate()?;
        Ok(Predictor { bundle })
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    /// Predict the species for one ability triple.
    ///
    /// Inputs go through the same normalization as the training table, so
    /// casing, surrounding whitespace and blank-vs-"None" do not matter. The
    /// returned label is the stored (lowercase) form.
    pub fn predict(&self, ability1: &str, ability2: &str, hidden_ability: &str) -> Result<String, InferenceError> {
        let row = self.encode(ability1, ability2, hidden_ability)?;
        let class = self.bundle.classifier.predict(&row.x)?[0];
        let label = self
            .bundle
            .labels
            .name_of(class)
            .ok_or(InferenceError::UnknownClass(class))?;
        log::debug!("{:?} -> {}", row.normalized, label);
        Ok(label.to_string())
    }

    /// The `k` most probable species with their averaged vote share, best first.
    ///
    /// Equal probabilities keep label order.
    pub fn top_k(
        &self,
        ability1: &str,
        ability2: &str,
        hidden_ability: &str,
        k: usize,
    ) -> Result<Vec<(String, f32)>, InferenceError> {
        let row = self.encode(ability1, ability2, hidden_ability)?;
        let proba = self.bundle.classifier.predict_proba(&row.x)?;

        let mut ranked: Vec<(usize, f32)> = proba.index_axis(Axis(0), 0).iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
            .into_iter()
            .take(k)
            .map(|(class, p)| {
                self.bundle
                    .labels
                    .name_of(class)
                    .map(|name| (name.to_string(), p))
                    .ok_or(InferenceError::UnknownClass(class))
            })
            .collect()
    }

    fn encode(&self, ability1: &str, ability2: &str, hidden_ability: &str) -> Result<EncodedRow, InferenceError> {
        let normalized = [
            normalize_field(ability1),
            normalize_field(ability2),
            normalize_field(hidden_ability),
        ];
        let row = self.bundle.encoder.transform_row(&normalized);
        let expected = self.bundle.classifier.n_features();
        if row.len() != expected {
            return Err(InferenceError::WidthMismatch {
                expected,
                found: row.len(),
            });
        }
        Ok(EncodedRow {
            x: row.insert_axis(Axis(0)),
            normalized,
        })
    }
}

struct EncodedRow {
    x: Array2<f32>,
    normalized: [String; 3],
}

/// Cheaply cloneable handle that loads a [`Predictor`] on first use.
///
/// Concurrent first callers block on one initialisation. A failed load leaves
/// the cell empty so the next call retries.
#[derive(Debug, Clone)]
pub struct SharedPredictor {
    inner: Arc<SharedInner>,
}

#[derive(Debug)]
struct SharedInner {
    artifact_dir: PathBuf,
    cell: OnceCell<Predictor>,
}

impl SharedPredictor {
    pub fn new<P: Into<PathBuf>>(artifact_dir: P) -> Self {
        SharedPredictor {
            inner: Arc::new(SharedInner {
                artifact_dir: artifact_dir.into(),
                cell: OnceCell::new(),
            }),
        }
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.inner.artifact_dir
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.cell.get().is_some()
    }

    /// The loaded predictor, reading the artifacts if this is the first call.
    pub fn get(&self) -> Result<&Predictor, ArtifactError> {
        self.inner.cell.get_or_try_init(|| {
            log::info!("Loading artifacts from {}", self.inner.artifact_dir.display());
            let predictor = Predictor::load(&self.inner.artifact_dir)?;
            log::info!(
                "Loaded {} species over {} encoded features",
                predictor.bundle.class_count(),
                predictor.bundle.feature_width()
            );
            Ok(predictor)
        })
    }
}
