use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while reading or preparing the labelled training table.
///
/// Fatal for a training run: nothing is written to the artifact directory.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read training table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("training table is missing required column '{0}'")]
    MissingColumn(String),

    #[error("training table has no rows after normalization")]
    Empty,

    #[error("cannot split {n_rows} rows with test_size {test_size}: {reason}")]
    Split {
        n_rows: usize,
        test_size: f64,
        reason: &'static str,
    },

    #[error("label '{0}' is not part of the fitted label map")]
    UnknownLabel(String),
}

/// Failures while persisting or loading the encoder/classifier/labels bundle.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact {0} does not exist")]
    Missing(PathBuf),

    #[error("i/o error on artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact {path} is not a valid bundle member: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact {path} has unexpected magic '{found}'")]
    BadMagic { path: PathBuf, found: String },

    #[error("artifact {path} uses format version {found}, expected {expected}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("artifact {path} holds a {found} artifact, expected {expected}")]
    WrongKind {
        path: PathBuf,
        found: String,
        expected: String,
    },

    #[error("artifact {path} header disagrees with its payload: {detail}")]
    HeaderMismatch { path: PathBuf, detail: String },

    #[error("encoder produces {encoder} features but classifier was fit on {classifier}")]
    FeatureWidthMismatch { encoder: usize, classifier: usize },

    #[error("classifier predicts {classifier} classes but label map holds {labels}")]
    ClassCountMismatch { classifier: usize, labels: usize },

    #[error("classifier is structurally invalid: {0}")]
    CorruptClassifier(String),
}

/// Failures while encoding or scoring a single well-formed request.
///
/// Recovered at the call boundary; the loaded bundle is never touched.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("encoded row has {found} features, classifier expects {expected}")]
    WidthMismatch { expected: usize, found: usize },

    #[error("classifier returned class index {0} which has no label")]
    UnknownClass(usize),

    #[error("classifier has not been fit")]
    NotFitted,

    #[error("tree walk reached an invalid node {node}")]
    CorruptTree { node: usize },
}

/// Top-level error wrapping every failure class of the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = ArtifactError::FeatureWidthMismatch {
            encoder: 12,
            classifier: 13,
        };
        assert_eq!(
            err.to_string(),
            "encoder produces 12 features but classifier was fit on 13"
        );

        let err: Error = DataError::MissingColumn("HiddenAbility".into()).into();
        assert!(err.to_string().contains("HiddenAbility"));
        assert!(matches!(err, Error::Data(_)));
    }
}
