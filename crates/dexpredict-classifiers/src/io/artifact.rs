//! Versioned on-disk format for the encoder / classifier / label-map bundle.
//!
//! Each member is a JSON document `{ "header": ..., "payload": ... }`. The
//! header carries the feature width and class count of the training run so
//! that a bundle assembled from mismatched runs is rejected at load time
//! instead of mispredicting.
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::labels::LabelMap;
use crate::models::{ClassifierModel, RandomForestClassifier};
use crate::preprocessing::OneHotEncoder;

pub const ARTIFACT_MAGIC: &str = "dexpredict";
pub const FORMAT_VERSION: u32 = 1;

pub const ENCODER_FILE: &str = "encoder.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const LABELS_FILE: &str = "labels.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Encoder,
    Classifier,
    Labels,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Encoder => "encoder",
            ArtifactKind::Classifier => "classifier",
            ArtifactKind::Labels => "labels",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub magic: String,
    pub format_version: u32,
    pub kind: ArtifactKind,
    pub feature_width: usize,
    pub class_count: usize,
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    header: ArtifactHeader,
    payload: &'a T,
}

#[derive(Deserialize)]
struct RawEnvelope {
    header: ArtifactHeader,
    payload: serde_json::Value,
}

/// Locations of the three bundle members inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub encoder: PathBuf,
    pub classifier: PathBuf,
    pub labels: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        ArtifactPaths {
            encoder: dir.join(ENCODER_FILE),
            classifier: dir.join(CLASSIFIER_FILE),
            labels: dir.join(LABELS_FILE),
        }
    }

    fn members(&self) -> [&Path; 3] {
        [&self.encoder, &self.classifier, &self.labels]
    }
}

/// Encoder, classifier and label map from one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    pub encoder: OneHotEncoder,
    pub classifier: RandomForestClassifier,
    pub labels: LabelMap,
}

impl ArtifactBundle {
    /// Cross-member compatibility: encoder width must equal the classifier's
    /// input width and the classifier's class domain must equal the label map.
    /// Every tree must also be walkable for that width and class count.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.encoder.n_features() != self.classifier.n_features() {
            return Err(ArtifactError::FeatureWidthMismatch {
                encoder: self.encoder.n_features(),
                classifier: self.classifier.n_features(),
            });
        }
        if self.classifier.n_classes() != self.labels.len() {
            return Err(ArtifactError::ClassCountMismatch {
                classifier: self.classifier.n_classes(),
                labels: self.labels.len(),
            });
        }
        self.classifier
            .check_structure()
            .map_err(ArtifactError::CorruptClassifier)?;
        Ok(())
    }

    pub fn feature_width(&self) -> usize {
        self.encoder.n_features()
    }

    pub fn class_count(&self) -> usize {
        self.labels.len()
    }
}

/// Write all three members into `dir`.
///
/// Every member is first written to a `.tmp` sibling; the renames only start
/// once all three serialized successfully.
pub fn save_bundle<P: AsRef<Path>>(dir: P, bundle: &ArtifactBundle) -> Result<ArtifactPaths, ArtifactError> {
    bundle.validate()?;

    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| ArtifactError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let paths = ArtifactPaths::in_dir(dir);
    let encoder = encode_member(&paths.encoder, ArtifactKind::Encoder, &bundle.encoder, bundle)?;
    let classifier = encode_member(
        &paths.classifier,
        ArtifactKind::Classifier,
        &bundle.classifier,
        bundle,
    )?;
    let labels = encode_member(&paths.labels, ArtifactKind::Labels, &bundle.labels, bundle)?;

    let mut staged = Vec::with_capacity(3);
    for (path, bytes) in paths.members().into_iter().zip([encoder, classifier, labels]) {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|source| ArtifactError::Io {
            path: tmp.clone(),
            source,
        })?;
        staged.push((tmp, path.to_path_buf()));
    }

    for (tmp, path) in staged {
        fs::rename(&tmp, &path).map_err(|source| ArtifactError::Io { path, source })?;
    }

    log::info!(
        "Saved artifact bundle to {} ({} features, {} classes)",
        dir.display(),
        bundle.feature_width(),
        bundle.class_count()
    );
    Ok(paths)
}

/// Load and cross-check all three members from `dir`.
pub fn load_bundle<P: AsRef<Path>>(dir: P) -> Result<ArtifactBundle, ArtifactError> {
    let paths = ArtifactPaths::in_dir(dir);
    for path in paths.members() {
        if !path.exists() {
            return Err(ArtifactError::Missing(path.to_path_buf()));
        }
    }

    let (enc_header, encoder): (_, OneHotEncoder) =
        read_member(&paths.encoder, ArtifactKind::Encoder)?;
    check_header(&paths.encoder, &enc_header, encoder.n_features(), enc_header.class_count)?;

    let (clf_header, classifier): (_, RandomForestClassifier) =
        read_member(&paths.classifier, ArtifactKind::Classifier)?;
    check_header(
        &paths.classifier,
        &clf_header,
        classifier.n_features(),
        classifier.n_classes(),
    )?;
    classifier.check_structure().map_err(|detail| {
        log::warn!("Rejecting {}: {}", paths.classifier.display(), detail);
        ArtifactError::CorruptClassifier(detail)
    })?;

    let (lbl_header, labels): (_, LabelMap) = read_member(&paths.labels, ArtifactKind::Labels)?;
    check_header(&paths.labels, &lbl_header, lbl_header.feature_width, labels.len())?;
    if !labels.is_well_formed() {
        return Err(ArtifactError::HeaderMismatch {
            path: paths.labels.clone(),
            detail: "label names are not sorted and unique".to_string(),
        });
    }

    let bundle = ArtifactBundle {
        encoder,
        classifier,
        labels,
    };
    bundle.validate()?;
    Ok(bundle)
}

fn encode_member<T: Serialize>(
    path: &Path,
    kind: ArtifactKind,
    payload: &T,
    bundle: &ArtifactBundle,
) -> Result<Vec<u8>, ArtifactError> {
    let envelope = Envelope {
        header: ArtifactHeader {
            magic: ARTIFACT_MAGIC.to_string(),
            format_version: FORMAT_VERSION,
            kind,
            feature_width: bundle.feature_width(),
            class_count: bundle.class_count(),
        },
        payload,
    };
    serde_json::to_vec(&envelope).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn read_member<T: DeserializeOwned>(
    path: &Path,
    expected: ArtifactKind,
) -> Result<(ArtifactHeader, T), ArtifactError> {
    let malformed = |source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    };

    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawEnvelope = serde_json::from_slice(&bytes).map_err(malformed)?;
    let header = raw.header;

    if header.magic != ARTIFACT_MAGIC {
        return Err(ArtifactError::BadMagic {
            path: path.to_path_buf(),
            found: header.magic,
        });
    }
    if header.format_version != FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: header.format_version,
            expected: FORMAT_VERSION,
        });
    }
    if header.kind != expected {
        return Err(ArtifactError::WrongKind {
            path: path.to_path_buf(),
            found: header.kind.to_string(),
            expected: expected.to_string(),
        });
    }

    let payload = serde_json::from_value(raw.payload).map_err(malformed)?;
    Ok((header, payload))
}

fn check_header(
    path: &Path,
    header: &ArtifactHeader,
    feature_width: usize,
    class_count: usize,
) -> Result<(), ArtifactError> {
    if header.feature_width != feature_width || header.class_count != class_count {
        return Err(ArtifactError::HeaderMismatch {
            path: path.to_path_buf(),
            detail: format!(
                "header says {} features / {} classes, payload has {} / {}",
                header.feature_width, header.class_count, feature_width, class_count
            ),
        });
    }
    Ok(())
}
