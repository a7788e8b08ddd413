//! Offline training run: table in, artifact bundle out.
use std::time::Instant;

use crate::config::TrainConfig;
use crate::data_handling::{train_test_split, AbilityRecord};
use crate::error::{DataError, Result};
use crate::io::{read_ability_table, save_bundle, ArtifactBundle, ArtifactPaths};
use crate::labels::LabelMap;
use crate::models::{ClassifierModel, RandomForestClassifier};
use crate::preprocessing::OneHotEncoder;
use crate::stats::{accuracy, ClassificationReport};

/// Everything a training run produces.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub bundle: ArtifactBundle,
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub n_train: usize,
    pub n_test: usize,
}

pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Self {
        Trainer { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Encode, split, fit and evaluate. Nothing touches the filesystem.
    ///
    /// Encoder and label map are fit on every row; the held-out rows only
    /// influence the reported metrics.
    pub fn fit(&self, records: &[AbilityRecord]) -> Result<TrainOutcome> {
        if records.is_empty() {
            return Err(DataError::Empty.into());
        }

        let rows: Vec<[&str; 3]> = records.iter().map(AbilityRecord::abilities).collect();
        let names: Vec<&str> = records.iter().map(|r| r.pokemon.as_str()).collect();

        let encoder = OneHotEncoder::fit(&rows);
        let labels = LabelMap::fit(&names);
        let y = labels.encode(&names)?;
        log::info!(
            "Encoded {} rows into {} features across {} species",
            records.len(),
            encoder.n_features(),
            labels.len()
        );

        let (train_idx, test_idx) =
            train_test_split(records.len(), self.config.test_size, self.config.seed)?;

        let select = |idx: &[usize]| -> (Vec<[&str; 3]>, Vec<usize>) {
            idx.iter().map(|&i| (rows[i], y[i])).unzip()
        };
        let (train_rows, y_train) = select(&train_idx);
        let (test_rows, y_test) = select(&test_idx);

        let x_train = encoder.transform(&train_rows);
        let x_test = encoder.transform(&test_rows);

        let mut classifier = RandomForestClassifier::new(self.config.model.clone(), self.config.seed);
        classifier.fit(&x_train, &y_train, labels.len());

        let y_pred = classifier.predict(&x_test)?;

        let acc = accuracy(&y_test, &y_pred);
        let report = ClassificationReport::compute(&y_test, &y_pred, &labels);

        Ok(TrainOutcome {
            bundle: ArtifactBundle {
                encoder,
                classifier,
                labels,
            },
            accuracy: acc,
            report,
            n_train: train_idx.len(),
            n_test: test_idx.len(),
        })
    }

    /// Read the configured table, fit, and write the bundle.
    ///
    /// Any failure before the final save leaves the output directory untouched.
    pub fn run(&self) -> Result<(TrainOutcome, ArtifactPaths)> {
        let start = Instant::now();

        log::info!("Loading training data from {}", self.config.train_data.display());
        let records = read_ability_table(&self.config.train_data)?;
        log::info!("Loaded {} labelled rows", records.len());

        let outcome = self.fit(&records)?;
        log::info!(
            "Trained {} trees on {} rows, held out {} rows: accuracy {:.4}",
            outcome.bundle.classifier.trees().len(),
            outcome.n_train,
            outcome.n_test,
            outcome.accuracy
        );

        let paths = save_bundle(&self.config.output_dir, &outcome.bundle)?;
        log::info!("Training completed in {:?}", start.elapsed());
        Ok((outcome, paths))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::error::Error;

    fn record(a1: &str, a2: &str, h: &str, name: &str) -> AbilityRecord {
        AbilityRecord::from_raw(Some(a1), Some(a2), Some(h), Some(name))
    }

    fn starters() -> Vec<AbilityRecord> {
        let mut rows = Vec::new();
        for _ in 0..8 {
            rows.push(record("Overgrow", "", "Chlorophyll", "Bulbasaur"));
            rows.push(record("Blaze", "", "Solar Power", "Charmander"));
            rows.push(record("Torrent", "", "Rain Dish", "Squirtle"));
        }
        rows
    }

    fn quick_config() -> TrainConfig {
        TrainConfig {
            model: ModelConfig {
                n_estimators: 30,
                ..ModelConfig::default()
            },
            ..TrainConfig::default()
        }
    }

    #[test]
    fn fit_reports_split_sizes_and_perfect_accuracy() {
        let outcome = Trainer::new(quick_config()).fit(&starters()).unwrap();
        assert_eq!(outcome.n_test, 5);
        assert_eq!(outcome.n_train, 19);
        assert_eq!(outcome.accuracy, 1.0);
        assert_eq!(outcome.bundle.labels.names(), ["bulbasaur", "charmander", "squirtle"]);
        assert!(outcome.bundle.validate().is_ok());
    }

    #[test]
    fn empty_input_is_a_data_error() {
        assert!(matches!(
            Trainer::new(quick_config()).fit(&[]),
            Err(Error::Data(DataError::Empty))
        ));
    }

    #[test]
    fn single_row_cannot_be_split() {
        let rows = vec![record("Static", "", "", "Pikachu")];
        assert!(matches!(
            Trainer::new(quick_config()).fit(&rows),
            Err(Error::Data(DataError::Split { .. }))
        ));
    }
}
