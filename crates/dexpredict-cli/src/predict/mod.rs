pub mod interactive;
pub mod request;

use std::fmt;
use std::path::PathBuf;

use clap::ArgMatches;
use dexpredict_classifiers::{InferenceError, Predictor};

use crate::display::{image_url, title_case};
pub use request::{PredictionRequest, ValidationWarning};

/// Where to find the artifacts and how much to show.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictConfig {
    pub artifact_dir: PathBuf,
    pub top: Option<usize>,
}

impl Default for PredictConfig {
    fn default() -> Self {
        PredictConfig {
            artifact_dir: PathBuf::from("artifacts"),
            top: None,
        }
    }
}

impl PredictConfig {
    pub fn from_arguments(matches: &ArgMatches) -> Self {
        let mut config = PredictConfig::default();
        if let Some(dir) = matches.get_one::<PathBuf>("artifacts") {
            config.artifact_dir = dir.clone();
        }
        config.top = matches.get_one::<usize>("top").copied();
        config
    }
}

/// A prediction ready to show: the stored label plus its presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub species: String,
    pub display_name: String,
    pub image_url: String,
    pub candidates: Vec<(String, f32)>,
}

pub fn predict_request(
    predictor: &Predictor,
    request: &PredictionRequest,
    top: Option<usize>,
) -> Result<Prediction, InferenceError> {
    let species = predictor.predict(&request.ability1, &request.ability2, &request.hidden_ability)?;
    let candidates = match top {
        Some(k) if k > 0 => predictor.top_k(&request.ability1, &request.ability2, &request.hidden_ability, k)?,
        _ => Vec::new(),
    };
    Ok(Prediction {
        display_name: title_case(&species),
        image_url: image_url(&species),
        species,
        candidates,
    })
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Predicted Pokémon: {}", self.display_name)?;
        writeln!(f, "Image: {}", self.image_url)?;
        if !self.candidates.is_empty() {
            writeln!(f, "Top candidates:")?;
            for (rank, (name, p)) in self.candidates.iter().enumerate() {
                writeln!(f, "  {:>2}. {:<20} {:.3}", rank + 1, title_case(name), p)?;
            }
        }
        Ok(())
    }
}
