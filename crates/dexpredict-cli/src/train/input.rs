use anyhow::{Context, Result};
use clap::ArgMatches;
use dexpredict_classifiers::config::TrainConfig;
use std::fs;
use std::path::PathBuf;

use crate::util::validate_tsv_or_csv_file;

/// Build the training configuration from an optional JSON file plus CLI overrides.
pub fn load_train_config(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<TrainConfig> {
    let mut config = match config_path {
        Some(path) => read_train_config(path)?,
        None => TrainConfig::default(),
    };

    // Apply CLI overrides
    if let Some(train_data) = matches.get_one::<PathBuf>("train_data") {
        config.train_data = train_data.clone();
    }
    if let Some(output_dir) = matches.get_one::<PathBuf>("output_dir") {
        config.output_dir = output_dir.clone();
    }
    if let Some(&trees) = matches.get_one::<usize>("trees") {
        config.model.n_estimators = trees;
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config.seed = seed;
    }
    if let Some(&test_size) = matches.get_one::<f64>("test_size") {
        config.test_size = test_size;
    }

    validate_tsv_or_csv_file(&config.train_data)?;
    if config.model.n_estimators == 0 {
        anyhow::bail!("The forest needs at least one tree");
    }

    Ok(config)
}

pub fn read_train_config(path: &PathBuf) -> Result<TrainConfig> {
    let config_json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    serde_json::from_str(&config_json)
        .with_context(|| format!("Failed to parse config file: {:?}", path))
}
