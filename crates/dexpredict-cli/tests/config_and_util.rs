//! Integration tests for CLI config loading, util helpers and display helpers.

use std::fs;

use clap::{Arg, Command};
use dexpredict_classifiers::config::{MaxFeatures, TrainConfig};
use dexpredict_cli::display::{image_url, title_case};
use dexpredict_cli::predict::PredictConfig;
use dexpredict_cli::train::input::{load_train_config, read_train_config};
use dexpredict_cli::util::validate_tsv_or_csv_file;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// validate_tsv_or_csv_file
// ---------------------------------------------------------------------------

#[test]
fn validate_tsv_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.tsv");
    fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(&path).is_ok());
}

#[test]
fn validate_csv_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.CSV");
    fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(&path).is_ok());
}

#[test]
fn validate_wrong_extension_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.txt");
    fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(&path).is_err());
}

#[test]
fn validate_nonexistent_file_errors() {
    assert!(validate_tsv_or_csv_file("/nonexistent/path/data.tsv").is_err());
}

// ---------------------------------------------------------------------------
// Train config loading
// ---------------------------------------------------------------------------

fn train_command() -> Command {
    Command::new("train")
        .arg(Arg::new("train_data").long("train-data").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("output_dir").long("output-dir").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("trees").long("trees").value_parser(clap::value_parser!(usize)))
        .arg(Arg::new("seed").long("seed").value_parser(clap::value_parser!(u64)))
        .arg(Arg::new("test_size").long("test-size").value_parser(clap::value_parser!(f64)))
}

#[test]
fn train_config_default_values() {
    let cfg = TrainConfig::default();
    assert_eq!(cfg.output_dir, PathBuf::from("artifacts"));
    assert_eq!(cfg.test_size, 0.2);
    assert_eq!(cfg.seed, 42);
    assert_eq!(cfg.model.n_estimators, 100);
    assert_eq!(cfg.model.max_features, MaxFeatures::Sqrt);
}

#[test]
fn partial_json_config_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.json");
    fs::write(&path, r#"{ "seed": 7, "model": { "n_estimators": 12 } }"#).unwrap();

    let cfg = read_train_config(&path).unwrap();
    assert_eq!(cfg.seed, 7);
    assert_eq!(cfg.model.n_estimators, 12);
    assert_eq!(cfg.test_size, 0.2);
    assert_eq!(cfg.model.min_samples_split, 2);
}

#[test]
fn malformed_json_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(read_train_config(&path).is_err());
}

#[test]
fn cli_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("pokemon.csv");
    fs::write(&table, "Pokemon,Ability1,Ability2,HiddenAbility\n").unwrap();
    let config_path = dir.path().join("train.json");
    fs::write(
        &config_path,
        r#"{ "train_data": "/nonexistent/pokemon.csv", "seed": 1, "test_size": 0.5 }"#,
    )
    .unwrap();

    let matches = train_command().get_matches_from([
        "train",
        "--train-data",
        table.to_str().unwrap(),
        "--output-dir",
        "out",
        "--trees",
        "5",
        "--seed",
        "9",
    ]);
    let cfg = load_train_config(Some(&config_path), &matches).unwrap();
    assert_eq!(cfg.train_data, table);
    assert_eq!(cfg.output_dir, PathBuf::from("out"));
    assert_eq!(cfg.model.n_estimators, 5);
    assert_eq!(cfg.seed, 9);
    assert_eq!(cfg.test_size, 0.5);
}

#[test]
fn missing_training_table_is_rejected_up_front() {
    let matches = train_command().get_matches_from(["train", "--train-data", "/nonexistent/pokemon.csv"]);
    assert!(load_train_config(None, &matches).is_err());
}

#[test]
fn zero_trees_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("pokemon.tsv");
    fs::File::create(&table).unwrap();
    let matches = train_command().get_matches_from([
        "train",
        "--train-data",
        table.to_str().unwrap(),
        "--trees",
        "0",
    ]);
    assert!(load_train_config(None, &matches).is_err());
}

// ---------------------------------------------------------------------------
// Predict config & display
// ---------------------------------------------------------------------------

#[test]
fn predict_config_defaults_and_overrides() {
    let command = Command::new("predict")
        .arg(Arg::new("artifacts").long("artifacts").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("top").long("top").value_parser(clap::value_parser!(usize)));

    let defaults = PredictConfig::from_arguments(&command.clone().get_matches_from(["predict"]));
    assert_eq!(defaults, PredictConfig::default());
    assert_eq!(defaults.artifact_dir, PathBuf::from("artifacts"));

    let custom = PredictConfig::from_arguments(&command.get_matches_from([
        "predict",
        "--artifacts",
        "models",
        "--top",
        "3",
    ]));
    assert_eq!(custom.artifact_dir, PathBuf::from("models"));
    assert_eq!(custom.top, Some(3));
}

#[test]
fn display_helpers_capitalize_each_word() {
    assert_eq!(title_case("nidoran-f"), "Nidoran-F");
    assert_eq!(title_case("tapu koko"), "Tapu Koko");
    assert_eq!(image_url("Tapu Koko"), "https://img.pokemondb.net/artwork/large/tapu-koko.jpg");
}
