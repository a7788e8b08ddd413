use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::io;
use std::path::PathBuf;

use dexpredict_classifiers::{Predictor, SharedPredictor};
use dexpredict_cli::predict::interactive::run_interactive;
use dexpredict_cli::predict::{predict_request, PredictConfig, PredictionRequest};
use dexpredict_cli::train::input::load_train_config;
use dexpredict_cli::train::{render_summary, run_training};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("DEXPREDICT_LOG", "error,dexpredict=info"))
        .init();

    let matches = Command::new("dexpredict")
        .version(clap::crate_version!())
        .about("\u{1F52E} dexpredict - Guess the Pokémon from its abilities")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train the ability classifier and write its artifacts")
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON training configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("train_data")
                        .short('d')
                        .long("train-data")
                        .help(
                            "Path to the labelled ability table (*.csv or *.tsv). \
                             Overrides the file specified in the configuration file.",
                        )
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .help(
                            "Directory the encoder, classifier and label artifacts are written to. \
                             Overrides the directory specified in the configuration file.",
                        )
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("trees")
                        .short('n')
                        .long("trees")
                        .help("Number of trees in the forest")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for the split and the forest")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("test_size")
                        .long("test-size")
                        .help("Fraction of rows held out for evaluation, in (0, 1)")
                        .value_parser(clap::value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict the species for one set of abilities")
                .arg(
                    Arg::new("ability1")
                        .short('a')
                        .long("ability1")
                        .help("First ability (required)")
                        .required(true),
                )
                .arg(
                    Arg::new("ability2")
                        .short('b')
                        .long("ability2")
                        .help("Second ability")
                        .default_value("None"),
                )
                .arg(
                    Arg::new("hidden_ability")
                        .short('H')
                        .long("hidden-ability")
                        .help("Hidden ability")
                        .default_value("None"),
                )
                .arg(artifacts_arg())
                .arg(top_arg()),
        )
        .subcommand(
            Command::new("interactive")
                .about("Prompt for abilities until 'quit'")
                .arg(artifacts_arg())
                .arg(top_arg()),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("interactive", sub_m)) => handle_interactive(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn artifacts_arg() -> Arg {
    Arg::new("artifacts")
        .long("artifacts")
        .help("Directory holding encoder.json, classifier.json and labels.json")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::DirPath)
}

fn top_arg() -> Arg {
    Arg::new("top")
        .long("top")
        .help("Also list the N most likely species")
        .value_parser(clap::value_parser!(usize))
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[dexpredict::train] Training from config: {:?}", path),
        None => log::info!("[dexpredict::train] No config file provided; using defaults."),
    }

    let config = match load_train_config(config_path, matches) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid training setup: {:#}", e);
            std::process::exit(1)
        }
    };

    match run_training(&config) {
        Ok((outcome, paths)) => {
            print!("{}", render_summary(&outcome, &paths));
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let config = PredictConfig::from_arguments(matches);
    let ability1: &String = matches.get_one("ability1").unwrap();
    let request = PredictionRequest::new(
        ability1,
        matches.get_one::<String>("ability2").map(String::as_str),
        matches.get_one::<String>("hidden_ability").map(String::as_str),
    );

    let request = match request.validate() {
        Ok(request) => request,
        Err(warning) => {
            eprintln!("{}", warning);
            return Ok(());
        }
    };

    let predictor = match Predictor::load(&config.artifact_dir) {
        Ok(predictor) => predictor,
        Err(e) => {
            log::error!(
                "Failed to load artifacts from {}: {:#}",
                config.artifact_dir.display(),
                anyhow::Error::from(e)
            );
            std::process::exit(1)
        }
    };

    match predict_request(&predictor, &request, config.top) {
        Ok(prediction) => {
            print!("{}", prediction);
            Ok(())
        }
        Err(e) => {
            eprintln!("Prediction failed: {}", e);
            std::process::exit(1)
        }
    }
}

fn handle_interactive(matches: &ArgMatches) -> Result<()> {
    let config = PredictConfig::from_arguments(matches);
    let predictor = SharedPredictor::new(config.artifact_dir);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match run_interactive(&predictor, config.top, stdin.lock(), &mut stdout) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1)
        }
    }
}
