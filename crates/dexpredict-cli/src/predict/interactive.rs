use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use dexpredict_classifiers::{InferenceError, SharedPredictor};

use super::request::{PredictionRequest, DEFAULT_OPTIONAL_ABILITY};
use super::{predict_request, Prediction};

const QUIT_WORDS: [&str; 2] = ["quit", "exit"];

/// Prompt for ability triples until `quit` or end of input.
///
/// The artifacts are loaded on the first request that passes validation and
/// reused for every later one. A load failure ends the session; a failed
/// prediction is reported and the loop continues.
pub fn run_interactive<R: BufRead, W: Write>(
    predictor: &SharedPredictor,
    top: Option<usize>,
    input: R,
    out: &mut W,
) -> Result<usize> {
    run_session(input, out, |request| {
        let loaded = predictor.get().with_context(|| {
            format!(
                "Failed to load artifacts from {}",
                predictor.artifact_dir().display()
            )
        })?;
        Ok(predict_request(loaded, request, top))
    })
}

/// The prompt loop behind [`run_interactive`], with the scoring step supplied
/// by `answer`.
///
/// An outer `Err` from `answer` ends the session. An inner `Err` is printed
/// as `Prediction failed: ...` and the next request is read. Returns the
/// number of requests answered.
pub fn run_session<R, W, F>(mut input: R, out: &mut W, mut answer: F) -> Result<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(&PredictionRequest) -> Result<std::result::Result<Prediction, InferenceError>>,
{
    writeln!(out, "Pokémon Predictor")?;
    writeln!(out, "Enter the abilities and discover which Pokémon it could be.")?;
    writeln!(out, "Sample abilities: Overgrow / Chlorophyll / Leaf Guard")?;
    writeln!(out, "Type 'quit' to leave.")?;

    let mut answered = 0;
    loop {
        writeln!(out)?;
        let Some(ability1) = prompt(&mut input, out, "Ability 1: ")? else {
            break;
        };
        if QUIT_WORDS.iter().any(|w| ability1.eq_ignore_ascii_case(w)) {
            break;
        }
        let Some(ability2) = prompt_optional(&mut input, out, "Ability 2 (optional)")? else {
            break;
        };
        let Some(hidden) = prompt_optional(&mut input, out, "Hidden Ability (optional)")? else {
            break;
        };

        let request = match PredictionRequest::new(&ability1, Some(&ability2), Some(&hidden)).validate() {
            Ok(request) => request,
            Err(warning) => {
                writeln!(out, "{}", warning)?;
                continue;
            }
        };

        match answer(&request)? {
            Ok(prediction) => {
                write!(out, "{}", prediction)?;
                answered += 1;
            }
            Err(e) => {
                log::warn!("Prediction failed for {:?}: {}", request, e);
                writeln!(out, "Prediction failed: {}", e)?;
            }
        }
    }

    log::debug!("Interactive session answered {} requests", answered);
    Ok(answered)
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_optional<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    let label = format!("{} [{}]: ", label, DEFAULT_OPTIONAL_ABILITY);
    Ok(prompt(input, out, &label)?.map(|answer| {
        if answer.is_empty() {
            DEFAULT_OPTIONAL_ABILITY.to_string()
        } else {
            answer
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexpredict_classifiers::config::{ModelConfig, TrainConfig};
    use dexpredict_classifiers::data_handling::AbilityRecord;
    use dexpredict_classifiers::io::save_bundle;
    use dexpredict_classifiers::Trainer;
    use std::io::Cursor;

    fn trained_dir() -> tempfile::TempDir {
        let rows = [
            ("Overgrow", "Chlorophyll", "Leaf Guard", "Bulbasaur"),
            ("Blaze", "", "Solar Power", "Charmander"),
            ("Torrent", "", "Rain Dish", "Squirtle"),
        ];
        let records: Vec<AbilityRecord> = (0..6)
            .flat_map(|_| rows.iter())
            .map(|(a, b, c, d)| AbilityRecord::from_raw(Some(*a), Some(*b), Some(*c), Some(*d)))
            .collect();
        let config = TrainConfig {
            model: ModelConfig {
                n_estimators: 30,
                ..ModelConfig::default()
            },
            ..TrainConfig::default()
        };
        let outcome = Trainer::new(config).fit(&records).unwrap();
        let dir = tempfile::tempdir().unwrap();
        save_bundle(dir.path(), &outcome.bundle).unwrap();
        dir
    }

    #[test]
    fn answers_until_quit() {
        let dir = trained_dir();
        let shared = SharedPredictor::new(dir.path());
        let input = Cursor::new("Overgrow\nChlorophyll\nLeaf Guard\nBlaze\n\nSolar Power\nquit\n");
        let mut out = Vec::new();

        let answered = run_interactive(&shared, None, input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(answered, 2);
        assert!(text.contains("Sample abilities: Overgrow / Chlorophyll / Leaf Guard"));
        assert!(text.contains("Predicted Pokémon: Bulbasaur"));
        assert!(text.contains("https://img.pokemondb.net/artwork/large/bulbasaur.jpg"));
        assert!(text.contains("Predicted Pokémon: Charmander"));
    }

    #[test]
    fn blank_first_ability_warns_without_loading() {
        let missing = tempfile::tempdir().unwrap();
        let shared = SharedPredictor::new(missing.path().join("nowhere"));
        let input = Cursor::new("\n\n\n");
        let mut out = Vec::new();

        let answered = run_interactive(&shared, None, input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(answered, 0);
        assert!(text.contains("Please enter at least Ability 1."));
        assert!(!shared.is_loaded());
    }

    #[test]
    fn missing_artifacts_end_the_session() {
        let missing = tempfile::tempdir().unwrap();
        let shared = SharedPredictor::new(missing.path());
        let input = Cursor::new("Overgrow\n\n\n");
        let mut out = Vec::new();

        let err = run_interactive(&shared, None, input, &mut out).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load artifacts"));
    }

    #[test]
    fn failed_prediction_is_reported_and_the_session_goes_on() {
        let input = Cursor::new("Overgrow\n\n\nBlaze\n\nSolar Power\nquit\n");
        let mut out = Vec::new();
        let mut calls = 0;

        let answered = run_session(input, &mut out, |request| {
            calls += 1;
            if calls == 1 {
                return Ok(Err(InferenceError::UnknownClass(7)));
            }
            assert_eq!(request.ability1, "Blaze");
            Ok(Ok(Prediction {
                species: "charmander".to_string(),
                display_name: "Charmander".to_string(),
                image_url: "https://img.pokemondb.net/artwork/large/charmander.jpg".to_string(),
                candidates: Vec::new(),
            }))
        })
        .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(answered, 1);
        assert_eq!(calls, 2);
        assert!(text.contains("Prediction failed: classifier returned class index 7 which has no label"));
        let failed_at = text.find("Prediction failed").unwrap();
        let answered_at = text.find("Predicted Pokémon: Charmander").unwrap();
        assert!(failed_at < answered_at);
    }

    #[test]
    fn forest_without_trees_fails_each_request_but_keeps_the_bundle() {
        let dir = trained_dir();
        let path = dir.path().join("classifier.json");
        let mut doc: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        doc["payload"]["trees"] = serde_json::json!([]);
        std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();

        let shared = SharedPredictor::new(dir.path());
        let input = Cursor::new("Overgrow\nChlorophyll\nLeaf Guard\nTorrent\n\nRain Dish\nquit\n");
        let mut out = Vec::new();

        let answered = run_interactive(&shared, None, input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(answered, 0);
        assert_eq!(text.matches("Prediction failed: classifier has not been fit").count(), 2);
        assert!(shared.is_loaded());
    }
}
