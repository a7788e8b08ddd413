pub mod input;

use anyhow::{Context, Result};
use dexpredict_classifiers::config::TrainConfig;
use dexpredict_classifiers::io::ArtifactPaths;
use dexpredict_classifiers::{TrainOutcome, Trainer};

/// Fit on the configured table and write the artifact bundle.
pub fn run_training(config: &TrainConfig) -> Result<(TrainOutcome, ArtifactPaths)> {
    log::info!(
        "[dexpredict::train] {} trees, seed {}, test_size {}",
        config.model.n_estimators,
        config.seed,
        config.test_size
    );
    Trainer::new(config.clone())
        .run()
        .with_context(|| format!("Failed to train on {:?}", config.train_data))
}

/// Accuracy line followed by the per-species report.
pub fn render_summary(outcome: &TrainOutcome, paths: &ArtifactPaths) -> String {
    let mut out = format!(
        "Accuracy: {:.4} ({} train / {} held out)\n\n",
        outcome.accuracy, outcome.n_train, outcome.n_test
    );
    out.push_str("Classification Report:\n");
    out.push_str(&outcome.report.to_string());
    out.push('\n');
    for path in [&paths.encoder, &paths.classifier, &paths.labels] {
        out.push_str(&format!("Saved {}\n", path.display()));
    }
    out
}
