use ndarray::Array2;

use crate::error::InferenceError;

/// Contract shared by the tree and the forest.
///
/// Labels are dense class indices in `0..n_classes`; predictions come back in
/// the same domain.
pub trait ClassifierModel {
    /// Fit the model on rows of `x` against class indices `y`.
    fn fit(&mut self, x: &Array2<f32>, y: &[usize], n_classes: usize);

    /// Class probabilities, one row per sample and one column per class.
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, InferenceError>;

    /// Most probable class per row. Ties go to the lowest class index.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>, InferenceError> {
        let proba = self.predict_proba(x)?;
        Ok(proba.rows().into_iter().map(|row| argmax(row.iter())).collect())
    }

    /// Width of the feature vectors the model was fit on.
    fn n_features(&self) -> usize;

    /// Size of the class domain the model was fit on.
    fn n_classes(&self) -> usize;

    fn name(&self) -> &str {
        "classifier"
    }
}

pub(crate) fn argmax<'a>(values: impl Iterator<Item = &'a f32>) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (idx, &v) in values.enumerate() {
        if v > best_value {
            best = idx;
            best_value = v;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax([0.2, 0.4, 0.4].iter()), 1);
        assert_eq!(argmax([0.0, 0.0].iter()), 0);
        assert_eq!(argmax([0.1, 0.0, 0.9].iter()), 2);
    }
}
