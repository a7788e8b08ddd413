//! Text normalization and categorical feature encoding.
//!
//! `normalize_field` is the single normalization rule shared by training and
//! inference. `OneHotEncoder` turns the three ability slots into one dense
//! indicator vector and silently ignores categories it has never seen.

use std::collections::BTreeSet;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Token substituted for absent or blank fields.
pub const NONE_TOKEN: &str = "none";

/// Number of categorical input columns (primary, secondary, hidden ability).
pub const N_ABILITY_COLUMNS: usize = 3;

/// Trim, substitute blanks with [`NONE_TOKEN`], lowercase.
pub fn normalize_field(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        NONE_TOKEN.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

/// [`normalize_field`] for values that may be absent altogether.
pub fn normalize_optional(raw: Option<&str>) -> String {
    normalize_field(raw.unwrap_or(""))
}

/// One-hot encoder over the three ability columns.
///
/// Output is dense. Column blocks are laid out in input order, categories in
/// each block in sorted order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// Fit from normalized rows.
    pub fn fit<S: AsRef<str>>(rows: &[[S; N_ABILITY_COLUMNS]]) -> Self {
        let mut sets: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); N_ABILITY_COLUMNS];
        for row in rows {
            for (col, value) in row.iter().enumerate() {
                sets[col].insert(value.as_ref());
            }
        }

        let categories = sets
            .into_iter()
            .map(|set| set.into_iter().map(str::to_string).collect())
            .collect();

        OneHotEncoder { categories }
    }

    /// Total width of an encoded row.
    pub fn n_features(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Fitted categories of column `col`, sorted.
    pub fn categories(&self, col: usize) -> &[String] {
        &self.categories[col]
    }

    pub fn n_columns(&self) -> usize {
        self.categories.len()
    }

    /// Encode one row. Unknown categories leave their block all zeros.
    pub fn transform_row<S: AsRef<str>>(&self, row: &[S; N_ABILITY_COLUMNS]) -> Array1<f32> {
        let mut out = Array1::<f32>::zeros(self.n_features());
        for idx in self.hot_indices(row) {
            out[idx] = 1.0;
        }
        out
    }

    /// Encode many rows into a `(rows.len(), n_features)` matrix.
    pub fn transform<S: AsRef<str>>(&self, rows: &[[S; N_ABILITY_COLUMNS]]) -> Array2<f32> {
        let mut out = Array2::<f32>::zeros((rows.len(), self.n_features()));
        for (r, row) in rows.iter().enumerate() {
            for idx in self.hot_indices(row) {
                out[[r, idx]] = 1.0;
            }
        }
        out
    }

    fn hot_indices<'a, S: AsRef<str> + 'a>(
        &'a self,
        row: &'a [S; N_ABILITY_COLUMNS],
    ) -> impl Iterator<Item = usize> + 'a {
        let offsets = self.categories.iter().scan(0usize, |acc, block| {
            let start = *acc;
            *acc += block.len();
            Some(start)
        });

        self.categories
            .iter()
            .zip(offsets)
            .zip(row.iter())
            .filter_map(|((block, offset), value)| {
                block
                    .binary_search_by(|c| c.as_str().cmp(value.as_ref()))
                    .ok()
                    .map(|pos| offset + pos)
            })
    }
}
