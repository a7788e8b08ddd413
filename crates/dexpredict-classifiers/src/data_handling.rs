//! Labelled ability records and the deterministic train/test split.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::DataError;
use crate::preprocessing::{normalize_optional, N_ABILITY_COLUMNS};

/// One normalized training row: three ability slots and the species label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityRecord {
    pub ability1: String,
    pub ability2: String,
    pub hidden_ability: String,
    pub pokemon: String,
}

impl AbilityRecord {
    /// Build a record from raw cells, applying the shared normalization rule
    /// to every field (label included).
    pub fn from_raw(
        ability1: Option<&str>,
        ability2: Option<&str>,
        hidden_ability: Option<&str>,
        pokemon: Option<&str>,
    ) -> Self {
        AbilityRecord {
            ability1: normalize_optional(ability1),
            ability2: normalize_optional(ability2),
            hidden_ability: normalize_optional(hidden_ability),
            pokemon: normalize_optional(pokemon),
        }
    }

    pub fn abilities(&self) -> [&str; N_ABILITY_COLUMNS] {
        [&self.ability1, &self.ability2, &self.hidden_ability]
    }
}

/// Shuffle `0..n_rows` with `seed` and cut off `ceil(n_rows * test_size)`
/// rows for evaluation. Returns `(train, test)` index lists.
pub fn train_test_split(
    n_rows: usize,
    test_size: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), DataError> {
    let fail = |reason| DataError::Split {
        n_rows,
        test_size,
        reason,
    };

    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(fail("test_size must lie strictly between 0 and 1"));
    }

    let n_test = (n_rows as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(fail("both partitions need at least one row"));
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    log::debug!(
        "Split {} rows into {} train / {} test (seed {})",
        n_rows,
        train.len(),
        indices.len(),
        seed
    );
    Ok((train, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_normalizes_every_field() {
        let rec = AbilityRecord::from_raw(Some(" Overgrow"), None, Some(""), Some("Bulbasaur"));
        assert_eq!(rec.abilities(), ["overgrow", "none", "none"]);
        assert_eq!(rec.pokemon, "bulbasaur");
    }

    #[test]
    fn split_sizes_follow_ceil_rule() {
        let (train, test) = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);

        let (train, test) = train_test_split(11, 0.2, 42).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn split_is_a_seeded_partition() {
        let (train_a, test_a) = train_test_split(50, 0.2, 7).unwrap();
        let (train_b, test_b) = train_test_split(50, 0.2, 7).unwrap();
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);

        let mut all: Vec<usize> = train_a.iter().chain(test_a.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn split_rejects_degenerate_inputs() {
        assert!(train_test_split(1, 0.2, 0).is_err());
        assert!(train_test_split(0, 0.2, 0).is_err());
        assert!(train_test_split(10, 0.0, 0).is_err());
        assert!(train_test_split(10, 1.0, 0).is_err());
        assert!(train_test_split(2, 0.2, 0).is_ok());
    }
}
