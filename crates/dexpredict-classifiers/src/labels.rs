use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Dense, sorted mapping between class indices and species names.
///
/// Index `i` is the `i`-th name in lexical order of the distinct training
/// labels, so the mapping is a bijection over the classes seen at fit time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMap {
    names: Vec<String>,
}

impl LabelMap {
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut names: Vec<String> = labels.iter().map(|s| s.as_ref().to_string()).collect();
        names.sort_unstable();
        names.dedup();
        LabelMap { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).ok()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Map every label to its class index.
    pub fn encode<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>, DataError> {
        labels
            .iter()
            .map(|l| {
                self.index_of(l.as_ref())
                    .ok_or_else(|| DataError::UnknownLabel(l.as_ref().to_string()))
            })
            .collect()
    }

    /// Sorted, duplicate-free names; anything else cannot come out of `fit`.
    pub(crate) fn is_well_formed(&self) -> bool {
        self.names.windows(2).all(|w| w[0] < w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_sorted_order() {
        let map = LabelMap::fit(&["squirtle", "bulbasaur", "charmander", "bulbasaur"]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.name_of(0), Some("bulbasaur"));
        assert_eq!(map.name_of(2), Some("squirtle"));
        assert_eq!(map.name_of(3), None);
        assert_eq!(map.index_of("charmander"), Some(1));
        assert_eq!(map.index_of("pikachu"), None);
    }

    #[test]
    fn mapping_is_bijective() {
        let labels = ["mew", "abra", "zubat", "abra", "mew"];
        let map = LabelMap::fit(&labels);
        for (idx, name) in map.names().iter().enumerate() {
            assert_eq!(map.index_of(name), Some(idx));
            assert_eq!(map.name_of(idx), Some(name.as_str()));
        }
        for label in labels {
            let idx = map.index_of(label).unwrap();
            assert_eq!(map.name_of(idx), Some(label));
        }
        assert!(map.is_well_formed());
    }

    #[test]
    fn encode_rejects_unseen_labels() {
        let map = LabelMap::fit(&["a", "b"]);
        assert_eq!(map.encode(&["b", "a", "b"]).unwrap(), vec![1, 0, 1]);
        assert!(matches!(map.encode(&["c"]), Err(DataError::UnknownLabel(_))));
    }
}
