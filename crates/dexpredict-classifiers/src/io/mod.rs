//! File formats: the labelled ability table and the persisted artifact bundle.
pub mod ability_table;
pub mod artifact;

pub use ability_table::{read_ability_table, AbilityTableConfig};
pub use artifact::{load_bundle, save_bundle, ArtifactBundle, ArtifactKind, ArtifactPaths};
