//! CSV/TSV reader for the labelled ability table.
use std::path::Path;

use csv::StringRecord;

use crate::data_handling::AbilityRecord;
use crate::error::DataError;

/// Column names of the labelled ability table.
#[derive(Debug, Clone)]
pub struct AbilityTableConfig {
    pub ability1_column: String,
    pub ability2_column: String,
    pub hidden_ability_column: String,
    pub label_column: String,
}

impl Default for AbilityTableConfig {
    fn default() -> Self {
        Self {
            ability1_column: "Ability1".to_string(),
            ability2_column: "Ability2".to_string(),
            hidden_ability_column: "HiddenAbility".to_string(),
            label_column: "Pokemon".to_string(),
        }
    }
}

/// Read the training table with the default column names.
///
/// Tab-delimited when the extension is `.tsv`, comma-delimited otherwise.
/// Extra columns are ignored; empty or missing cells become `"none"`.
pub fn read_ability_table<P: AsRef<Path>>(path: P) -> Result<Vec<AbilityRecord>, DataError> {
    read_ability_table_with_config(path, &AbilityTableConfig::default())
}

pub fn read_ability_table_with_config<P: AsRef<Path>>(
    path: P,
    config: &AbilityTableConfig,
) -> Result<Vec<AbilityRecord>, DataError> {
    let path = path.as_ref();
    let read_err = |source| DataError::Read {
        path: path.to_path_buf(),
        source,
    };

    let is_tsv = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("tsv"))
        .unwrap_or(false);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(if is_tsv { b'\t' } else { b',' })
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();

    let a1 = require_column(&headers, &config.ability1_column)?;
    let a2 = require_column(&headers, &config.ability2_column)?;
    let hidden = require_column(&headers, &config.hidden_ability_column)?;
    let label = require_column(&headers, &config.label_column)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(read_err)?;
        records.push(AbilityRecord::from_raw(
            row.get(a1),
            row.get(a2),
            row.get(hidden),
            row.get(label),
        ));
    }

    if records.is_empty() {
        return Err(DataError::Empty);
    }

    log::debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| header == name)
}

fn require_column(headers: &StringRecord, name: &str) -> Result<usize, DataError> {
    find_column(headers, name).ok_or_else(|| DataError::MissingColumn(name.to_string()))
}
